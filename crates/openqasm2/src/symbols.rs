//! Gate signatures and register shapes.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ast::RegisterKind;

/// Declared shape of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateSignature {
    /// Number of classical parameters.
    pub num_params: usize,
    /// Number of qubit arguments.
    pub num_qubits: usize,
    /// Declared with `opaque` (no body).
    pub opaque: bool,
}

impl GateSignature {
    pub fn new(num_params: usize, num_qubits: usize) -> Self {
        Self {
            num_params,
            num_qubits,
            opaque: false,
        }
    }

    pub fn opaque(num_params: usize, num_qubits: usize) -> Self {
        Self {
            num_params,
            num_qubits,
            opaque: true,
        }
    }
}

/// Declared shape of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterInfo {
    pub kind: RegisterKind,
    pub size: u64,
}

/// Gate and register names known to a program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    gates: FxHashMap<String, GateSignature>,
    registers: FxHashMap<String, RegisterInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gate(&self, name: &str) -> Option<&GateSignature> {
        self.gates.get(name)
    }

    pub fn register(&self, name: &str) -> Option<&RegisterInfo> {
        self.registers.get(name)
    }

    /// All gates, sorted by name.
    pub fn gates(&self) -> Vec<(&str, &GateSignature)> {
        let mut gates: Vec<_> = self.gates.iter().map(|(k, v)| (k.as_str(), v)).collect();
        gates.sort_unstable_by_key(|(name, _)| *name);
        gates
    }

    /// All registers, sorted by name.
    pub fn registers(&self) -> Vec<(&str, &RegisterInfo)> {
        let mut regs: Vec<_> = self
            .registers
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        regs.sort_unstable_by_key(|(name, _)| *name);
        regs
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Total qubits across quantum registers, saturating at `u64::MAX`.
    pub fn num_qubits(&self) -> u64 {
        self.total_size(RegisterKind::Quantum)
    }

    /// Total bits across classical registers, saturating at `u64::MAX`.
    pub fn num_clbits(&self) -> u64 {
        self.total_size(RegisterKind::Classical)
    }

    fn total_size(&self, kind: RegisterKind) -> u64 {
        self.registers
            .values()
            .filter(|r| r.kind == kind)
            .fold(0, |total, r| total.saturating_add(r.size))
    }

    /// Insert a gate, returning `false` if the name was already present.
    pub(crate) fn insert_gate(&mut self, name: &str, signature: GateSignature) -> bool {
        if self.gates.contains_key(name) {
            return false;
        }
        self.gates.insert(name.to_string(), signature);
        true
    }

    /// Insert a register, returning `false` if the name was already present.
    pub(crate) fn insert_register(&mut self, name: &str, info: RegisterInfo) -> bool {
        if self.registers.contains_key(name) {
            return false;
        }
        self.registers.insert(name.to_string(), info);
        true
    }
}

/// A circuit-scoped table layered over a read-only library table.
///
/// Lookups fall through to the library; inserts only ever touch the local
/// layer and are refused when either layer already holds the name.
#[derive(Debug)]
pub(crate) struct ScopedSymbols<'lib> {
    library: Option<&'lib SymbolTable>,
    local: SymbolTable,
}

impl<'lib> ScopedSymbols<'lib> {
    pub(crate) fn new(library: Option<&'lib SymbolTable>) -> Self {
        Self {
            library,
            local: SymbolTable::new(),
        }
    }

    pub(crate) fn gate(&self, name: &str) -> Option<&GateSignature> {
        self.local
            .gate(name)
            .or_else(|| self.library.and_then(|lib| lib.gate(name)))
    }

    pub(crate) fn register(&self, name: &str) -> Option<&RegisterInfo> {
        self.local
            .register(name)
            .or_else(|| self.library.and_then(|lib| lib.register(name)))
    }

    /// Whether `name` is a library gate (as opposed to a circuit one).
    pub(crate) fn is_library_gate(&self, name: &str) -> bool {
        self.library.is_some_and(|lib| lib.gate(name).is_some())
    }

    pub(crate) fn declare_gate(&mut self, name: &str, signature: GateSignature) -> bool {
        if self.gate(name).is_some() {
            return false;
        }
        self.local.insert_gate(name, signature)
    }

    pub(crate) fn declare_register(&mut self, name: &str, info: RegisterInfo) -> bool {
        if self.register(name).is_some() {
            return false;
        }
        self.local.insert_register(name, info)
    }

    pub(crate) fn into_local(self) -> SymbolTable {
        self.local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_lookup_falls_through() {
        let mut lib = SymbolTable::new();
        assert!(lib.insert_gate("cx", GateSignature::opaque(0, 2)));

        let mut scope = ScopedSymbols::new(Some(&lib));
        assert_eq!(scope.gate("cx"), Some(&GateSignature::opaque(0, 2)));
        assert!(scope.is_library_gate("cx"));

        assert!(!scope.declare_gate("cx", GateSignature::new(0, 2)));
        assert!(scope.declare_gate("bell", GateSignature::new(0, 2)));
        assert!(!scope.is_library_gate("bell"));

        let local = scope.into_local();
        assert!(local.gate("bell").is_some());
        assert!(local.gate("cx").is_none());
        assert_eq!(lib.num_gates(), 1);
    }

    #[test]
    fn test_register_totals() {
        let mut scope = ScopedSymbols::new(None);
        let q = RegisterInfo {
            kind: RegisterKind::Quantum,
            size: 3,
        };
        let c = RegisterInfo {
            kind: RegisterKind::Classical,
            size: 2,
        };
        assert!(scope.declare_register("q", q));
        assert!(scope.declare_register("r", q));
        assert!(scope.declare_register("c", c));
        assert!(!scope.declare_register("q", c));

        let table = scope.into_local();
        assert_eq!(table.num_qubits(), 6);
        assert_eq!(table.num_clbits(), 2);
        let names: Vec<_> = table.registers().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["c", "q", "r"]);
    }

    #[test]
    fn test_register_totals_saturate() {
        let mut table = SymbolTable::new();
        let huge = RegisterInfo {
            kind: RegisterKind::Quantum,
            size: u64::MAX,
        };
        let small = RegisterInfo {
            kind: RegisterKind::Quantum,
            size: 2,
        };
        assert!(table.insert_register("a", huge));
        assert!(table.insert_register("b", small));

        assert_eq!(table.num_qubits(), u64::MAX);
        assert_eq!(table.num_clbits(), 0);
    }
}
