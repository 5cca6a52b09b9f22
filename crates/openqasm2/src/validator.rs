//! Semantic checks over a parsed program.
//!
//! One pass in statement order; the first violation aborts. Gate calls are
//! checked in a fixed order: the gate exists, the arity matches, expression
//! identifiers resolve, each argument resolves and is in range, whole-register
//! arguments agree in size, and no qubit is passed twice.

use rustc_hash::FxHashSet;

use crate::ast::{
    GateCall, GateDecl, Measure, OpaqueDecl, Position, Program, RegisterDecl, RegisterKind,
    RegisterRef, Statement, VersionDecl,
};
use crate::error::{ParseResult, QasmError, SemanticErrorKind};
use crate::symbols::{GateSignature, RegisterInfo, ScopedSymbols, SymbolTable};

/// Validate `program` against an optional read-only library table.
///
/// Returns the symbols the program itself declares.
pub(crate) fn validate(program: &Program, library: Option<&SymbolTable>) -> ParseResult<SymbolTable> {
    let mut validator = Validator {
        scope: ScopedSymbols::new(library),
    };
    for (index, statement) in program.statements.iter().enumerate() {
        validator.check_statement(index, statement)?;
    }
    Ok(validator.scope.into_local())
}

/// Formal names visible inside a gate body.
struct Formals<'a> {
    params: &'a [String],
    qargs: &'a [String],
}

struct Validator<'lib> {
    scope: ScopedSymbols<'lib>,
}

impl Validator<'_> {
    fn check_statement(&mut self, index: usize, statement: &Statement) -> ParseResult<()> {
        match statement {
            Statement::Version(decl) => check_version(index, decl),
            Statement::Include(_) => Ok(()),
            Statement::Register(decl) => self.declare_register(decl),
            Statement::GateDecl(decl) => self.declare_gate(decl),
            Statement::Opaque(decl) => self.declare_opaque(decl),
            Statement::GateCall(call) => self.check_call(call),
            Statement::Measure(measure) => self.check_measure(measure),
            Statement::Reset(reset) => self
                .check_arg(&reset.target, RegisterKind::Quantum)
                .map(|_| ()),
            Statement::Barrier(barrier) => {
                for target in &barrier.targets {
                    self.check_arg(target, RegisterKind::Quantum)?;
                }
                Ok(())
            }
            Statement::If(cond) => {
                let info = self.scope.register(&cond.creg).ok_or_else(|| {
                    QasmError::semantic(
                        SemanticErrorKind::UnknownRegister,
                        cond.position,
                        format!("register '{}' is not declared", cond.creg),
                    )
                })?;
                if info.kind != RegisterKind::Classical {
                    return Err(QasmError::semantic(
                        SemanticErrorKind::RegisterKindMismatch,
                        cond.position,
                        format!("condition on '{}' requires a creg, found a qreg", cond.creg),
                    ));
                }
                self.check_call(&cond.body)
            }
        }
    }

    fn declare_register(&mut self, decl: &RegisterDecl) -> ParseResult<()> {
        if decl.size == 0 {
            return Err(QasmError::semantic(
                SemanticErrorKind::InvalidRegisterSize,
                decl.position,
                format!("register '{}' must have at least one element", decl.name),
            ));
        }
        let info = RegisterInfo {
            kind: decl.kind,
            size: decl.size,
        };
        if !self.scope.declare_register(&decl.name, info) {
            return Err(QasmError::semantic(
                SemanticErrorKind::DuplicateDeclaration,
                decl.position,
                format!("register '{}' is already declared", decl.name),
            ));
        }
        Ok(())
    }

    fn declare_gate(&mut self, decl: &GateDecl) -> ParseResult<()> {
        self.check_gate_name(&decl.name, decl.position)?;
        check_formals(&decl.params, &decl.qargs, decl.position)?;

        let formals = Formals {
            params: &decl.params,
            qargs: &decl.qargs,
        };
        for call in &decl.body {
            self.check_body_call(call, &formals)?;
        }

        let signature = GateSignature::new(decl.params.len(), decl.qargs.len());
        self.scope.declare_gate(&decl.name, signature);
        Ok(())
    }

    fn declare_opaque(&mut self, decl: &OpaqueDecl) -> ParseResult<()> {
        self.check_gate_name(&decl.name, decl.position)?;
        check_formals(&decl.params, &decl.qargs, decl.position)?;

        let signature = GateSignature::opaque(decl.params.len(), decl.qargs.len());
        self.scope.declare_gate(&decl.name, signature);
        Ok(())
    }

    fn check_gate_name(&self, name: &str, position: Position) -> ParseResult<()> {
        if self.scope.gate(name).is_none() {
            return Ok(());
        }
        let detail = if self.scope.is_library_gate(name) {
            format!("gate '{name}' shadows a standard library gate")
        } else {
            format!("gate '{name}' is already declared")
        };
        Err(QasmError::semantic(
            SemanticErrorKind::DuplicateDeclaration,
            position,
            detail,
        ))
    }

    /// Look up a callee and check its parameter and qubit counts.
    fn check_signature(&self, call: &GateCall) -> ParseResult<()> {
        let signature = self.scope.gate(&call.name).ok_or_else(|| {
            QasmError::semantic(
                SemanticErrorKind::UnknownGate,
                call.position,
                format!("gate '{}' is not declared", call.name),
            )
        })?;

        if call.params.len() != signature.num_params || call.qargs.len() != signature.num_qubits
        {
            return Err(QasmError::semantic(
                SemanticErrorKind::ArityMismatch,
                call.position,
                format!(
                    "gate '{}' takes {} parameters and {} qubits, got {} and {}",
                    call.name,
                    signature.num_params,
                    signature.num_qubits,
                    call.params.len(),
                    call.qargs.len()
                ),
            ));
        }
        Ok(())
    }

    /// A top-level gate application.
    fn check_call(&self, call: &GateCall) -> ParseResult<()> {
        self.check_signature(call)?;

        // Outside a gate body no identifier can be bound.
        if let Some(name) = call.params.iter().flat_map(|p| p.identifiers()).next() {
            return Err(QasmError::semantic(
                SemanticErrorKind::UnknownParameter,
                call.position,
                format!("parameter '{name}' is not defined outside a gate body"),
            ));
        }

        let mut broadcast: Option<(&str, u64)> = None;
        for arg in &call.qargs {
            let size = self.check_arg(arg, RegisterKind::Quantum)?;
            if arg.index.is_some() {
                continue;
            }
            match broadcast {
                None => broadcast = Some((arg.register.as_str(), size)),
                Some((first, expected)) if expected != size => {
                    return Err(QasmError::semantic(
                        SemanticErrorKind::BroadcastMismatch,
                        call.position,
                        format!(
                            "registers '{first}' (size {expected}) and '{}' (size {size}) differ in size",
                            arg.register
                        ),
                    ));
                }
                Some(_) => {}
            }
        }

        check_overlap(&call.qargs)
    }

    /// A gate application inside a gate body. Arguments are formal names only.
    fn check_body_call(&self, call: &GateCall, formals: &Formals<'_>) -> ParseResult<()> {
        self.check_signature(call)?;

        for param in &call.params {
            if let Some(name) = param
                .identifiers()
                .into_iter()
                .find(|id| !formals.params.iter().any(|p| p.as_str() == *id))
            {
                return Err(QasmError::semantic(
                    SemanticErrorKind::UnknownParameter,
                    call.position,
                    format!("'{name}' is not a parameter of the enclosing gate"),
                ));
            }
        }

        for arg in &call.qargs {
            if arg.index.is_some() {
                return Err(QasmError::semantic(
                    SemanticErrorKind::InvalidGateBody,
                    arg.position,
                    format!("indexed argument '{arg}' is not allowed inside a gate body"),
                ));
            }
            if !formals.qargs.contains(&arg.register) {
                return Err(QasmError::semantic(
                    SemanticErrorKind::UnknownRegister,
                    arg.position,
                    format!("'{}' is not a qubit argument of the enclosing gate", arg.register),
                ));
            }
        }

        check_overlap(&call.qargs)
    }

    fn check_measure(&self, measure: &Measure) -> ParseResult<()> {
        let source_size = self.check_arg(&measure.source, RegisterKind::Quantum)?;
        let target_size = self.check_arg(&measure.target, RegisterKind::Classical)?;

        match (measure.source.index, measure.target.index) {
            (Some(_), Some(_)) => Ok(()),
            (None, None) if source_size == target_size => Ok(()),
            (None, None) => Err(QasmError::semantic(
                SemanticErrorKind::BroadcastMismatch,
                measure.position,
                format!(
                    "cannot measure '{}' (size {source_size}) into '{}' (size {target_size})",
                    measure.source.register, measure.target.register
                ),
            )),
            _ => Err(QasmError::semantic(
                SemanticErrorKind::BroadcastMismatch,
                measure.position,
                format!(
                    "cannot measure '{}' into '{}': register and single bit mixed",
                    measure.source, measure.target
                ),
            )),
        }
    }

    /// Resolve a register reference, returning the register size.
    fn check_arg(&self, arg: &RegisterRef, kind: RegisterKind) -> ParseResult<u64> {
        let info = self.scope.register(&arg.register).ok_or_else(|| {
            QasmError::semantic(
                SemanticErrorKind::UnknownRegister,
                arg.position,
                format!("register '{}' is not declared", arg.register),
            )
        })?;

        if info.kind != kind {
            return Err(QasmError::semantic(
                SemanticErrorKind::RegisterKindMismatch,
                arg.position,
                format!("'{}' is a {}, expected a {kind}", arg.register, info.kind),
            ));
        }

        if let Some(index) = arg.index.filter(|&i| i >= info.size) {
            return Err(QasmError::semantic(
                SemanticErrorKind::IndexOutOfRange,
                arg.position,
                format!(
                    "index {index} out of range for register '{}' of size {}",
                    arg.register, info.size
                ),
            ));
        }

        Ok(info.size)
    }
}

fn check_version(index: usize, decl: &VersionDecl) -> ParseResult<()> {
    if index != 0 {
        return Err(QasmError::semantic(
            SemanticErrorKind::MisplacedVersion,
            decl.position,
            "OPENQASM declaration must be the first statement and appear once",
        ));
    }
    if decl.major != 2 {
        return Err(QasmError::semantic(
            SemanticErrorKind::UnsupportedVersion,
            decl.position,
            format!("version {}.{} is not supported", decl.major, decl.minor),
        ));
    }
    Ok(())
}

/// Formal parameter and qubit names must be distinct.
fn check_formals(params: &[String], qargs: &[String], position: Position) -> ParseResult<()> {
    let mut seen = FxHashSet::default();
    for name in params.iter().chain(qargs) {
        if !seen.insert(name.as_str()) {
            return Err(QasmError::semantic(
                SemanticErrorKind::DuplicateDeclaration,
                position,
                format!("formal '{name}' is declared twice"),
            ));
        }
    }
    Ok(())
}

/// The same qubit may not appear twice in one call.
fn check_overlap(args: &[RegisterRef]) -> ParseResult<()> {
    for (i, later) in args.iter().enumerate() {
        let clash = args[..i].iter().find(|earlier| {
            earlier.register == later.register
                && (earlier.index.is_none() || later.index.is_none() || earlier.index == later.index)
        });
        if let Some(earlier) = clash {
            return Err(QasmError::semantic(
                SemanticErrorKind::OverlappingArguments,
                later.position,
                format!("'{later}' overlaps earlier argument '{earlier}'"),
            ));
        }
    }
    Ok(())
}
