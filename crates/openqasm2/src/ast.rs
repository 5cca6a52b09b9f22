//! Abstract Syntax Tree for `OpenQASM` 2.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::library::QELIB1_PATH;

/// A 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A complete QASM2 program.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    /// Statements in source order.
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// The declared `(major, minor)` version, if the program has a header.
    pub fn version(&self) -> Option<(u32, u32)> {
        self.statements.iter().find_map(|s| match s {
            Statement::Version(v) => Some((v.major, v.minor)),
            _ => None,
        })
    }

    /// Paths of every `include` statement, in order.
    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Include(inc) => Some(inc.path.as_str()),
            _ => None,
        })
    }

    /// Included paths other than the bundled standard library.
    ///
    /// These are recorded but never read.
    pub fn unresolved_includes(&self) -> impl Iterator<Item = &str> {
        self.includes().filter(|p| *p != QELIB1_PATH)
    }

    /// Every top-level gate application, including conditional bodies.
    pub fn gate_calls(&self) -> impl Iterator<Item = &GateCall> {
        self.statements.iter().filter_map(|s| match s {
            Statement::GateCall(call) => Some(call),
            Statement::If(cond) => Some(&cond.body),
            _ => None,
        })
    }
}

/// A statement in a QASM2 program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// `OPENQASM 2.0;`
    Version(VersionDecl),

    /// `include "qelib1.inc";`
    Include(Include),

    /// `qreg q[n];` or `creg c[n];`
    Register(RegisterDecl),

    /// Gate definition with a body.
    GateDecl(GateDecl),

    /// Gate declaration without a body (hardware-defined).
    Opaque(OpaqueDecl),

    /// Gate application.
    GateCall(GateCall),

    /// `measure q -> c;`
    Measure(Measure),

    /// `reset q;`
    Reset(Reset),

    /// `barrier q, r;`
    Barrier(Barrier),

    /// `if (c == n) gate ...;`
    If(Conditional),
}

impl Statement {
    /// Position of the statement's first token.
    pub fn position(&self) -> Position {
        match self {
            Statement::Version(s) => s.position,
            Statement::Include(s) => s.position,
            Statement::Register(s) => s.position,
            Statement::GateDecl(s) => s.position,
            Statement::Opaque(s) => s.position,
            Statement::GateCall(s) => s.position,
            Statement::Measure(s) => s.position,
            Statement::Reset(s) => s.position,
            Statement::Barrier(s) => s.position,
            Statement::If(s) => s.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionDecl {
    pub major: u32,
    pub minor: u32,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Include {
    pub path: String,
    pub position: Position,
}

/// Quantum or classical register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterKind {
    Quantum,
    Classical,
}

impl RegisterKind {
    /// The declaring keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            RegisterKind::Quantum => "qreg",
            RegisterKind::Classical => "creg",
        }
    }
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterDecl {
    pub kind: RegisterKind,
    pub name: String,
    pub size: u64,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecl {
    pub name: String,
    /// Formal classical parameters.
    pub params: Vec<String>,
    /// Formal qubit arguments.
    pub qargs: Vec<String>,
    pub body: Vec<GateCall>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueDecl {
    pub name: String,
    pub params: Vec<String>,
    pub qargs: Vec<String>,
    pub position: Position,
}

/// A gate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name.
    pub name: String,
    /// Parameter expressions, kept symbolic.
    pub params: Vec<Expression>,
    /// Qubits the gate acts on.
    pub qargs: Vec<QubitArg>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub source: QubitArg,
    pub target: BitArg,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reset {
    pub target: QubitArg,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barrier {
    pub targets: Vec<QubitArg>,
    pub position: Position,
}

/// Classically conditioned gate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    /// Classical register compared against `value`.
    pub creg: String,
    pub value: u64,
    pub body: GateCall,
    pub position: Position,
}

/// Reference to a register or one of its elements: `q` or `q[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRef {
    pub register: String,
    /// `None` addresses the whole register.
    pub index: Option<u64>,
    pub position: Position,
}

/// Reference to a qubit or quantum register.
pub type QubitArg = RegisterRef;

/// Reference to a bit or classical register.
pub type BitArg = RegisterRef;

impl RegisterRef {
    /// Create a reference to a single element.
    pub fn single(register: impl Into<String>, index: u64) -> Self {
        RegisterRef {
            register: register.into(),
            index: Some(index),
            position: Position::default(),
        }
    }

    /// Create a reference to an entire register.
    pub fn register(register: impl Into<String>) -> Self {
        RegisterRef {
            register: register.into(),
            index: None,
            position: Position::default(),
        }
    }

    pub fn is_whole_register(&self) -> bool {
        self.index.is_none()
    }
}

impl fmt::Display for RegisterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.register),
            None => write!(f, "{}", self.register),
        }
    }
}

/// Built-in unary functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryFn {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
}

impl UnaryFn {
    pub fn name(self) -> &'static str {
        match self {
            UnaryFn::Sin => "sin",
            UnaryFn::Cos => "cos",
            UnaryFn::Tan => "tan",
            UnaryFn::Exp => "exp",
            UnaryFn::Ln => "ln",
            UnaryFn::Sqrt => "sqrt",
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryFn::Sin => x.sin(),
            UnaryFn::Cos => x.cos(),
            UnaryFn::Tan => x.tan(),
            UnaryFn::Exp => x.exp(),
            UnaryFn::Ln => x.ln(),
            UnaryFn::Sqrt => x.sqrt(),
        }
    }
}

impl fmt::Display for UnaryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
            BinOp::Pow => 3,
        }
    }

    pub fn is_right_assoc(self) -> bool {
        matches!(self, BinOp::Pow)
    }
}

/// A parameter expression.
///
/// Parentheses leave no trace: `(pi)/(2)` and `pi/2` are the same tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Integer or real literal.
    Number(f64),
    /// The constant π.
    Pi,
    /// A formal parameter of the enclosing gate.
    Identifier(String),
    /// Negation.
    Neg(Box<Expression>),
    /// Binary operation.
    Binary {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Built-in function call.
    Call { func: UnaryFn, arg: Box<Expression> },
}

/// Precedence used when printing a negation.
const NEG_PRECEDENCE: u8 = 4;

impl Expression {
    /// Create a constant expression.
    pub fn constant(value: f64) -> Self {
        Expression::Number(value)
    }

    /// Create an identifier expression.
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn binary(op: BinOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Try to evaluate as a constant f64.
    pub fn as_f64(&self) -> Option<f64> {
        self.evaluate(&FxHashMap::default()).ok()
    }

    /// Evaluate with identifiers looked up in `bindings`.
    pub fn evaluate(&self, bindings: &FxHashMap<String, f64>) -> Result<f64, EvalError> {
        match self {
            Expression::Number(v) => Ok(*v),
            Expression::Pi => Ok(std::f64::consts::PI),
            Expression::Identifier(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| EvalError::UnboundIdentifier(name.clone())),
            Expression::Neg(e) => Ok(-e.evaluate(bindings)?),
            Expression::Binary { op, left, right } => {
                let l = left.evaluate(bindings)?;
                let r = right.evaluate(bindings)?;
                Ok(match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => {
                        if r == 0.0 {
                            return Err(EvalError::DivisionByZero);
                        }
                        l / r
                    }
                    BinOp::Pow => l.powf(r),
                })
            }
            Expression::Call { func, arg } => Ok(func.apply(arg.evaluate(bindings)?)),
        }
    }

    /// Every identifier referenced, sorted and deduplicated.
    pub fn identifiers(&self) -> BTreeSet<&str> {
        let mut set = BTreeSet::new();
        self.collect_identifiers(&mut set);
        set
    }

    fn collect_identifiers<'a>(&'a self, set: &mut BTreeSet<&'a str>) {
        match self {
            Expression::Number(_) | Expression::Pi => {}
            Expression::Identifier(name) => {
                set.insert(name);
            }
            Expression::Neg(e) | Expression::Call { arg: e, .. } => e.collect_identifiers(set),
            Expression::Binary { left, right, .. } => {
                left.collect_identifiers(set);
                right.collect_identifiers(set);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Binary { op, .. } => op.precedence(),
            Expression::Neg(_) => NEG_PRECEDENCE,
            Expression::Number(v) if v.is_sign_negative() => NEG_PRECEDENCE,
            _ => u8::MAX,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parens: bool) -> fmt::Result {
        if parens {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Large integral values print in exponent form so they re-lex as reals.
            Expression::Number(v) if v.is_finite() && v.abs() >= 1e15 => write!(f, "{v:e}"),
            Expression::Number(v) => write!(f, "{v}"),
            Expression::Pi => write!(f, "pi"),
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::Neg(e) => {
                write!(f, "-")?;
                e.fmt_operand(f, e.precedence() < u8::MAX)
            }
            Expression::Binary { op, left, right } => {
                let prec = op.precedence();
                let left_parens = if op.is_right_assoc() {
                    left.precedence() <= prec
                } else {
                    left.precedence() < prec
                };
                let right_parens = if op.is_right_assoc() {
                    right.precedence() < prec
                } else {
                    right.precedence() <= prec
                };
                left.fmt_operand(f, left_parens)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_operand(f, right_parens)
            }
            Expression::Call { func, arg } => write!(f, "{func}({arg})"),
        }
    }
}
