//! Error types for the OpenQASM 2 front end.
//!
//! Every failure surfaces as one [`QasmError`]. Callers branch on
//! [`QasmError::code`], which is stable across releases, instead of matching
//! on message text.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An unrecognised character in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized character '{ch}' at line {line}, column {column}")]
pub struct LexError {
    pub line: u32,
    pub column: u32,
    pub ch: char,
}

/// A token that cannot continue any derivation of the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "syntax error at line {line}, column {column}: expected {}, found {found}",
    format_expected(.expected)
)]
pub struct SyntaxError {
    pub line: u32,
    pub column: u32,
    /// Human-readable descriptions of every token that would have been accepted.
    pub expected: Vec<String>,
    pub found: String,
}

/// Category of a semantic failure.
///
/// The string form of each variant is the error code reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SemanticErrorKind {
    UnknownRegister,
    UnknownGate,
    ArityMismatch,
    IndexOutOfRange,
    DuplicateDeclaration,
    MisplacedVersion,
    UnsupportedVersion,
    InvalidRegisterSize,
    RegisterKindMismatch,
    BroadcastMismatch,
    OverlappingArguments,
    UnknownParameter,
    InvalidGateBody,
}

impl SemanticErrorKind {
    /// Stable code for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            SemanticErrorKind::UnknownRegister => "UnknownRegister",
            SemanticErrorKind::UnknownGate => "UnknownGate",
            SemanticErrorKind::ArityMismatch => "ArityMismatch",
            SemanticErrorKind::IndexOutOfRange => "IndexOutOfRange",
            SemanticErrorKind::DuplicateDeclaration => "DuplicateDeclaration",
            SemanticErrorKind::MisplacedVersion => "MisplacedVersion",
            SemanticErrorKind::UnsupportedVersion => "UnsupportedVersion",
            SemanticErrorKind::InvalidRegisterSize => "InvalidRegisterSize",
            SemanticErrorKind::RegisterKindMismatch => "RegisterKindMismatch",
            SemanticErrorKind::BroadcastMismatch => "BroadcastMismatch",
            SemanticErrorKind::OverlappingArguments => "OverlappingArguments",
            SemanticErrorKind::UnknownParameter => "UnknownParameter",
            SemanticErrorKind::InvalidGateBody => "InvalidGateBody",
        }
    }
}

impl fmt::Display for SemanticErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A well-formed program that breaks a semantic rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}: {detail}")]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub line: u32,
    pub column: u32,
    pub detail: String,
}

/// Errors that can occur while parsing and validating OpenQASM 2.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum QasmError {
    /// The caller supplied no circuit text.
    #[error("Required argument missing: {0}")]
    MissingArgument(&'static str),

    /// Lexer error (unrecognised character).
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Token sequence does not match the grammar.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Well-formed but invalid program.
    #[error(transparent)]
    Semantic(#[from] SemanticError),

    /// The bundled standard library failed to load. This is a packaging
    /// defect, never a problem with user input.
    #[error("Standard library failed to load: {0}")]
    LibraryLoadFault(Box<QasmError>),
}

impl QasmError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            QasmError::MissingArgument(_) => "MissingArgument",
            QasmError::Lex(_) => "LexError",
            QasmError::Syntax(_) => "SyntaxError",
            QasmError::Semantic(e) => e.kind.as_str(),
            QasmError::LibraryLoadFault(_) => "LibraryLoadFault",
        }
    }

    /// 1-based source line, or 0 when the error has no source position.
    pub fn line(&self) -> u32 {
        match self {
            QasmError::MissingArgument(_) => 0,
            QasmError::Lex(e) => e.line,
            QasmError::Syntax(e) => e.line,
            QasmError::Semantic(e) => e.line,
            QasmError::LibraryLoadFault(inner) => inner.line(),
        }
    }

    /// 1-based source column, or 0 when the error has no source position.
    pub fn column(&self) -> u32 {
        match self {
            QasmError::MissingArgument(_) => 0,
            QasmError::Lex(e) => e.column,
            QasmError::Syntax(e) => e.column,
            QasmError::Semantic(e) => e.column,
            QasmError::LibraryLoadFault(inner) => inner.column(),
        }
    }

    /// The semantic kind, if this is a semantic error.
    pub fn semantic_kind(&self) -> Option<SemanticErrorKind> {
        match self {
            QasmError::Semantic(e) => Some(e.kind),
            _ => None,
        }
    }

    /// Uniform payload for callers that serialise diagnostics.
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            message: self.to_string(),
            line: self.line(),
            column: self.column(),
            code: self.code().to_string(),
        }
    }

    pub(crate) fn semantic(
        kind: SemanticErrorKind,
        position: crate::ast::Position,
        detail: impl Into<String>,
    ) -> Self {
        QasmError::Semantic(SemanticError {
            kind,
            line: position.line,
            column: position.column,
            detail: detail.into(),
        })
    }
}

/// The same shape for every error kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub code: String,
}

/// Failure to reduce an expression to a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EvalError {
    /// The expression names a parameter with no bound value.
    #[error("Identifier '{0}' is unbound")]
    UnboundIdentifier(String),

    /// A division whose divisor evaluates to zero.
    #[error("Division by zero")]
    DivisionByZero,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, QasmError>;

fn format_expected(expected: &[String]) -> String {
    match expected {
        [] => "nothing".into(),
        [one] => one.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("one of {}, or {last}", init.join(", ")),
    }
}
