//! The bundled standard gate library.

use tracing::info;

use crate::ast::{GateDecl, Program, Statement};
use crate::error::ParseResult;
use crate::lexer::tokenize;
use crate::parser::{ParseMode, parse_program};
use crate::symbols::SymbolTable;
use crate::validator::validate;

/// Include path satisfied by the bundled library.
pub const QELIB1_PATH: &str = "qelib1.inc";

/// Source text of the bundled library.
pub const QELIB1: &str = include_str!("../qelib1.inc");

/// A parsed and validated gate library.
#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    /// Declarations in source order.
    pub program: Program,
    /// Signatures of every declared gate.
    pub symbols: SymbolTable,
}

impl Library {
    /// Parse library text. Only `gate` and `opaque` declarations are allowed.
    pub fn load(text: &str) -> ParseResult<Self> {
        let tokens = tokenize(text)?;
        let program = parse_program(tokens, ParseMode::Library)?;
        let symbols = validate(&program, None)?;

        info!("Loaded gate library with {} gates", symbols.num_gates());

        Ok(Self { program, symbols })
    }

    /// Body of a composite gate. `None` for opaque or unknown gates.
    pub fn definition(&self, name: &str) -> Option<&GateDecl> {
        self.program.statements.iter().find_map(|s| match s {
            Statement::GateDecl(decl) if decl.name == name => Some(decl),
            _ => None,
        })
    }
}
