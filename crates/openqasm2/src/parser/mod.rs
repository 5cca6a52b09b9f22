//! Parser for `OpenQASM` 2.

mod expression;
mod statement;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::ast::{Expression, Program};
use crate::error::{ParseResult, QasmError, SyntaxError};
use crate::library::{Library, QELIB1};
use crate::lexer::{SpannedToken, Token, tokenize};
use crate::symbols::{GateSignature, SymbolTable};
use crate::validator::validate;

/// Options recognised by [`Parser::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Preload the bundled standard gate library.
    pub core: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { core: true }
    }
}

/// Which statements the grammar accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Gate and opaque declarations only.
    Library,
    /// The full grammar.
    Circuit,
}

/// A program that passed validation, with its circuit-scoped symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProgram {
    pub program: Program,
    /// Registers and gates declared by the program itself (library entries excluded).
    pub symbols: SymbolTable,
}

/// An `OpenQASM` 2 parser.
///
/// Construction loads the standard library once; the library is shared
/// read-only by every subsequent [`Parser::parse`] call, so one instance can
/// serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Parser {
    options: ParserOptions,
    library: Option<Arc<Library>>,
}

impl Parser {
    /// Create a parser, preloading the standard library unless `options.core` is false.
    pub fn new(options: ParserOptions) -> ParseResult<Self> {
        let library = if options.core {
            let library = Library::load(QELIB1)
                .map_err(|e| QasmError::LibraryLoadFault(Box::new(e)))?;
            Some(Arc::new(library))
        } else {
            debug!("Standard library preloading disabled");
            None
        };
        Ok(Self { options, library })
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// The preloaded standard library, if any.
    pub fn library(&self) -> Option<&Library> {
        self.library.as_deref()
    }

    /// Signature of a preloaded gate.
    pub fn gate_signature(&self, name: &str) -> Option<&GateSignature> {
        self.library()?.symbols.gate(name)
    }

    /// Parse and validate a circuit.
    pub fn parse(&self, circuit: &str) -> ParseResult<Program> {
        self.parse_with_symbols(circuit).map(|v| v.program)
    }

    /// Parse and validate a circuit, also returning its symbol table.
    #[instrument(skip_all, fields(len = circuit.len()))]
    pub fn parse_with_symbols(&self, circuit: &str) -> ParseResult<ValidatedProgram> {
        if circuit.is_empty() {
            return Err(QasmError::MissingArgument("circuit"));
        }

        let tokens = tokenize(circuit)?;
        let program = parse_program(tokens, ParseMode::Circuit)?;
        let symbols = validate(&program, self.library().map(|lib| &lib.symbols))?;

        for path in program.unresolved_includes() {
            warn!("Include '{path}' is recorded but not resolved");
        }
        debug!(
            "Parsed {} statements, {} qubits, {} clbits",
            program.len(),
            symbols.num_qubits(),
            symbols.num_clbits()
        );

        Ok(ValidatedProgram { program, symbols })
    }
}

/// Parse a token stream into an unvalidated AST.
pub fn parse_program(tokens: Vec<SpannedToken>, mode: ParseMode) -> ParseResult<Program> {
    let mut grammar = Grammar::new(tokens, mode);
    grammar.parse_program()
}

/// Parse a single parameter expression.
pub fn parse_expression(source: &str) -> ParseResult<Expression> {
    if source.is_empty() {
        return Err(QasmError::MissingArgument("expression"));
    }
    let tokens = tokenize(source)?;
    let mut grammar = Grammar::new(tokens, ParseMode::Circuit);
    let expr = grammar.parse_expression()?;
    grammar.expect(&Token::Eof)?;
    Ok(expr)
}

/// Grammar state: a cursor over a token stream ending in `Eof`.
pub(super) struct Grammar {
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
    pub(super) mode: ParseMode,
    /// Current expression nesting.
    pub(super) depth: usize,
}

impl Grammar {
    /// Streams not produced by [`tokenize`] may lack the closing `Eof`; one is
    /// added after the last token.
    fn new(mut tokens: Vec<SpannedToken>, mode: ParseMode) -> Self {
        if !tokens.last().is_some_and(|t| t.token == Token::Eof) {
            let eof = SpannedToken::end_of_input(tokens.last());
            tokens.push(eof);
        }
        Self {
            tokens,
            pos: 0,
            mode,
            depth: 0,
        }
    }

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.peek() == &Token::Eof
    }

    /// Peek at the current token.
    pub(super) fn peek(&self) -> &Token {
        &self.current().token
    }

    pub(super) fn current(&self) -> &SpannedToken {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Advance and return the current token. Stays on `Eof`.
    pub(super) fn advance(&mut self) -> SpannedToken {
        let token = self.current().clone();
        if token.token != Token::Eof {
            self.pos += 1;
        }
        token
    }

    /// Expect a specific token.
    pub(super) fn expect(&mut self, expected: &Token) -> ParseResult<SpannedToken> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&[expected.describe()]))
        }
    }

    /// Check if current token matches (payloads ignored).
    pub(super) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    /// Consume token if it matches.
    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Syntax error at the current token.
    pub(super) fn unexpected<S: AsRef<str>>(&self, expected: &[S]) -> QasmError {
        let current = self.current();
        QasmError::Syntax(SyntaxError {
            line: current.line,
            column: current.column,
            expected: expected.iter().map(|s| s.as_ref().to_string()).collect(),
            found: current.found(),
        })
    }

    /// Parse the entire program.
    fn parse_program(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    /// Parse identifier list.
    pub(super) fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?.0];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?.0);
        }
        Ok(ids)
    }

    /// Parse an identifier, returning it with its token.
    pub(super) fn parse_identifier(&mut self) -> ParseResult<(String, SpannedToken)> {
        match self.peek() {
            Token::Identifier(name) => {
                let name = name.clone();
                Ok((name, self.advance()))
            }
            _ => Err(self.unexpected(&["identifier"])),
        }
    }

    /// Parse an integer literal.
    pub(super) fn parse_int_literal(&mut self) -> ParseResult<u64> {
        match *self.peek() {
            Token::IntLiteral(v) => {
                self.advance();
                Ok(v)
            }
            _ => Err(self.unexpected(&["integer"])),
        }
    }
}
