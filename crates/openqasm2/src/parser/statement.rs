//! Statement parsing for QASM2.

use super::{Grammar, ParseMode};
use crate::ast::{
    Barrier, Conditional, GateCall, GateDecl, Include, Measure, OpaqueDecl, QubitArg,
    RegisterDecl, RegisterKind, RegisterRef, Reset, Statement, VersionDecl,
};
use crate::error::ParseResult;
use crate::lexer::Token;

const STATEMENT_START: &[&str] = &[
    "`OPENQASM`",
    "`include`",
    "`qreg`",
    "`creg`",
    "`gate`",
    "`opaque`",
    "`measure`",
    "`reset`",
    "`barrier`",
    "`if`",
    "identifier",
];

const DECLARATION_START: &[&str] = &["`gate`", "`opaque`"];

impl Grammar {
    /// Parse a statement.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        if self.mode == ParseMode::Library {
            return match self.peek() {
                Token::Gate => self.parse_gate_decl(),
                Token::Opaque => self.parse_opaque_decl(),
                _ => Err(self.unexpected(DECLARATION_START)),
            };
        }

        match self.peek() {
            Token::OpenQasm => self.parse_version(),
            Token::Include => self.parse_include(),
            Token::Qreg => self.parse_register_decl(RegisterKind::Quantum),
            Token::Creg => self.parse_register_decl(RegisterKind::Classical),
            Token::Gate => self.parse_gate_decl(),
            Token::Opaque => self.parse_opaque_decl(),
            Token::Measure => self.parse_measure(),
            Token::Reset => self.parse_reset(),
            Token::Barrier => self.parse_barrier(),
            Token::If => self.parse_if(),
            Token::Identifier(_) => {
                let call = self.parse_gate_call()?;
                self.expect(&Token::Semicolon)?;
                Ok(Statement::GateCall(call))
            }
            _ => Err(self.unexpected(STATEMENT_START)),
        }
    }

    /// Parse version declaration: `OPENQASM 2.0;`
    fn parse_version(&mut self) -> ParseResult<Statement> {
        let position = self.expect(&Token::OpenQasm)?.position();

        let (major, minor) = match self.peek() {
            Token::IntLiteral(_) | Token::RealLiteral(_) => {
                split_version(&self.current().lexeme)
                    .ok_or_else(|| self.unexpected(&["version number"]))?
            }
            _ => return Err(self.unexpected(&["version number"])),
        };
        self.advance();
        self.expect(&Token::Semicolon)?;

        Ok(Statement::Version(VersionDecl {
            major,
            minor,
            position,
        }))
    }

    /// Parse include statement.
    fn parse_include(&mut self) -> ParseResult<Statement> {
        let position = self.expect(&Token::Include)?.position();
        let path = match self.peek() {
            Token::StringLiteral(s) => s.clone(),
            _ => return Err(self.unexpected(&["string"])),
        };
        self.advance();
        self.expect(&Token::Semicolon)?;

        Ok(Statement::Include(Include { path, position }))
    }

    /// Parse `qreg name[size];` or `creg name[size];`.
    fn parse_register_decl(&mut self, kind: RegisterKind) -> ParseResult<Statement> {
        let position = self.advance().position();
        let (name, _) = self.parse_identifier()?;
        self.expect(&Token::LBracket)?;
        let size = self.parse_int_literal()?;
        self.expect(&Token::RBracket)?;
        self.expect(&Token::Semicolon)?;

        Ok(Statement::Register(RegisterDecl {
            kind,
            name,
            size,
            position,
        }))
    }

    /// Parse the shared `name (params)? qargs` header of gate and opaque declarations.
    fn parse_gate_header(&mut self) -> ParseResult<(String, Vec<String>, Vec<String>)> {
        let (name, _) = self.parse_identifier()?;

        let params = if self.consume(&Token::LParen) {
            let params = if self.check(&Token::RParen) {
                vec![]
            } else {
                self.parse_identifier_list()?
            };
            self.expect(&Token::RParen)?;
            params
        } else {
            vec![]
        };

        let qargs = self.parse_identifier_list()?;
        Ok((name, params, qargs))
    }

    /// Parse gate definition.
    fn parse_gate_decl(&mut self) -> ParseResult<Statement> {
        let position = self.expect(&Token::Gate)?.position();
        let (name, params, qargs) = self.parse_gate_header()?;

        self.expect(&Token::LBrace)?;
        let mut body = Vec::new();
        loop {
            match self.peek() {
                Token::RBrace => break,
                Token::Identifier(_) => {
                    body.push(self.parse_gate_call()?);
                    self.expect(&Token::Semicolon)?;
                }
                _ => return Err(self.unexpected(&["identifier", "`}`"])),
            }
        }
        self.expect(&Token::RBrace)?;

        Ok(Statement::GateDecl(GateDecl {
            name,
            params,
            qargs,
            body,
            position,
        }))
    }

    /// Parse opaque gate declaration.
    fn parse_opaque_decl(&mut self) -> ParseResult<Statement> {
        let position = self.expect(&Token::Opaque)?.position();
        let (name, params, qargs) = self.parse_gate_header()?;
        self.expect(&Token::Semicolon)?;

        Ok(Statement::Opaque(OpaqueDecl {
            name,
            params,
            qargs,
            position,
        }))
    }

    /// Parse a gate call without its terminating `;`.
    pub(super) fn parse_gate_call(&mut self) -> ParseResult<GateCall> {
        let (name, token) = self.parse_identifier()?;

        let params = if self.consume(&Token::LParen) {
            let params = self.parse_expression_list()?;
            self.expect(&Token::RParen)?;
            params
        } else {
            vec![]
        };

        let qargs = self.parse_arg_list()?;

        Ok(GateCall {
            name,
            params,
            qargs,
            position: token.position(),
        })
    }

    /// Parse measurement: `measure q -> c;`
    fn parse_measure(&mut self) -> ParseResult<Statement> {
        let position = self.expect(&Token::Measure)?.position();
        let source = self.parse_arg()?;
        self.expect(&Token::Arrow)?;
        let target = self.parse_arg()?;
        self.expect(&Token::Semicolon)?;

        Ok(Statement::Measure(Measure {
            source,
            target,
            position,
        }))
    }

    /// Parse reset statement.
    fn parse_reset(&mut self) -> ParseResult<Statement> {
        let position = self.expect(&Token::Reset)?.position();
        let target = self.parse_arg()?;
        self.expect(&Token::Semicolon)?;

        Ok(Statement::Reset(Reset { target, position }))
    }

    /// Parse barrier statement.
    fn parse_barrier(&mut self) -> ParseResult<Statement> {
        let position = self.expect(&Token::Barrier)?.position();
        let targets = self.parse_arg_list()?;
        self.expect(&Token::Semicolon)?;

        Ok(Statement::Barrier(Barrier { targets, position }))
    }

    /// Parse classically conditioned gate: `if (c == n) gate args;`
    fn parse_if(&mut self) -> ParseResult<Statement> {
        let position = self.expect(&Token::If)?.position();
        self.expect(&Token::LParen)?;
        let (creg, _) = self.parse_identifier()?;
        self.expect(&Token::EqEq)?;
        let value = self.parse_int_literal()?;
        self.expect(&Token::RParen)?;

        let body = self.parse_gate_call()?;
        self.expect(&Token::Semicolon)?;

        Ok(Statement::If(Conditional {
            creg,
            value,
            body,
            position,
        }))
    }

    /// Parse a comma-separated argument list.
    fn parse_arg_list(&mut self) -> ParseResult<Vec<QubitArg>> {
        let mut args = vec![self.parse_arg()?];
        while self.consume(&Token::Comma) {
            args.push(self.parse_arg()?);
        }
        Ok(args)
    }

    /// Parse `name` or `name[index]`.
    fn parse_arg(&mut self) -> ParseResult<RegisterRef> {
        let (register, token) = self.parse_identifier()?;

        let index = if self.consume(&Token::LBracket) {
            let index = self.parse_int_literal()?;
            self.expect(&Token::RBracket)?;
            Some(index)
        } else {
            None
        };

        Ok(RegisterRef {
            register,
            index,
            position: token.position(),
        })
    }
}

/// Split a version lexeme such as `2.0` into `(major, minor)`.
fn split_version(lexeme: &str) -> Option<(u32, u32)> {
    let (major, minor) = match lexeme.split_once('.') {
        Some((major, minor)) => (major, minor),
        None => (lexeme, "0"),
    };
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(major) || !is_digits(minor) {
        return None;
    }
    Some((major.parse().ok()?, minor.parse().ok()?))
}
