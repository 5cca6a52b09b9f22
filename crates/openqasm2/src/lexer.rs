//! Lexer for `OpenQASM` 2.

use std::fmt;
use std::ops::Range;

use logos::Logos;
use serde::{Deserialize, Serialize};

use crate::ast::{Position, UnaryFn};
use crate::error::LexError;

/// Tokens for `OpenQASM` 2.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // Keywords
    #[token("OPENQASM")]
    OpenQasm,

    #[token("include")]
    Include,

    #[token("qreg")]
    Qreg,

    #[token("creg")]
    Creg,

    #[token("gate")]
    Gate,

    #[token("opaque")]
    Opaque,

    #[token("measure")]
    Measure,

    #[token("reset")]
    Reset,

    #[token("barrier")]
    Barrier,

    #[token("if")]
    If,

    #[token("pi")]
    Pi,

    // Built-in unary functions
    #[token("sin", |_| UnaryFn::Sin)]
    #[token("cos", |_| UnaryFn::Cos)]
    #[token("tan", |_| UnaryFn::Tan)]
    #[token("exp", |_| UnaryFn::Exp)]
    #[token("ln", |_| UnaryFn::Ln)]
    #[token("sqrt", |_| UnaryFn::Sqrt)]
    Function(UnaryFn),

    // Literals
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| parse_real(lex.slice()))]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| parse_real(lex.slice()))]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| parse_real(lex.slice()))]
    RealLiteral(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    IntLiteral(u64),

    #[regex(r#""[^"\n]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    StringLiteral(String),

    // Identifiers
    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Operators
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("^")]
    Caret,

    #[token("=")]
    Eq,

    #[token("==")]
    EqEq,

    #[token("->")]
    Arrow,

    // Punctuation
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    /// End of input. Never produced by logos; appended by [`tokenize`].
    Eof,
}

/// Reals that overflow to infinity are rejected.
fn parse_real(slice: &str) -> Option<f64> {
    slice.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coarse classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    Keyword,
    Identifier,
    Number,
    String,
    Symbol,
    Eof,
}

impl Token {
    /// Classify this token.
    pub fn class(&self) -> TokenClass {
        match self {
            Token::OpenQasm
            | Token::Include
            | Token::Qreg
            | Token::Creg
            | Token::Gate
            | Token::Opaque
            | Token::Measure
            | Token::Reset
            | Token::Barrier
            | Token::If
            | Token::Pi
            | Token::Function(_) => TokenClass::Keyword,
            Token::Identifier(_) => TokenClass::Identifier,
            Token::RealLiteral(_) | Token::IntLiteral(_) => TokenClass::Number,
            Token::StringLiteral(_) => TokenClass::String,
            Token::Eof => TokenClass::Eof,
            _ => TokenClass::Symbol,
        }
    }

    /// Description used in "expected ..." diagnostics.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Identifier(_) => "identifier".into(),
            Token::IntLiteral(_) => "integer".into(),
            Token::RealLiteral(_) => "real number".into(),
            Token::StringLiteral(_) => "string".into(),
            Token::Function(_) => "function name".into(),
            Token::Eof => "end of input".into(),
            other => format!("`{other}`"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::OpenQasm => write!(f, "OPENQASM"),
            Token::Include => write!(f, "include"),
            Token::Qreg => write!(f, "qreg"),
            Token::Creg => write!(f, "creg"),
            Token::Gate => write!(f, "gate"),
            Token::Opaque => write!(f, "opaque"),
            Token::Measure => write!(f, "measure"),
            Token::Reset => write!(f, "reset"),
            Token::Barrier => write!(f, "barrier"),
            Token::If => write!(f, "if"),
            Token::Pi => write!(f, "pi"),
            Token::Function(func) => write!(f, "{func}"),
            Token::RealLiteral(v) => write!(f, "{v}"),
            Token::IntLiteral(v) => write!(f, "{v}"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Identifier(s) => write!(f, "{s}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::Eq => write!(f, "="),
            Token::EqEq => write!(f, "=="),
            Token::Arrow => write!(f, "->"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Eof => write!(f, "<eof>"),
        }
    }
}

/// A token with its source text and position.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    /// The exact source slice the token was read from.
    pub lexeme: String,
    pub span: Range<usize>,
    pub line: u32,
    pub column: u32,
}

impl SpannedToken {
    /// An `Eof` placed just past `last`, or at 1:1 for an empty stream.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn end_of_input(last: Option<&SpannedToken>) -> Self {
        let (end, line, column) = match last {
            Some(t) => (
                t.span.end,
                t.line,
                t.column
                    .saturating_add(t.lexeme.chars().count() as u32),
            ),
            None => (0, 1, 1),
        };
        SpannedToken {
            token: Token::Eof,
            lexeme: String::new(),
            span: end..end,
            line,
            column,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// How this token is named in a "found ..." diagnostic.
    pub(crate) fn found(&self) -> String {
        match self.token {
            Token::Eof => "end of input".into(),
            _ => format!("`{}`", self.lexeme),
        }
    }
}

/// Running line/column position over the source.
///
/// Offsets passed to [`LineCursor::seek`] never decrease, so each character
/// is counted once.
struct LineCursor<'src> {
    source: &'src str,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'src> LineCursor<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Move to a byte offset and return its 1-based line and column (in characters).
    fn seek(&mut self, offset: usize) -> (u32, u32) {
        debug_assert!(offset >= self.offset);
        for ch in self.source[self.offset..offset].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = offset;
        (self.line, self.column)
    }
}

/// Tokenize an `OpenQASM` 2 source string.
///
/// Stops at the first unrecognised character. On success the returned
/// vector always ends with a single [`Token::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    let mut cursor = LineCursor::new(source);
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = cursor.seek(span.start);
        match result {
            Ok(token) => tokens.push(SpannedToken {
                token,
                lexeme: lexer.slice().to_string(),
                span,
                line,
                column,
            }),
            Err(()) => {
                let ch = source[span.start..].chars().next().unwrap_or('\0');
                return Err(LexError { line, column, ch });
            }
        }
    }

    let (line, column) = cursor.seek(source.len());
    tokens.push(SpannedToken {
        token: Token::Eof,
        lexeme: String::new(),
        span: source.len()..source.len(),
        line,
        column,
    });

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .filter(|t| *t != Token::Eof)
            .collect()
    }

    #[test]
    fn test_version_header() {
        let tokens = tokenize("OPENQASM 2.0;").unwrap();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].token, Token::OpenQasm);
        assert!(matches!(tokens[1].token, Token::RealLiteral(v) if (v - 2.0).abs() < 1e-12));
        assert_eq!(tokens[1].lexeme, "2.0");
        assert_eq!(tokens[2].token, Token::Semicolon);
        assert_eq!(tokens[3].token, Token::Eof);
    }

    #[test]
    fn test_register_declaration() {
        let tokens = kinds("qreg q[2];");

        assert_eq!(tokens[0], Token::Qreg);
        assert!(matches!(tokens[1], Token::Identifier(ref s) if s == "q"));
        assert_eq!(tokens[2], Token::LBracket);
        assert_eq!(tokens[3], Token::IntLiteral(2));
        assert_eq!(tokens[4], Token::RBracket);
        assert_eq!(tokens[5], Token::Semicolon);
    }

    #[test]
    fn test_parameterized_gate() {
        let tokens = kinds("u1(pi/2) q[0];");

        assert!(matches!(tokens[0], Token::Identifier(ref s) if s == "u1"));
        assert_eq!(tokens[1], Token::LParen);
        assert_eq!(tokens[2], Token::Pi);
        assert_eq!(tokens[3], Token::Slash);
        assert_eq!(tokens[4], Token::IntLiteral(2));
        assert_eq!(tokens[5], Token::RParen);
    }

    #[test]
    fn test_functions_and_operators() {
        let tokens = kinds("sqrt(2)^-x ln exp -> == =");

        assert_eq!(tokens[0], Token::Function(UnaryFn::Sqrt));
        assert_eq!(tokens[4], Token::Caret);
        assert_eq!(tokens[5], Token::Minus);
        assert_eq!(tokens[7], Token::Function(UnaryFn::Ln));
        assert_eq!(tokens[8], Token::Function(UnaryFn::Exp));
        assert_eq!(tokens[9], Token::Arrow);
        assert_eq!(tokens[10], Token::EqEq);
        assert_eq!(tokens[11], Token::Eq);
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let tokens = kinds("gates pi2 sine");

        assert!(matches!(tokens[0], Token::Identifier(ref s) if s == "gates"));
        assert!(matches!(tokens[1], Token::Identifier(ref s) if s == "pi2"));
        assert!(matches!(tokens[2], Token::Identifier(ref s) if s == "sine"));
    }

    #[test]
    fn test_real_literal_forms() {
        let tokens = kinds("1.5 .25 3e2 2.e-1");

        assert_eq!(tokens[0], Token::RealLiteral(1.5));
        assert_eq!(tokens[1], Token::RealLiteral(0.25));
        assert_eq!(tokens[2], Token::RealLiteral(300.0));
        assert_eq!(tokens[3], Token::RealLiteral(0.2));
    }

    #[test]
    fn test_string_literal() {
        let tokens = kinds("include \"qelib1.inc\";");

        assert_eq!(tokens[0], Token::Include);
        assert_eq!(tokens[1], Token::StringLiteral("qelib1.inc".into()));
        assert_eq!(tokens[1].class(), TokenClass::String);
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = r"
            // This is a comment
            qreg q[1]; // trailing
            creg c[1];
        ";

        // qreg q [ 1 ] ; creg c [ 1 ] ;
        assert_eq!(kinds(source).len(), 12);
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = tokenize("qreg q[1];\n  h q;").unwrap();

        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 6));
        let h = &tokens[6];
        assert_eq!(h.lexeme, "h");
        assert_eq!((h.line, h.column), (2, 3));
        let eof = tokens.last().unwrap();
        assert_eq!(eof.token, Token::Eof);
        assert_eq!((eof.line, eof.column), (2, 7));
    }

    #[test]
    fn test_columns_count_characters() {
        let tokens = tokenize("// état\nx q; // π\ny q;").unwrap();

        let y = tokens.iter().find(|t| t.lexeme == "y").unwrap();
        assert_eq!((y.line, y.column), (3, 1));
        let err = tokenize("U(π) q;").unwrap_err();
        assert_eq!((err.column, err.ch), (3, 'π'));
    }

    #[test]
    fn test_single_long_line() {
        let source = "h q; ".repeat(100_000);
        let tokens = tokenize(&source).unwrap();

        assert_eq!(tokens.len(), 300_001);
        let last_semi = &tokens[tokens.len() - 2];
        assert_eq!(last_semi.token, Token::Semicolon);
        assert_eq!((last_semi.line, last_semi.column), (1, 499_999));
        let eof = tokens.last().unwrap();
        assert_eq!((eof.line, eof.column), (1, 500_001));
    }

    #[test]
    fn test_unrecognised_character() {
        let err = tokenize("qreg q[1];\nh q$;").unwrap_err();

        assert_eq!(err.ch, '$');
        assert_eq!((err.line, err.column), (2, 4));
    }

    #[test]
    fn test_oversized_literals_are_lex_errors() {
        let err = tokenize("qreg q[99999999999999999999];").unwrap_err();
        assert_eq!((err.line, err.column, err.ch), (1, 8, '9'));

        let err = tokenize("rz(1e999) q;").unwrap_err();
        assert_eq!((err.column, err.ch), (4, '1'));
    }

    #[test]
    fn test_token_classes() {
        assert_eq!(Token::Measure.class(), TokenClass::Keyword);
        assert_eq!(Token::Function(UnaryFn::Cos).class(), TokenClass::Keyword);
        assert_eq!(Token::IntLiteral(3).class(), TokenClass::Number);
        assert_eq!(Token::Arrow.class(), TokenClass::Symbol);
        assert_eq!(Token::Eof.class(), TokenClass::Eof);
    }
}
