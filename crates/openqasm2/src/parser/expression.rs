//! Expression parsing for QASM2.

use super::Grammar;
use crate::ast::{BinOp, Expression};
use crate::error::{ParseResult, QasmError};
use crate::lexer::Token;

/// Tokens that can start an expression, as reported in diagnostics.
const EXPRESSION_START: &[&str] = &[
    "integer",
    "real number",
    "`pi`",
    "identifier",
    "function name",
    "`(`",
    "`-`",
];

/// Deepest expression accepted, counting both parser recursion and tree height.
///
/// Every later walk over an [`Expression`] (evaluation, printing, drop) recurses
/// once per level, so the bound keeps those walks off the end of the stack.
pub(super) const MAX_EXPR_DEPTH: usize = 256;

/// A parsed expression with the height of its tree.
type WithHeight = (Expression, usize);

impl Grammar {
    /// Parse an expression.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_binary_expr(0).map(|(expr, _)| expr)
    }

    /// Error for an expression nested past [`MAX_EXPR_DEPTH`], at the current token.
    fn too_deep(&self) -> QasmError {
        self.unexpected(&[format!(
            "at most {MAX_EXPR_DEPTH} levels of expression nesting"
        )])
    }

    fn check_height(&self, height: usize) -> ParseResult<usize> {
        if height > MAX_EXPR_DEPTH {
            return Err(self.too_deep());
        }
        Ok(height)
    }

    /// Parse binary expression with precedence climbing.
    ///
    /// Every recursive path through the expression grammar passes through here,
    /// so this is where nesting is counted.
    fn parse_binary_expr(&mut self, min_prec: u8) -> ParseResult<WithHeight> {
        if self.depth >= MAX_EXPR_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;

        let (mut left, mut height) = self.parse_unary_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance(); // consume operator

            let next_min = if op.is_right_assoc() { prec } else { prec + 1 };
            let (right, right_height) = self.parse_binary_expr(next_min)?;
            // Left-associative chains grow the tree without recursing here.
            height = self.check_height(height.max(right_height) + 1)?;
            left = Expression::binary(op, left, right);
        }

        self.depth -= 1;
        Ok((left, height))
    }

    /// Parse unary expression. Negation binds tighter than `^`.
    fn parse_unary_expr(&mut self) -> ParseResult<WithHeight> {
        let mut negations = 0;
        while self.check(&Token::Minus) {
            if negations == MAX_EXPR_DEPTH {
                return Err(self.too_deep());
            }
            self.advance();
            negations += 1;
        }

        let (mut expr, height) = self.parse_primary_expr()?;
        let height = self.check_height(height + negations)?;
        for _ in 0..negations {
            expr = Expression::Neg(Box::new(expr));
        }
        Ok((expr, height))
    }

    /// Parse primary expression.
    #[allow(clippy::cast_precision_loss)]
    fn parse_primary_expr(&mut self) -> ParseResult<WithHeight> {
        let leaf = match self.peek().clone() {
            Token::IntLiteral(v) => Expression::Number(v as f64),
            Token::RealLiteral(v) => Expression::Number(v),
            Token::Pi => Expression::Pi,
            Token::Identifier(name) => Expression::Identifier(name),
            Token::Function(func) => {
                self.advance();
                self.expect(&Token::LParen)?;
                let (arg, height) = self.parse_binary_expr(0)?;
                self.expect(&Token::RParen)?;
                let call = Expression::Call {
                    func,
                    arg: Box::new(arg),
                };
                return Ok((call, self.check_height(height + 1)?));
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_binary_expr(0)?;
                self.expect(&Token::RParen)?;
                return Ok(inner);
            }
            _ => return Err(self.unexpected(EXPRESSION_START)),
        };
        self.advance();
        Ok((leaf, 1))
    }

    /// Peek at binary operator.
    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek() {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Caret => Some(BinOp::Pow),
            _ => None,
        }
    }

    /// Parse a comma-separated expression list up to `)`.
    pub(super) fn parse_expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        if self.check(&Token::RParen) {
            return Ok(vec![]);
        }
        let mut exprs = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }
}
