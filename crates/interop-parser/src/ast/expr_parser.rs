//! Constant expression parsing.
//!
//! Binary operators use precedence climbing over [`BinaryOp::precedence`].
//! Inside a template argument list an unparenthesized `>` ends the argument
//! instead of acting as a comparison; `allow_greater` carries that state and
//! parentheses reset it.

use interop_core::{BinaryOp, ParseError, ParseErrorKind, UnaryOp, ensure_sufficient_stack};

use crate::lexer::{Token, TokenKind};

use super::expr::Expr;
use super::parser::Parser;
use super::types::Ident;

impl<'ast> Parser<'ast> {
    /// Parse a constant expression.
    pub fn parse_expr(&mut self, allow_greater: bool) -> Result<Expr<'ast>, ParseError> {
        self.parse_binary(1, allow_greater)
    }

    fn parse_binary(&mut self, min_prec: u8, allow_greater: bool) -> Result<Expr<'ast>, ParseError> {
        ensure_sufficient_stack(|| {
            let mut lhs = self.parse_unary(allow_greater)?;
            while let Some((op, width)) = self.peek_binary_op(allow_greater) {
                let prec = op.precedence();
                if prec < min_prec {
                    break;
                }
                for _ in 0..width {
                    self.advance();
                }
                let rhs = self.parse_binary(prec + 1, allow_greater)?;
                let span = lhs.span().merge(rhs.span());
                lhs = Expr::Binary {
                    op,
                    lhs: self.alloc(lhs),
                    rhs: self.alloc(rhs),
                    span,
                };
            }
            Ok(lhs)
        })
    }

    /// The binary operator at the current position and how many tokens it
    /// spans (`>=` is lexed as two adjacent tokens).
    fn peek_binary_op(&self, allow_greater: bool) -> Option<(BinaryOp, usize)> {
        let op = match self.peek().kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            TokenKind::EqualEqual => BinaryOp::Eq,
            TokenKind::BangEqual => BinaryOp::Ne,
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::LessEqual => BinaryOp::Le,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::Greater if allow_greater => {
                let this = self.peek();
                let next = self.peek_nth(1);
                return Some(if next.kind == TokenKind::Equal && adjacent(&this, &next) {
                    (BinaryOp::Ge, 2)
                } else {
                    (BinaryOp::Gt, 1)
                });
            }
            _ => return None,
        };
        Some((op, 1))
    }

    fn parse_unary(&mut self, allow_greater: bool) -> Result<Expr<'ast>, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.parse_primary(),
        };
        let start = self.advance().span;
        let operand = ensure_sufficient_stack(|| self.parse_unary(allow_greater))?;
        let span = start.merge(operand.span());
        Ok(Expr::Unary {
            op,
            operand: self.alloc(operand),
            span,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr<'ast>, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value = parse_int_literal(token.lexeme).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("invalid integer literal '{}'", token.lexeme),
                    )
                })?;
                Ok(Expr::Int { value, span: token.span })
            }
            TokenKind::CharLiteral => {
                self.advance();
                let value = parse_char_literal(token.lexeme).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("unsupported character literal {}", token.lexeme),
                    )
                })?;
                Ok(Expr::Int { value, span: token.span })
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(Expr::Bool {
                    value: token.kind == TokenKind::True,
                    span: token.span,
                })
            }
            TokenKind::Identifier => {
                self.advance();
                if self.check(TokenKind::ColonColon) {
                    return Err(ParseError::unsupported(
                        token.span,
                        "qualified names in constant expressions",
                    ));
                }
                Ok(Expr::Name(Ident::new(token.lexeme, token.span)))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr(true)?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }
            TokenKind::SizeOf | TokenKind::AlignOf => {
                self.advance();
                self.expect(TokenKind::LeftParen)?;
                let ty = self.parse_type()?;
                self.expect(TokenKind::RightParen)?;
                let span = self.span_from(token.span);
                let ty = self.alloc(ty);
                Ok(if token.kind == TokenKind::SizeOf {
                    Expr::SizeOf { ty, span }
                } else {
                    Expr::AlignOf { ty, span }
                })
            }
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),
            _ => Err(ParseError::new(
                ParseErrorKind::ExpectedExpression,
                token.span,
                format!("expected expression, found '{}'", token.lexeme),
            )),
        }
    }
}

fn adjacent(first: &Token<'_>, second: &Token<'_>) -> bool {
    first.span.line == second.span.line && first.span.col + first.span.len == second.span.col
}

/// Decode an integer literal: decimal, `0x` hex, `0b` binary or leading-zero
/// octal, with optional `'` separators and `u`/`l` suffixes.
fn parse_int_literal(lexeme: &str) -> Option<i128> {
    let body: String = lexeme
        .trim_end_matches(['u', 'U', 'l', 'L'])
        .chars()
        .filter(|&c| c != '\'')
        .collect();
    let (digits, radix) = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        (bin, 2)
    } else if body.len() > 1 && body.starts_with('0') {
        (&body[1..], 8)
    } else {
        (body.as_str(), 10)
    };
    let value = u128::from_str_radix(digits, radix).ok()?;
    i128::try_from(value).ok()
}

/// Decode a narrow character literal with simple escapes.
fn parse_char_literal(lexeme: &str) -> Option<i128> {
    let inner = lexeme.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let value = match chars.next()? {
        '\\' => match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            _ => return None,
        },
        c => c,
    };
    if chars.next().is_some() || !value.is_ascii() {
        return None;
    }
    Some(value as i128)
}
