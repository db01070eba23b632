//! Parser state and token-stream helpers shared by the type, expression and
//! declaration parsers.

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;
use interop_core::{ParseError, ParseErrorKind, ParseErrors, Span};

use crate::lexer::{Lexer, Token, TokenKind};

use super::TranslationUnitAst;
use super::expr::Expr;
use super::types::TypeExpr;

/// Recursive-descent parser over a fully lexed token buffer.
///
/// Speculative parses (template arguments, elaborated type specifiers) save
/// `position` and restore it on failure; nothing else is mutated while
/// speculating.
pub struct Parser<'ast> {
    pub(super) arena: &'ast Bump,
    pub(super) buffer: Vec<Token<'ast>>,
    pub(super) position: usize,
    pub(super) errors: ParseErrors,
}

impl<'ast> Parser<'ast> {
    fn new(source: &str, arena: &'ast Bump) -> Self {
        let (buffer, lex_errors) = Lexer::new(source, arena).tokenize();
        let mut errors = ParseErrors::new();
        for error in lex_errors {
            errors.push(error.into());
        }
        Self {
            arena,
            buffer,
            position: 0,
            errors,
        }
    }

    /// Parse a complete translation unit.
    ///
    /// Parsing continues after errors (resynchronizing at the next
    /// declaration) so that every error in the file is reported.
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<TranslationUnitAst<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena);
        let unit = parser.parse_translation_unit();
        if parser.errors.is_empty() {
            Ok(unit)
        } else {
            Err(parser.errors)
        }
    }

    /// Parse a standalone type expression such as `const Foo<int, 4> *`.
    pub fn type_expr(source: &str, arena: &'ast Bump) -> Result<TypeExpr<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena);
        let result = parser.parse_type();
        parser.finish(result)
    }

    /// Parse a standalone constant expression.
    pub fn expression(source: &str, arena: &'ast Bump) -> Result<Expr<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena);
        let result = parser.parse_expr(true);
        parser.finish(result)
    }

    fn finish<T>(mut self, result: Result<T, ParseError>) -> Result<T, ParseErrors> {
        match result {
            Ok(value) if self.errors.is_empty() => {
                if self.is_eof() {
                    Ok(value)
                } else {
                    let token = self.peek();
                    self.errors.push(ParseError::unexpected_token(token.span, token.lexeme));
                    Err(self.errors)
                }
            }
            Ok(_) => Err(self.errors),
            Err(error) => {
                self.errors.push(error);
                Err(self.errors)
            }
        }
    }

    // =========================================
    // Token access
    // =========================================

    /// The current token. The buffer always ends with `Eof`.
    #[inline]
    pub(super) fn peek(&self) -> Token<'ast> {
        self.peek_nth(0)
    }

    #[inline]
    pub(super) fn peek_nth(&self, n: usize) -> Token<'ast> {
        let last = self.buffer.len().saturating_sub(1);
        self.buffer
            .get((self.position + n).min(last))
            .copied()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", Span::default()))
    }

    #[inline]
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    #[inline]
    pub(super) fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consume and return the current token (never moves past `Eof`).
    pub(super) fn advance(&mut self) -> Token<'ast> {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind.
    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a token of the given kind or fail.
    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected(kind.description()))
        }
    }

    /// Error for an unexpected current token.
    pub(super) fn expected(&self, what: &str) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            ParseError::unexpected_eof(token.span)
        } else {
            ParseError::expected_token(token.span, what, &format!("'{}'", token.lexeme))
        }
    }

    /// Span of the most recently consumed token.
    pub(super) fn prev_span(&self) -> Span {
        self.position
            .checked_sub(1)
            .and_then(|i| self.buffer.get(i))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    /// Span from `start` to the end of the most recently consumed token.
    pub(super) fn span_from(&self, start: Span) -> Span {
        start.merge(self.prev_span())
    }

    pub(super) fn alloc<T>(&self, value: T) -> &'ast T {
        self.arena.alloc(value)
    }

    pub(super) fn new_vec<T>(&self) -> BumpVec<'ast, T> {
        BumpVec::new_in(self.arena)
    }

    // =========================================
    // Skipping and recovery
    // =========================================

    /// Skip a balanced `open ... close` group, starting at `open`.
    pub(super) fn skip_balanced(&mut self, open: TokenKind, close: TokenKind) -> Result<(), ParseError> {
        let start = self.expect(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.advance();
            match token.kind {
                kind if kind == open => depth += 1,
                kind if kind == close => depth -= 1,
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ParseErrorKind::MismatchedDelimiter,
                        start.span,
                        format!("unclosed {}", open.description()),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Skip tokens until a `,`, `;`, `)` or `>` at nesting depth zero
    /// (not consumed). Used for initializers and default arguments.
    pub(super) fn skip_until_list_end(&mut self, stop_at_greater: bool) -> Result<(), ParseError> {
        loop {
            match self.peek().kind {
                TokenKind::Comma | TokenKind::Semicolon | TokenKind::RightParen | TokenKind::Eof => return Ok(()),
                TokenKind::Greater if stop_at_greater => return Ok(()),
                TokenKind::LeftParen => self.skip_balanced(TokenKind::LeftParen, TokenKind::RightParen)?,
                TokenKind::LeftBrace => self.skip_balanced(TokenKind::LeftBrace, TokenKind::RightBrace)?,
                TokenKind::LeftBracket => self.skip_balanced(TokenKind::LeftBracket, TokenKind::RightBracket)?,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip the rest of a declaration after an error: up to and including the
    /// next `;` at depth zero, or a balanced `{...}` group followed by an
    /// optional `;`. Stops before a closing `}` that belongs to an enclosing
    /// scope.
    pub(super) fn synchronize(&mut self) {
        loop {
            match self.peek().kind {
                TokenKind::Eof | TokenKind::RightBrace => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::LeftBrace => {
                    if self.skip_balanced(TokenKind::LeftBrace, TokenKind::RightBrace).is_err() {
                        return;
                    }
                    self.eat(TokenKind::Semicolon);
                    return;
                }
                TokenKind::LeftParen => {
                    if self.skip_balanced(TokenKind::LeftParen, TokenKind::RightParen).is_err() {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}
