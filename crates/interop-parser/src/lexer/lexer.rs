//! Main lexer implementation for the guest subset.
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s, dispatching
//! on the first character of each token. Comments and preprocessor lines are
//! trivia. Lexemes are copied into the arena so the source string may be freed
//! once lexing completes.

use bumpalo::Bump;

use super::cursor::{Cursor, Mark, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};
use interop_core::LexError;

/// Lexer for guest source code.
///
/// The `'src` lifetime is the source string being lexed (temporary).
/// The `'ast` lifetime is the arena where token lexemes are allocated.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    errors: Vec<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
        }
    }

    /// Lex the whole input. The returned tokens always end with `Eof`.
    pub fn tokenize(mut self) -> (Vec<Token<'ast>>, Vec<LexError>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            if token.kind != TokenKind::Error {
                tokens.push(token);
            }
            if done {
                break;
            }
        }
        (tokens, self.errors)
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'ast> {
        if let Err(error) = self.skip_trivia() {
            return self.make_error(error);
        }

        if self.cursor.is_eof() {
            return self.make_eof();
        }

        let start = self.cursor.mark();

        match self.cursor.peek() {
            Some('"') => self.scan_quoted('"', start),
            Some('\'') => self.scan_quoted('\'', start),
            Some(c) if c.is_ascii_digit() => self.scan_number(start),
            Some('.') if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(start)
            }
            Some(c) if is_ident_start(c) => self.scan_identifier(start),
            _ => self.scan_operator(start),
        }
    }

    // =========================================
    // Internal: trivia
    // =========================================

    /// Skip whitespace, comments and preprocessor lines.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        self.cursor.eat_str("\u{FEFF}");

        loop {
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.advance();
                }
                Some('#') => self.cursor.skip_directive(),
                Some('/') if self.cursor.check_str("//") => self.cursor.skip_line(),
                Some('/') if self.cursor.check_str("/*") => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.cursor.mark();
        self.cursor.eat_str("/*");
        let span = self.cursor.span_since(start);
        loop {
            match self.cursor.advance() {
                None => return Err(LexError::UnterminatedComment { span }),
                Some('*') if self.cursor.eat('/') => return Ok(()),
                Some(_) => {}
            }
        }
    }

    // =========================================
    // Internal: token construction
    // =========================================

    fn make_eof(&self) -> Token<'ast> {
        Token::new(TokenKind::Eof, "", self.cursor.here())
    }

    /// Create a token from start position to current position.
    fn make_token(&self, kind: TokenKind, start: Mark) -> Token<'ast> {
        let span = self.cursor.span_since(start);
        let lexeme = self.arena.alloc_str(self.cursor.text_since(start));
        Token::new(kind, lexeme, span)
    }

    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Scanning: literals
    // =========================================

    /// Scan a string or character literal. Escapes are kept verbatim.
    fn scan_quoted(&mut self, quote: char, start: Mark) -> Token<'ast> {
        self.cursor.advance();

        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let span = self.cursor.span_since(start);
                    return self.make_error(LexError::UnterminatedString { span });
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    let kind = if quote == '"' {
                        TokenKind::StringLiteral
                    } else {
                        TokenKind::CharLiteral
                    };
                    return self.make_token(kind, start);
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Scan a number literal, including radix prefixes and suffixes.
    ///
    /// Integer values are decoded by the parser; the lexer only checks shape.
    fn scan_number(&mut self, start: Mark) -> Token<'ast> {
        let hex = self.cursor.check_str("0x") || self.cursor.check_str("0X");
        let binary = self.cursor.check_str("0b") || self.cursor.check_str("0B");
        if hex || binary {
            self.cursor.advance();
            self.cursor.advance();
            let digits = if hex {
                self.cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '\'')
            } else {
                self.cursor.eat_while(|c| c == '0' || c == '1' || c == '\'')
            };
            if digits.is_empty() {
                return self.make_error(LexError::InvalidNumber {
                    span: self.cursor.span_since(start),
                    detail: "expected digits after radix prefix".into(),
                });
            }
            self.cursor.eat_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
            return self.make_token(TokenKind::IntLiteral, start);
        }

        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '\'');
        let mut is_float = false;

        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
            is_float = true;
        }

        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            self.cursor.eat_while(|c| c.is_ascii_digit());
            is_float = true;
        }

        if is_float {
            self.cursor.eat_while(|c| matches!(c, 'f' | 'F' | 'l' | 'L'));
            return self.make_token(TokenKind::FloatLiteral, start);
        }

        self.cursor.eat_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
        if self.cursor.check(is_ident_continue) {
            self.cursor.eat_while(is_ident_continue);
            return self.make_error(LexError::InvalidNumber {
                span: self.cursor.span_since(start),
                detail: format!("invalid suffix on '{}'", self.cursor.text_since(start)),
            });
        }
        self.make_token(TokenKind::IntLiteral, start)
    }

    // =========================================
    // Scanning: identifiers and keywords
    // =========================================

    fn scan_identifier(&mut self, start: Mark) -> Token<'ast> {
        self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(self.cursor.text_since(start)).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    // =========================================
    // Scanning: operators
    // =========================================

    /// Scan an operator or punctuation token.
    ///
    /// Compound assignments, shifts and increments only occur inside skipped
    /// bodies, so they are lexed as sequences of single-character tokens.
    fn scan_operator(&mut self, start: Mark) -> Token<'ast> {
        let Some(c) = self.cursor.advance() else {
            return self.make_eof();
        };
        let next = self.cursor.peek();

        let kind = match (c, next) {
            ('(', _) => TokenKind::LeftParen,
            (')', _) => TokenKind::RightParen,
            ('[', _) => TokenKind::LeftBracket,
            (']', _) => TokenKind::RightBracket,
            ('{', _) => TokenKind::LeftBrace,
            ('}', _) => TokenKind::RightBrace,
            (';', _) => TokenKind::Semicolon,
            (',', _) => TokenKind::Comma,
            ('~', _) => TokenKind::Tilde,
            ('?', _) => TokenKind::Question,
            ('.', _) => TokenKind::Dot,
            ('+', _) => TokenKind::Plus,
            ('*', _) => TokenKind::Star,
            ('/', _) => TokenKind::Slash,
            ('%', _) => TokenKind::Percent,
            ('^', _) => TokenKind::Caret,
            // `>` never absorbs a following `=` or `>`; the expression parser
            // recombines `>=` from adjacent tokens.
            ('>', _) => TokenKind::Greater,

            (':', Some(':')) => { self.cursor.advance(); TokenKind::ColonColon }
            (':', _) => TokenKind::Colon,

            ('-', Some('>')) => { self.cursor.advance(); TokenKind::Arrow }
            ('-', _) => TokenKind::Minus,

            ('&', Some('&')) => { self.cursor.advance(); TokenKind::AmpAmp }
            ('&', _) => TokenKind::Amp,

            ('|', Some('|')) => { self.cursor.advance(); TokenKind::PipePipe }
            ('|', _) => TokenKind::Pipe,

            ('!', Some('=')) => { self.cursor.advance(); TokenKind::BangEqual }
            ('!', _) => TokenKind::Bang,

            ('=', Some('=')) => { self.cursor.advance(); TokenKind::EqualEqual }
            ('=', _) => TokenKind::Equal,

            ('<', Some('=')) => { self.cursor.advance(); TokenKind::LessEqual }
            ('<', _) => TokenKind::Less,

            _ => {
                let span = self.cursor.span_since(start);
                return self.make_error(LexError::UnexpectedChar { ch: c, span });
            }
        };

        self.make_token(kind, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interop_core::Span;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let arena = Bump::new();
        let (tokens, errors) = Lexer::new(source, &arena).tokenize();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn template_header() {
        use TokenKind::*;
        assert_eq!(
            kinds("template<class T, int num = 4>"),
            vec![Template, Less, Class, Identifier, Comma, Int, Identifier, Equal, IntLiteral, Greater, Eof]
        );
    }

    #[test]
    fn nested_closers_are_separate() {
        use TokenKind::*;
        assert_eq!(
            kinds("A<B<int>>"),
            vec![Identifier, Less, Identifier, Less, Int, Greater, Greater, Eof]
        );
    }

    #[test]
    fn comments_and_directives_are_trivia() {
        use TokenKind::*;
        let source = "#include <cstdio>\n#define X \\\n  1\n// line\n/* block\n */ int x;";
        assert_eq!(kinds(source), vec![Int, Identifier, Semicolon, Eof]);
    }

    #[test]
    fn spans_track_lines() {
        let arena = Bump::new();
        let (tokens, _) = Lexer::new("struct\n  Foo", &arena).tokenize();
        assert_eq!(tokens[1].span, Span::new(2, 3, 3));
        assert_eq!(tokens[1].lexeme, "Foo");
    }

    #[test]
    fn number_shapes() {
        use TokenKind::*;
        assert_eq!(kinds("42 0x2A 4u 10UL 1.5f 2e3"), vec![IntLiteral, IntLiteral, IntLiteral, IntLiteral, FloatLiteral, FloatLiteral, Eof]);
    }

    #[test]
    fn literals_in_bodies() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"{ f("a\"b", 'c'); }"#),
            vec![LeftBrace, Identifier, LeftParen, StringLiteral, Comma, CharLiteral, RightParen, Semicolon, RightBrace, Eof]
        );
    }

    #[test]
    fn errors_are_collected() {
        let arena = Bump::new();
        let (tokens, errors) = Lexer::new("int @ x; /* open", &arena).tokenize();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], LexError::UnexpectedChar { ch: '@', .. }));
        assert!(matches!(errors[1], LexError::UnterminatedComment { .. }));
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn bad_suffix_is_an_error() {
        let arena = Bump::new();
        let (_, errors) = Lexer::new("12abc", &arena).tokenize();
        assert!(matches!(errors[0], LexError::InvalidNumber { .. }));
    }
}
