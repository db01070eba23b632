//! Character-level access to guest source.

use interop_core::Span;

/// A saved cursor position; tokens and errors are spanned from one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    offset: u32,
    line: u32,
    column: u32,
}

/// Walks source text one character at a time, keeping 1-based line and
/// byte-based column numbers in step.
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    source: &'src str,
    at: Mark,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            at: Mark {
                offset: 0,
                line: 1,
                column: 1,
            },
        }
    }

    #[inline]
    fn rest(&self) -> &'src str {
        &self.source[self.at.offset as usize..]
    }

    #[inline]
    pub fn mark(&self) -> Mark {
        self.at
    }

    /// Span from `start` to the current position.
    pub fn span_since(&self, start: Mark) -> Span {
        Span::new(start.line, start.column, self.at.offset - start.offset)
    }

    /// Source text from `start` to the current position.
    pub fn text_since(&self, start: Mark) -> &'src str {
        &self.source[start.offset as usize..self.at.offset as usize]
    }

    /// Zero-width span at the current position.
    pub fn here(&self) -> Span {
        Span::point(self.at.line, self.at.column)
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.at.offset as usize >= self.source.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The character `n` places ahead (0 is the current one).
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    #[inline]
    pub fn check(&self, f: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    #[inline]
    pub fn check_str(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        let len = ch.len_utf8() as u32;
        self.at.offset += len;
        if ch == '\n' {
            self.at.line += 1;
            self.at.column = 1;
        } else {
            self.at.column += len;
        }
        Some(ch)
    }

    /// Consume `s` if the input continues with it.
    pub fn eat_str(&mut self, s: &str) -> bool {
        if !self.check_str(s) {
            return false;
        }
        for _ in s.chars() {
            self.advance();
        }
        true
    }

    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        self.peek() == Some(ch) && self.advance().is_some()
    }

    /// Consume characters while `f` holds and return them.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.mark();
        while self.check(&f) {
            self.advance();
        }
        self.text_since(start)
    }

    /// Skip to (not past) the end of the line.
    pub fn skip_line(&mut self) {
        self.eat_while(|c| c != '\n');
    }

    /// Skip a preprocessor line, following backslash-newline continuations.
    pub fn skip_directive(&mut self) {
        loop {
            let line = self.eat_while(|c| c != '\n');
            if !(line.trim_end().ends_with('\\') && self.eat('\n')) {
                return;
            }
        }
    }
}

#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_and_spans() {
        let mut cursor = Cursor::new("ab\ncd");
        cursor.advance();
        let start = cursor.mark();
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.text_since(start), "b\n");
        assert_eq!(cursor.span_since(start), Span::new(1, 2, 2));
        assert_eq!(cursor.here(), Span::point(2, 1));
    }

    #[test]
    fn columns_count_bytes() {
        let mut cursor = Cursor::new("héllo");
        let start = cursor.mark();
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.text_since(start), "hé");
        assert_eq!(cursor.here(), Span::point(1, 4));
    }

    #[test]
    fn eating() {
        let mut cursor = Cursor::new("aaab::c");
        assert_eq!(cursor.eat_while(|c| c == 'a'), "aaa");
        assert!(!cursor.eat('x'));
        assert!(cursor.eat('b'));
        assert!(!cursor.eat_str(":x"));
        assert!(cursor.eat_str("::"));
        assert_eq!(cursor.peek(), Some('c'));
        assert_eq!(cursor.peek_nth(1), None);
    }

    #[test]
    fn directives_follow_continuations() {
        let mut cursor = Cursor::new("#define X \\\n  1\nint");
        cursor.skip_directive();
        assert_eq!(cursor.peek(), Some('\n'));
        assert_eq!(cursor.here(), Span::point(2, 4));

        let mut cursor = Cursor::new("// note \\\nint");
        cursor.skip_line();
        assert_eq!(cursor.here(), Span::point(1, 10));
    }

    #[test]
    fn ident_classes() {
        assert!(is_ident_start('_'));
        assert!(!is_ident_start('0'));
        assert!(is_ident_continue('0'));
        assert!(!is_ident_continue('-'));
    }
}
