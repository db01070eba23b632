//! Token types and definitions for the guest lexer.

use interop_core::Span;
use std::fmt;

/// A token from the source code.
///
/// The `'ast` lifetime refers to the arena where the lexeme string is
/// allocated, so the source string may be dropped after lexing.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token types of the guest subset.
///
/// `>` is always lexed as a single token, so `Foo<Bar<int>>` closes two
/// argument lists without any splitting in the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// Integer literal: `42`, `0x2A`, `4u`
    IntLiteral,
    /// Floating literal: `1.5`, `2.0f` (only seen inside skipped bodies)
    FloatLiteral,
    /// Character literal: `'a'`
    CharLiteral,
    /// String literal: `"message"`
    StringLiteral,

    Identifier,

    // =========================================
    // Keywords - Builtin type specifiers
    // =========================================
    Void,
    Bool,
    Char,
    Short,
    Int,
    Long,
    Signed,
    Unsigned,
    Float,
    Double,

    // =========================================
    // Keywords - Values
    // =========================================
    True,
    False,

    // =========================================
    // Keywords - Declarations
    // =========================================
    Struct,
    Class,
    Union,
    Enum,
    Template,
    Typename,
    Namespace,
    Using,
    Typedef,
    Operator,
    Friend,
    Public,
    Private,
    Protected,
    StaticAssert,
    SizeOf,
    AlignOf,

    // =========================================
    // Keywords - Specifiers
    // =========================================
    Const,
    Volatile,
    Static,
    Virtual,
    Inline,
    Constexpr,
    Explicit,
    Mutable,
    Extern,

    // =========================================
    // Operators
    // =========================================
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Question,
    Colon,
    ColonColon,
    Dot,
    Arrow,

    // =========================================
    // Delimiters
    // =========================================
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Semicolon,
    Comma,

    // =========================================
    // Special
    // =========================================
    Eof,
    Error,
}

impl TokenKind {
    /// Whether this keyword can appear in a builtin type specifier sequence.
    pub fn is_builtin_type_word(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Void | Bool | Char | Short | Int | Long | Signed | Unsigned | Float | Double
        )
    }

    pub fn is_record_key(self) -> bool {
        matches!(self, TokenKind::Struct | TokenKind::Class | TokenKind::Union)
    }

    /// Human-readable description for error messages.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral => "integer literal",
            FloatLiteral => "floating literal",
            CharLiteral => "character literal",
            StringLiteral => "string literal",
            Identifier => "identifier",
            Void => "'void'",
            Bool => "'bool'",
            Char => "'char'",
            Short => "'short'",
            Int => "'int'",
            Long => "'long'",
            Signed => "'signed'",
            Unsigned => "'unsigned'",
            Float => "'float'",
            Double => "'double'",
            True => "'true'",
            False => "'false'",
            Struct => "'struct'",
            Class => "'class'",
            Union => "'union'",
            Enum => "'enum'",
            Template => "'template'",
            Typename => "'typename'",
            Namespace => "'namespace'",
            Using => "'using'",
            Typedef => "'typedef'",
            Operator => "'operator'",
            Friend => "'friend'",
            Public => "'public'",
            Private => "'private'",
            Protected => "'protected'",
            StaticAssert => "'static_assert'",
            SizeOf => "'sizeof'",
            AlignOf => "'alignof'",
            Const => "'const'",
            Volatile => "'volatile'",
            Static => "'static'",
            Virtual => "'virtual'",
            Inline => "'inline'",
            Constexpr => "'constexpr'",
            Explicit => "'explicit'",
            Mutable => "'mutable'",
            Extern => "'extern'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            Amp => "'&'",
            AmpAmp => "'&&'",
            Pipe => "'|'",
            PipePipe => "'||'",
            Caret => "'^'",
            Tilde => "'~'",
            Bang => "'!'",
            BangEqual => "'!='",
            Equal => "'='",
            EqualEqual => "'=='",
            Less => "'<'",
            LessEqual => "'<='",
            Greater => "'>'",
            GreaterEqual => "'>='",
            Question => "'?'",
            Colon => "':'",
            ColonColon => "'::'",
            Dot => "'.'",
            Arrow => "'->'",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            Semicolon => "';'",
            Comma => "','",
            Eof => "end of file",
            Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Look up a keyword by its spelling.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "void" => Void,
        "bool" => Bool,
        "char" => Char,
        "short" => Short,
        "int" => Int,
        "long" => Long,
        "signed" => Signed,
        "unsigned" => Unsigned,
        "float" => Float,
        "double" => Double,

        "true" => True,
        "false" => False,

        "struct" => Struct,
        "class" => Class,
        "union" => Union,
        "enum" => Enum,
        "template" => Template,
        "typename" => Typename,
        "namespace" => Namespace,
        "using" => Using,
        "typedef" => Typedef,
        "operator" => Operator,
        "friend" => Friend,
        "public" => Public,
        "private" => Private,
        "protected" => Protected,
        "static_assert" => StaticAssert,
        "sizeof" => SizeOf,
        "alignof" | "_Alignof" | "__alignof__" => AlignOf,

        "const" => Const,
        "volatile" => Volatile,
        "static" => Static,
        "virtual" => Virtual,
        "inline" => Inline,
        "constexpr" => Constexpr,
        "explicit" => Explicit,
        "mutable" => Mutable,
        "extern" => Extern,

        _ => return None,
    })
}
