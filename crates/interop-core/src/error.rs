//! Error types for every phase of guest interop.
//!
//! ## Error Hierarchy
//!
//! ```text
//! FrontendError         - opening a translation unit
//! ├── Io                - the source file could not be read
//! ├── Parse(ParseErrors)  - lexer/parser errors (LexError converts into ParseError)
//! └── Sema(SemaErrors)    - declaration-level semantic errors
//!
//! InteropError          - the specialization pipeline (resolve → build →
//!                         canonicalize → instantiate → layout → emit)
//! ```
//!
//! Library code only returns these; turning them into exit codes is the
//! binary's job.

use std::path::PathBuf;

use thiserror::Error;

use crate::{Span, source_location};

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur while tokenizing guest source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("unterminated block comment")]
    UnterminatedComment { span: Span },

    #[error("invalid number: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::UnterminatedComment { span } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    ExpectedToken,
    UnexpectedToken,
    UnexpectedEof,
    ExpectedExpression,
    ExpectedType,
    ExpectedIdentifier,
    ExpectedDeclaration,
    MismatchedDelimiter,
    InvalidSyntax,
    InvalidLiteral,
    NotImplemented,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedDeclaration => "expected declaration",
            ParseErrorKind::MismatchedDelimiter => "mismatched delimiter",
            ParseErrorKind::InvalidSyntax => "invalid syntax",
            ParseErrorKind::InvalidLiteral => "invalid literal",
            ParseErrorKind::NotImplemented => "not supported",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn unexpected_token(span: Span, token: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            span,
            format!("unexpected token: {token}"),
        )
    }

    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof,
            span,
            "unexpected end of file",
        )
    }

    pub fn unsupported(span: Span, what: &str) -> Self {
        Self::new(
            ParseErrorKind::NotImplemented,
            span,
            format!("{what} are not supported"),
        )
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        let kind = match error {
            LexError::InvalidNumber { .. } => ParseErrorKind::InvalidLiteral,
            _ => ParseErrorKind::InvalidSyntax,
        };
        ParseError::new(kind, error.span(), error.to_string())
    }
}

/// All errors collected while parsing one file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<Vec<ParseError>> for ParseErrors {
    fn from(errors: Vec<ParseError>) -> Self {
        Self { errors }
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {error}", error.span)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Semantic Errors
// ============================================================================

/// Declaration-level semantic errors.
///
/// Raised while building a translation unit, and reused as the detail of a
/// failed template instantiation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemaError {
    #[error("unknown type name '{name}'")]
    UnknownType { name: String, span: Span },

    #[error("'{name}' does not name a type")]
    NotAType { name: String, span: Span },

    #[error("'{name}' does not refer to a value")]
    NotAValue { name: String, span: Span },

    #[error("redefinition of '{name}'")]
    Redefinition { name: String, span: Span },

    #[error("'{name}' is not a class template")]
    NotATemplate { name: String, span: Span },

    #[error("use of class template '{name}' requires template arguments")]
    MissingTemplateArguments { name: String, span: Span },

    #[error("wrong number of template arguments for '{template}' (expected {expected}, got {got})")]
    TemplateArity {
        template: String,
        expected: String,
        got: usize,
        span: Span,
    },

    #[error("template argument for {param} must be {expected}")]
    TemplateArgumentKind {
        param: String,
        expected: String,
        span: Span,
    },

    #[error("non-type template argument evaluates to {value}, which cannot be narrowed to type '{ty}'")]
    Narrowing { value: i128, ty: String, span: Span },

    #[error("{context} has incomplete type '{ty}'")]
    IncompleteType {
        context: String,
        ty: String,
        span: Span,
    },

    #[error("array size must be positive, got {value}")]
    InvalidArrayBound { value: i128, span: Span },

    #[error("static assertion failed{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    StaticAssertFailed { message: Option<String>, span: Span },

    #[error("constant expression error: {detail}")]
    ConstEval { detail: String, span: Span },

    #[error("recursive template instantiation exceeded maximum depth of {limit}")]
    DepthExceeded { limit: usize, span: Span },

    #[error("implicit instantiation of undefined template '{name}'")]
    UndefinedTemplate { name: String, span: Span },

    #[error("in instantiation of '{instance}': {source}")]
    InInstantiation {
        instance: String,
        #[source]
        source: Box<SemaError>,
        span: Span,
    },

    #[error("invalid template parameter: {detail}")]
    InvalidTemplateParameter { detail: String, span: Span },

    #[error("{what} are not supported")]
    Unsupported { what: String, span: Span },
}

impl SemaError {
    pub fn span(&self) -> Span {
        match self {
            SemaError::UnknownType { span, .. }
            | SemaError::NotAType { span, .. }
            | SemaError::NotAValue { span, .. }
            | SemaError::Redefinition { span, .. }
            | SemaError::NotATemplate { span, .. }
            | SemaError::MissingTemplateArguments { span, .. }
            | SemaError::TemplateArity { span, .. }
            | SemaError::TemplateArgumentKind { span, .. }
            | SemaError::Narrowing { span, .. }
            | SemaError::IncompleteType { span, .. }
            | SemaError::InvalidArrayBound { span, .. }
            | SemaError::StaticAssertFailed { span, .. }
            | SemaError::ConstEval { span, .. }
            | SemaError::DepthExceeded { span, .. }
            | SemaError::UndefinedTemplate { span, .. }
            | SemaError::InInstantiation { span, .. }
            | SemaError::InvalidTemplateParameter { span, .. }
            | SemaError::Unsupported { span, .. } => *span,
        }
    }

    /// The innermost error of an instantiation backtrace.
    pub fn root_cause(&self) -> &SemaError {
        match self {
            SemaError::InInstantiation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// All semantic errors collected while building one translation unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SemaErrors {
    errors: Vec<SemaError>,
}

impl SemaErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: SemaError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SemaError> {
        self.errors.iter()
    }
}

impl From<SemaError> for SemaErrors {
    fn from(error: SemaError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl std::fmt::Display for SemaErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {error}", error.span())?;
        }
        Ok(())
    }
}

impl std::error::Error for SemaErrors {}

// ============================================================================
// Front-end Errors
// ============================================================================

/// Errors opening a translation unit.
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: {} parse error(s)", errors.len())]
    Parse { file: String, errors: ParseErrors },

    #[error("{file}: {} semantic error(s)", errors.len())]
    Sema { file: String, errors: SemaErrors },
}

impl FrontendError {
    /// One `file:line:column: error: message` line per underlying error.
    pub fn diagnostics(&self) -> Vec<String> {
        match self {
            FrontendError::Io { .. } => vec![format!("error: {self}")],
            FrontendError::Parse { file, errors } => errors
                .iter()
                .map(|e| format!("{}: error: {}", source_location(file, e.span), e))
                .collect(),
            FrontendError::Sema { file, errors } => errors
                .iter()
                .map(|e| format!("{}: error: {}", source_location(file, e.span()), e))
                .collect(),
        }
    }
}

// ============================================================================
// Pipeline Errors
// ============================================================================

/// Errors of the specialization pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InteropError {
    /// The requested symbol does not exist.
    #[error("no declaration named `{name}`")]
    NotFound { name: String },

    /// The requested symbol exists but is not a class template.
    #[error("`{name}` is not a template class, can't specialize")]
    NotATemplate { name: String },

    /// The argument count differs from the template's parameter count.
    #[error("requested {got} template arguments but declaration `{name}` has {expected}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// A type-argument token did not resolve to a type.
    #[error("invalid template specialization type `{token}`")]
    UnknownType { token: String },

    /// Full elaboration of the template body failed for these arguments.
    #[error("cannot instantiate `{template}`: {detail}")]
    Instantiation { template: String, detail: String },

    /// Layout was requested for a type that is not complete.
    #[error("`{name}` is an incomplete type")]
    IncompleteType { name: String },

    /// Lowering the unit to IR failed.
    #[error("cannot emit module: {diagnostic}")]
    Emit { diagnostic: String },
}
