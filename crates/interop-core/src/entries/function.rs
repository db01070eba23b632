//! Free function entries.

use crate::{QualifiedName, Span, Ty};

/// A non-template free function. Only the signature is analysed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEntry {
    pub name: QualifiedName,
    pub return_type: Ty,
    pub params: Vec<Ty>,
    /// Definitions must have complete parameter and return types when emitted.
    pub has_body: bool,
    pub span: Span,
}
