//! Type alias entries (`using X = T;`, `typedef T X;`).

use crate::{QualifiedName, Span, Ty};

/// An alias, stored with its already-resolved target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub name: QualifiedName,
    pub target: Ty,
    pub span: Span,
}

impl AliasEntry {
    pub fn new(name: QualifiedName, target: Ty, span: Span) -> Self {
        Self { name, target, span }
    }
}
