//! Type expression AST nodes.
//!
//! Type expressions are syntax only: names are not yet resolved, so
//! `Named` covers records, aliases, template parameters and templates alike.

use interop_core::{BuiltinKind, Span};

use super::expr::Expr;

/// An identifier with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    #[inline]
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A possibly qualified name with optional template arguments:
/// `::ns::Foo<int, 4>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathExpr<'ast> {
    /// Leading `::`.
    pub absolute: bool,
    /// Namespace qualifiers, outermost first.
    pub scope: &'ast [Ident<'ast>],
    pub name: Ident<'ast>,
    /// `None` when no `<...>` follows the name; `Some(&[])` for `Foo<>`.
    pub args: Option<&'ast [TemplateArgExpr<'ast>]>,
    pub span: Span,
}

impl PathExpr<'_> {
    /// `ns::Foo`, without template arguments.
    pub fn qualified_name(&self) -> String {
        let mut out = String::new();
        if self.absolute {
            out.push_str("::");
        }
        for segment in self.scope {
            out.push_str(segment.name);
            out.push_str("::");
        }
        out.push_str(self.name.name);
        out
    }
}

/// A type expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExpr<'ast> {
    Builtin { kind: BuiltinKind, span: Span },
    Named(PathExpr<'ast>),
    Pointer { pointee: &'ast TypeExpr<'ast>, span: Span },
    Reference { referent: &'ast TypeExpr<'ast>, span: Span },
    Array { element: &'ast TypeExpr<'ast>, len: &'ast Expr<'ast>, span: Span },
    Const { inner: &'ast TypeExpr<'ast>, span: Span },
}

impl TypeExpr<'_> {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Builtin { span, .. }
            | TypeExpr::Pointer { span, .. }
            | TypeExpr::Reference { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::Const { span, .. } => *span,
            TypeExpr::Named(path) => path.span,
        }
    }
}

/// One argument of a template argument list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateArgExpr<'ast> {
    /// Syntactically a type (`int`, `T*`, `Foo<int>`).
    Type(TypeExpr<'ast>),
    /// Syntactically an expression (`4`, `N + 1`, `sizeof(T)`).
    Expr(Expr<'ast>),
    /// A bare name that may be either; semantic analysis decides.
    Ambiguous(PathExpr<'ast>),
}

impl TemplateArgExpr<'_> {
    pub fn span(&self) -> Span {
        match self {
            TemplateArgExpr::Type(ty) => ty.span(),
            TemplateArgExpr::Expr(expr) => expr.span(),
            TemplateArgExpr::Ambiguous(path) => path.span,
        }
    }
}
