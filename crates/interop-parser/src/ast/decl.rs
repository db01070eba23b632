//! Declaration AST nodes.

use interop_core::{MethodKind, RecordTag, Span};

use super::expr::Expr;
use super::types::{Ident, TemplateArgExpr, TypeExpr};

/// A top-level or namespace-level declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'ast> {
    Namespace(NamespaceDecl<'ast>),
    Record(RecordDecl<'ast>),
    Template(TemplateDecl<'ast>),
    Alias(AliasDecl<'ast>),
    Function(FunctionDecl<'ast>),
    StaticAssert(StaticAssertDecl<'ast>),
}

impl Item<'_> {
    pub fn span(&self) -> Span {
        match self {
            Item::Namespace(decl) => decl.span,
            Item::Record(decl) => decl.span,
            Item::Template(decl) => decl.span,
            Item::Alias(decl) => decl.span,
            Item::Function(decl) => decl.span,
            Item::StaticAssert(decl) => decl.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamespaceDecl<'ast> {
    pub name: Ident<'ast>,
    pub items: &'ast [Item<'ast>],
    pub span: Span,
}

/// `struct Foo;` or `struct Foo { ... };`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordDecl<'ast> {
    pub tag: RecordTag,
    pub name: Ident<'ast>,
    /// `None` for a forward declaration.
    pub members: Option<&'ast [Member<'ast>]>,
    pub span: Span,
}

/// `template<...> struct Foo ...`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateDecl<'ast> {
    pub params: &'ast [TemplateParamDecl<'ast>],
    pub record: RecordDecl<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateParamKindExpr<'ast> {
    /// `class T` / `typename T`
    Type,
    /// `int N`; the type is resolved during semantic analysis.
    Value(TypeExpr<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateParamDecl<'ast> {
    pub kind: TemplateParamKindExpr<'ast>,
    pub name: Option<Ident<'ast>>,
    pub default: Option<TemplateArgExpr<'ast>>,
    pub span: Span,
}

/// `using X = T;` or `typedef T X;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AliasDecl<'ast> {
    pub name: Ident<'ast>,
    pub target: TypeExpr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDecl<'ast> {
    pub ty: TypeExpr<'ast>,
    pub name: Option<Ident<'ast>>,
    pub span: Span,
}

/// A free function declaration or definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    pub name: Ident<'ast>,
    pub return_type: TypeExpr<'ast>,
    pub params: &'ast [ParamDecl<'ast>],
    pub has_body: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticAssertDecl<'ast> {
    pub condition: Expr<'ast>,
    pub message: Option<&'ast str>,
    pub span: Span,
}

/// A member of a record body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Member<'ast> {
    Field(FieldDecl<'ast>),
    Method(MethodDecl<'ast>),
    StaticAssert(StaticAssertDecl<'ast>),
    Alias(AliasDecl<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub is_static: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodDecl<'ast> {
    pub name: Ident<'ast>,
    pub kind: MethodKind,
    /// `None` for constructors and destructors.
    pub return_type: Option<TypeExpr<'ast>>,
    pub params: &'ast [ParamDecl<'ast>],
    pub is_const: bool,
    pub is_virtual: bool,
    pub is_static: bool,
    pub has_body: bool,
    pub span: Span,
}
