//! Abstract syntax tree for the declaration-level guest subset.
//!
//! All nodes live in a [`bumpalo::Bump`] arena owned by the caller and are
//! `Copy`; child lists are arena slices.

mod decl;
mod decl_parser;
mod expr;
mod expr_parser;
mod parser;
mod type_parser;
mod types;

pub use decl::{
    AliasDecl, FieldDecl, FunctionDecl, Item, Member, MethodDecl, NamespaceDecl, ParamDecl,
    RecordDecl, StaticAssertDecl, TemplateDecl, TemplateParamDecl, TemplateParamKindExpr,
};
pub use expr::Expr;
pub use parser::Parser;
pub use types::{Ident, PathExpr, TemplateArgExpr, TypeExpr};

use interop_core::Span;

/// A parsed source file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationUnitAst<'ast> {
    items: &'ast [Item<'ast>],
    span: Span,
}

impl<'ast> TranslationUnitAst<'ast> {
    pub(crate) fn new(items: &'ast [Item<'ast>], span: Span) -> Self {
        Self { items, span }
    }

    /// Top-level declarations in source order.
    pub fn items(&self) -> &'ast [Item<'ast>] {
        self.items
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn empty_source() {
        let arena = Bump::new();
        let unit = Parser::parse("  // nothing here\n", &arena).map_err(|e| e.to_string());
        assert_eq!(unit.map(|u| u.items().len()), Ok(0));
    }

    #[test]
    fn items_keep_source_order() {
        let arena = Bump::new();
        let unit = Parser::parse("struct A; struct B {}; int f();", &arena).map_err(|e| e.to_string());
        let names: Vec<_> = unit
            .map(|u| {
                u.items()
                    .iter()
                    .map(|item| match item {
                        Item::Record(record) => record.name.name,
                        Item::Function(function) => function.name.name,
                        _ => "?",
                    })
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(names, vec!["A", "B", "f"]);
    }
}
