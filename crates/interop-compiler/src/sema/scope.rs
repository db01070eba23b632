//! Name lookup during semantic analysis.
//!
//! Lookup order for an unqualified name: template parameters, member
//! aliases declared so far (latest first), the injected name of the
//! enclosing record, then the enclosing namespaces from innermost to the
//! global one, then the target's builtin typedefs. Qualified names skip the
//! local scope; absolute (`::ns::Foo`) names only look at the global scope.

use interop_core::{BuiltinKind, Decl, DeclId, PatternType, SemaError, TemplateParamKind};
use interop_parser::ast::PathExpr;

use super::Sema;

/// Names local to a record or template definition.
#[derive(Debug, Clone, Default)]
pub(crate) struct LocalScope {
    params: Vec<(Option<String>, TemplateParamKind)>,
    /// The record's own name, its type, and the template it instantiates.
    injected: Option<(String, PatternType, Option<DeclId>)>,
    aliases: Vec<(String, PatternType)>,
}

impl LocalScope {
    pub(crate) fn push_param(&mut self, name: Option<String>, kind: TemplateParamKind) {
        self.params.push((name, kind));
    }

    pub(crate) fn inject(&mut self, name: impl Into<String>, ty: PatternType, template: Option<DeclId>) {
        self.injected = Some((name.into(), ty, template));
    }

    pub(crate) fn push_alias(&mut self, name: impl Into<String>, ty: PatternType) {
        self.aliases.push((name.into(), ty));
    }

    pub(crate) fn param_count(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn param(&self, name: &str) -> Option<(usize, TemplateParamKind)> {
        self.params
            .iter()
            .position(|(param, _)| param.as_deref() == Some(name))
            .map(|index| (index, self.params[index].1))
    }
}

/// What a name refers to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolved {
    Type(PatternType),
    /// A class template, named with or without its own arguments.
    Template(DeclId),
    TypeParam(usize),
    ValueParam(usize, BuiltinKind),
}

impl Sema {
    /// Resolve `path` (ignoring any template arguments it carries).
    ///
    /// `with_args` tells whether the use supplies template arguments: the
    /// injected name of a class template means the template itself then,
    /// and the current instance otherwise.
    pub(crate) fn lookup_path(
        &self,
        scope: &LocalScope,
        path: &PathExpr<'_>,
        with_args: bool,
    ) -> Result<Resolved, SemaError> {
        let name = path.name.name;
        let local = !path.absolute && path.scope.is_empty();

        if local {
            if let Some((index, kind)) = scope.param(name) {
                return Ok(match kind {
                    TemplateParamKind::Type => Resolved::TypeParam(index),
                    TemplateParamKind::Integral(kind) => Resolved::ValueParam(index, kind),
                });
            }
            if let Some((_, ty)) = scope.aliases.iter().rev().find(|(alias, _)| alias == name) {
                return Ok(Resolved::Type(ty.clone()));
            }
            if let Some((injected, ty, template)) = &scope.injected {
                if injected == name {
                    return Ok(match template {
                        Some(template) if with_args => Resolved::Template(*template),
                        _ => Resolved::Type(ty.clone()),
                    });
                }
            }
        }

        let mut suffix = String::new();
        for segment in path.scope {
            suffix.push_str(segment.name);
            suffix.push_str("::");
        }
        suffix.push_str(name);

        let depth = if path.absolute { 0 } else { self.namespaces.len() };
        for level in (0..=depth).rev() {
            let mut candidate = String::new();
            for namespace in &self.namespaces[..level] {
                candidate.push_str(namespace);
                candidate.push_str("::");
            }
            candidate.push_str(&suffix);
            if let Some(id) = self.unit.lookup(&candidate) {
                return self.decl_resolution(id, path);
            }
        }

        if local {
            if let Some(kind) = self.unit.target().builtin_typedef(name) {
                return Ok(Resolved::Type(PatternType::Builtin(kind)));
            }
        }

        Err(SemaError::UnknownType {
            name: path.qualified_name(),
            span: path.span,
        })
    }

    fn decl_resolution(&self, id: DeclId, path: &PathExpr<'_>) -> Result<Resolved, SemaError> {
        match self.unit.decl(id) {
            Some(Decl::Record(_)) => Ok(Resolved::Type(PatternType::Decl(id))),
            Some(Decl::ClassTemplate(_)) => Ok(Resolved::Template(id)),
            Some(Decl::Alias(alias)) => Ok(Resolved::Type(PatternType::from(&alias.target))),
            Some(Decl::Function(_)) | None => Err(SemaError::NotAType {
                name: path.qualified_name(),
                span: path.span,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_lookup_by_name() {
        let mut scope = LocalScope::default();
        scope.push_param(Some("T".into()), TemplateParamKind::Type);
        scope.push_param(None, TemplateParamKind::Type);
        scope.push_param(Some("N".into()), TemplateParamKind::Integral(BuiltinKind::Int));
        assert_eq!(scope.param("T"), Some((0, TemplateParamKind::Type)));
        assert_eq!(scope.param("N"), Some((2, TemplateParamKind::Integral(BuiltinKind::Int))));
        assert_eq!(scope.param("U"), None);
        assert_eq!(scope.param_count(), 3);
    }
}
