//! Semantic analysis: builds a [`TranslationUnit`] from a parsed file.
//!
//! Every declaration is registered in source order. Names are resolved as
//! they are met, so a type must be declared before use. Non-template
//! records are laid out as soon as their definition ends; class templates
//! keep their lowered pattern for later instantiation. Specializations
//! named by non-template code are instantiated on the spot (or merely
//! declared, behind a pointer or reference).
//!
//! Errors do not stop the walk: each failing declaration is reported and
//! skipped, and the unit is only returned when no error was found.

mod lower;
mod scope;

use interop_core::{
    AliasEntry, ClassTemplateEntry, Decl, DeclId, FunctionEntry, PatternExpr, PatternType, QualifiedName, RecordEntry,
    SemaError, SemaErrors, Span, TargetInfo, TemplateParamEntry, TemplateParamKind, Ty, TypeHash,
};
use interop_parser::TranslationUnitAst;
use interop_parser::ast::{
    AliasDecl, FunctionDecl, Item, RecordDecl, StaticAssertDecl, TemplateDecl, TemplateParamDecl,
    TemplateParamKindExpr, TypeExpr,
};
use interop_registry::TranslationUnit;

use crate::template::{Instantiator, Require};

use self::lower::injected_specialization;
use self::scope::LocalScope;

/// Analyze a parsed file into a translation unit for `target`.
///
/// `max_depth` bounds instantiations triggered by the file itself.
pub fn analyze(
    file: &str,
    ast: &TranslationUnitAst<'_>,
    target: TargetInfo,
    max_depth: usize,
) -> Result<TranslationUnit, SemaErrors> {
    let _span = tracing::debug_span!("analyze", file).entered();
    let mut sema = Sema {
        unit: TranslationUnit::new(file, target),
        max_depth,
        namespaces: Vec::new(),
        errors: SemaErrors::new(),
    };
    sema.items(ast.items());

    if sema.errors.is_empty() {
        tracing::debug!(decls = sema.unit.decl_count(), "translation unit ready");
        Ok(sema.unit)
    } else {
        tracing::debug!(errors = sema.errors.len(), "semantic analysis failed");
        Err(sema.errors)
    }
}

pub(crate) struct Sema {
    unit: TranslationUnit,
    max_depth: usize,
    /// Enclosing namespaces, outermost first.
    namespaces: Vec<String>,
    errors: SemaErrors,
}

impl Sema {
    fn items(&mut self, items: &[Item<'_>]) {
        for item in items {
            if let Err(err) = self.item(item) {
                self.errors.push(err);
            }
        }
    }

    fn item(&mut self, item: &Item<'_>) -> Result<(), SemaError> {
        match item {
            Item::Namespace(namespace) => {
                self.namespaces.push(namespace.name.name.to_string());
                self.items(namespace.items);
                self.namespaces.pop();
                Ok(())
            }
            Item::Record(record) => self.record(record),
            Item::Template(template) => self.template(template),
            Item::Alias(alias) => self.alias(alias),
            Item::Function(function) => self.function(function),
            Item::StaticAssert(assertion) => {
                let condition = self.lower_expr(&LocalScope::default(), &assertion.condition)?;
                self.check_static_assert(&condition, assertion)
            }
        }
    }

    fn qualify(&self, name: &str) -> QualifiedName {
        QualifiedName::new(self.namespaces.clone(), name)
    }

    fn instantiator(&mut self) -> Instantiator<'_> {
        Instantiator::new(&mut self.unit, self.max_depth)
    }

    /// Resolve a type written outside any template.
    fn concrete(&mut self, ty: &TypeExpr<'_>, require: Require, what: &str) -> Result<Ty, SemaError> {
        let pattern = self.lower_type(&LocalScope::default(), ty)?;
        self.instantiator().substitute_type(&pattern, &[], require, what, ty.span())
    }

    fn check_static_assert(&mut self, condition: &PatternExpr, assertion: &StaticAssertDecl<'_>) -> Result<(), SemaError> {
        if self.instantiator().evaluate(condition, &[], assertion.span)? == 0 {
            return Err(SemaError::StaticAssertFailed {
                message: assertion.message.map(str::to_string),
                span: assertion.span,
            });
        }
        Ok(())
    }

    // ==========================================================================
    // Records
    // ==========================================================================

    fn record(&mut self, decl: &RecordDecl<'_>) -> Result<(), SemaError> {
        let name = self.qualify(decl.name.name);
        let key = name.to_string();
        let redefinition = || SemaError::Redefinition {
            name: key.clone(),
            span: decl.name.span,
        };

        let id = match self.unit.lookup(&key) {
            Some(id) => match self.unit.decl(id) {
                Some(Decl::Record(existing)) if !existing.is_specialization() => {
                    if decl.members.is_some() && existing.is_complete() {
                        return Err(redefinition());
                    }
                    id
                }
                _ => return Err(redefinition()),
            },
            None => self
                .unit
                .decls_mut()
                .insert(Decl::Record(RecordEntry::new(name, decl.tag, decl.span)), TypeHash::from_name(&key))?,
        };
        let Some(members) = decl.members else {
            return Ok(());
        };

        let mut scope = LocalScope::default();
        scope.inject(decl.name.name, PatternType::Decl(id), None);
        let Some(pattern) = self.lower_members(&mut scope, decl.tag, members) else {
            return Ok(());
        };
        if let Some(record) = self.unit.decls_mut().get_mut(id).and_then(Decl::as_record_mut) {
            record.tag = decl.tag;
            record.span = decl.span;
        }
        self.instantiator().build_members(id, decl.tag, &pattern, &[], decl.span)?;
        tracing::trace!(record = %key, "record defined");
        Ok(())
    }

    // ==========================================================================
    // Templates
    // ==========================================================================

    fn template(&mut self, decl: &TemplateDecl<'_>) -> Result<(), SemaError> {
        let record = &decl.record;
        let mut scope = LocalScope::default();
        let params = self.template_params(&mut scope, decl.params)?;

        let name = self.qualify(record.name.name);
        let key = name.to_string();
        let id = match self.unit.lookup(&key) {
            Some(id) => {
                self.merge_template(id, &key, params, record.members.is_some(), record.name.span)?;
                id
            }
            None => self.unit.decls_mut().insert(
                Decl::ClassTemplate(ClassTemplateEntry::new(name, record.tag, params, record.span)),
                TypeHash::from_name(&key),
            )?,
        };
        let Some(members) = record.members else {
            return Ok(());
        };

        let Some(entry) = self.unit.class_template(id) else {
            return Err(SemaError::NotATemplate {
                name: key,
                span: record.name.span,
            });
        };
        scope.inject(record.name.name, injected_specialization(id, entry), Some(id));
        let Some(pattern) = self.lower_members(&mut scope, record.tag, members) else {
            return Ok(());
        };

        // Assertions that do not mention a parameter fire at definition time.
        for assertion in pattern.static_asserts.iter().filter(|a| !a.condition.is_dependent()) {
            if self.instantiator().evaluate(&assertion.condition, &[], assertion.span)? == 0 {
                return Err(SemaError::StaticAssertFailed {
                    message: assertion.message.clone(),
                    span: assertion.span,
                });
            }
        }

        if let Some(entry) = self.unit.decls_mut().get_mut(id).and_then(Decl::as_class_template_mut) {
            entry.tag = record.tag;
            entry.span = record.span;
            entry.pattern = Some(pattern);
        }
        tracing::debug!(template = %key, "class template defined");
        Ok(())
    }

    /// Fold a redeclaration of the template `id` into the existing entry.
    fn merge_template(
        &mut self,
        id: DeclId,
        key: &str,
        params: Vec<TemplateParamEntry>,
        defines: bool,
        span: Span,
    ) -> Result<(), SemaError> {
        let Some(existing) = self.unit.class_template(id) else {
            return Err(SemaError::Redefinition {
                name: key.to_string(),
                span,
            });
        };
        if defines && existing.is_defined() {
            return Err(SemaError::Redefinition {
                name: key.to_string(),
                span,
            });
        }
        let same_kinds = existing.arity() == params.len()
            && existing.params.iter().zip(&params).all(|(old, new)| old.kind == new.kind);
        if !same_kinds {
            return Err(SemaError::InvalidTemplateParameter {
                detail: format!("template parameter list of '{}' does not match its previous declaration", key),
                span,
            });
        }
        if let Some(param) = existing
            .params
            .iter()
            .zip(&params)
            .find_map(|(old, new)| (old.default.is_some() && new.default.is_some()).then_some(new))
        {
            return Err(SemaError::InvalidTemplateParameter {
                detail: format!("redefinition of default argument for '{}'", param.name.as_deref().unwrap_or("")),
                span: param.span,
            });
        }

        if let Some(entry) = self.unit.decls_mut().get_mut(id).and_then(Decl::as_class_template_mut) {
            for (old, new) in entry.params.iter_mut().zip(params) {
                if new.default.is_some() {
                    old.default = new.default;
                }
                if defines {
                    old.name = new.name;
                }
            }
        }
        Ok(())
    }

    /// Lower a template parameter list, registering each parameter in
    /// `scope` after its own default has been lowered.
    fn template_params(
        &self,
        scope: &mut LocalScope,
        params: &[TemplateParamDecl<'_>],
    ) -> Result<Vec<TemplateParamEntry>, SemaError> {
        let mut entries: Vec<TemplateParamEntry> = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            let name = param.name.map(|ident| ident.name.to_string());
            let display = name.clone().unwrap_or_else(|| format!("#{}", index));

            let kind = match &param.kind {
                TemplateParamKindExpr::Type => TemplateParamKind::Type,
                TemplateParamKindExpr::Value(ty) => match self.lower_type(scope, ty)? {
                    PatternType::Builtin(kind) if kind.is_integral() => TemplateParamKind::Integral(kind),
                    other if other.is_dependent() => {
                        return Err(SemaError::Unsupported {
                            what: "non-type template parameters of dependent type".to_string(),
                            span: param.span,
                        });
                    }
                    _ => {
                        return Err(SemaError::InvalidTemplateParameter {
                            detail: format!("non-type template parameter '{}' must have integral type", display),
                            span: param.span,
                        });
                    }
                },
            };

            if let Some(name) = &name {
                if scope.param(name).is_some() {
                    return Err(SemaError::Redefinition {
                        name: name.clone(),
                        span: param.span,
                    });
                }
            }

            let default = param
                .default
                .as_ref()
                .map(|arg| self.lower_template_arg(scope, kind, arg))
                .transpose()?;
            if default.is_none() && entries.iter().any(|e| e.default.is_some()) {
                return Err(SemaError::InvalidTemplateParameter {
                    detail: format!("template parameter '{}' is missing a default argument", display),
                    span: param.span,
                });
            }

            scope.push_param(name.clone(), kind);
            let mut entry = TemplateParamEntry::new(name, kind, param.span);
            if let Some(default) = default {
                entry = entry.with_default(default);
            }
            entries.push(entry);
        }
        debug_assert_eq!(scope.param_count(), entries.len());
        Ok(entries)
    }

    // ==========================================================================
    // Aliases and functions
    // ==========================================================================

    fn alias(&mut self, decl: &AliasDecl<'_>) -> Result<(), SemaError> {
        let target = self.concrete(&decl.target, Require::Declared, "alias target")?;
        let name = self.qualify(decl.name.name);
        let key = name.to_string();
        if let Some(id) = self.unit.lookup(&key) {
            // Redeclaring an alias to the same type is allowed.
            return match self.unit.decl(id) {
                Some(Decl::Alias(existing)) if existing.target == target => Ok(()),
                _ => Err(SemaError::Redefinition {
                    name: key,
                    span: decl.name.span,
                }),
            };
        }
        self.unit
            .decls_mut()
            .insert(Decl::Alias(AliasEntry::new(name, target, decl.span)), TypeHash::from_name(&key))?;
        Ok(())
    }

    fn function(&mut self, decl: &FunctionDecl<'_>) -> Result<(), SemaError> {
        let what = format!("function '{}'", decl.name.name);
        let return_type = self.concrete(&decl.return_type, Require::Declared, &what)?;
        let params = decl
            .params
            .iter()
            .map(|param| self.concrete(&param.ty, Require::Declared, &what))
            .collect::<Result<Vec<_>, _>>()?;

        let name = self.qualify(decl.name.name);
        let hash = TypeHash::from_name(&name.to_string());
        self.unit.decls_mut().insert(
            Decl::Function(FunctionEntry {
                name,
                return_type,
                params,
                has_body: decl.has_body,
                span: decl.span,
            }),
            hash,
        )?;
        Ok(())
    }
}
