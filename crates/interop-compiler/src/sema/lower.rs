//! Lowering of type and expression syntax to patterns.
//!
//! Lowering resolves names but never substitutes or instantiates; the same
//! [`PatternType`] serves template definitions (mentioning parameters) and
//! concrete code (no parameters).

use interop_core::{
    BuiltinKind, ClassTemplateEntry, DeclId, FieldPattern, MethodKind, MethodPattern, PatternArg, PatternExpr,
    PatternType, RecordPattern, RecordTag, SemaError, StaticAssertPattern, TemplateParamKind,
};
use interop_parser::ast::{Expr, Member, MethodDecl, PathExpr, TemplateArgExpr, TypeExpr};

use super::Sema;
use super::scope::{LocalScope, Resolved};
use crate::template::Instantiator;

impl Sema {
    pub(crate) fn lower_type(&self, scope: &LocalScope, ty: &TypeExpr<'_>) -> Result<PatternType, SemaError> {
        match ty {
            TypeExpr::Builtin { kind, .. } => Ok(PatternType::Builtin(*kind)),
            TypeExpr::Named(path) => self.lower_path_type(scope, path),
            TypeExpr::Pointer { pointee, span } => match self.lower_type(scope, pointee)? {
                PatternType::Reference(_) => Err(SemaError::Unsupported {
                    what: "pointers to references".to_string(),
                    span: *span,
                }),
                pointee => Ok(PatternType::Pointer(Box::new(pointee))),
            },
            TypeExpr::Reference { referent, span } => match self.lower_type(scope, referent)? {
                PatternType::Reference(_) => Err(SemaError::Unsupported {
                    what: "references to references".to_string(),
                    span: *span,
                }),
                referent => Ok(PatternType::Reference(Box::new(referent))),
            },
            TypeExpr::Array { element, len, .. } => {
                let element = self.lower_type(scope, element)?;
                let len = self.lower_expr(scope, len)?;
                Ok(PatternType::Array(Box::new(element), len))
            }
            TypeExpr::Const { inner, .. } => Ok(PatternType::Const(Box::new(self.lower_type(scope, inner)?))),
        }
    }

    fn lower_path_type(&self, scope: &LocalScope, path: &PathExpr<'_>) -> Result<PatternType, SemaError> {
        let not_a_template = || SemaError::NotATemplate {
            name: path.qualified_name(),
            span: path.span,
        };
        match (self.lookup_path(scope, path, path.args.is_some())?, path.args) {
            (Resolved::TypeParam(index), None) => Ok(PatternType::Param(index)),
            (Resolved::Type(ty), None) => Ok(ty),
            (Resolved::TypeParam(_) | Resolved::Type(_), Some(_)) => Err(not_a_template()),
            (Resolved::ValueParam(..), _) => Err(SemaError::NotAType {
                name: path.qualified_name(),
                span: path.span,
            }),
            (Resolved::Template(_), None) => Err(SemaError::MissingTemplateArguments {
                name: path.qualified_name(),
                span: path.span,
            }),
            (Resolved::Template(template), Some(args)) => {
                let Some(entry) = self.unit.class_template(template) else {
                    return Err(not_a_template());
                };
                Instantiator::check_arity(entry, args.len(), path.span)?;
                let args = entry
                    .params
                    .iter()
                    .zip(args)
                    .map(|(param, arg)| self.lower_template_arg(scope, param.kind, arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PatternType::Specialization { template, args })
            }
        }
    }

    /// Lower one template argument for a parameter of kind `kind`.
    pub(crate) fn lower_template_arg(
        &self,
        scope: &LocalScope,
        kind: TemplateParamKind,
        arg: &TemplateArgExpr<'_>,
    ) -> Result<PatternArg, SemaError> {
        match (kind, arg) {
            (TemplateParamKind::Type, TemplateArgExpr::Type(ty)) => Ok(PatternArg::Type(self.lower_type(scope, ty)?)),
            (TemplateParamKind::Type, TemplateArgExpr::Ambiguous(path)) => {
                Ok(PatternArg::Type(self.lower_path_type(scope, path)?))
            }
            (TemplateParamKind::Type, TemplateArgExpr::Expr(expr)) => Err(SemaError::TemplateArgumentKind {
                param: "a type template parameter".to_string(),
                expected: "a type".to_string(),
                span: expr.span(),
            }),
            (TemplateParamKind::Integral(_), TemplateArgExpr::Expr(expr)) => {
                Ok(PatternArg::Value(self.lower_expr(scope, expr)?))
            }
            (TemplateParamKind::Integral(_), TemplateArgExpr::Ambiguous(path)) => {
                if path.absolute || !path.scope.is_empty() || path.args.is_some() {
                    return Err(SemaError::NotAValue {
                        name: path.qualified_name(),
                        span: path.span,
                    });
                }
                Ok(PatternArg::Value(self.lower_expr(scope, &Expr::Name(path.name))?))
            }
            (TemplateParamKind::Integral(ty), TemplateArgExpr::Type(type_expr)) => {
                Err(SemaError::TemplateArgumentKind {
                    param: "a non-type template parameter".to_string(),
                    expected: format!("an integral constant of type '{}'", ty),
                    span: type_expr.span(),
                })
            }
        }
    }

    pub(crate) fn lower_expr(&self, scope: &LocalScope, expr: &Expr<'_>) -> Result<PatternExpr, SemaError> {
        match expr {
            Expr::Int { value, .. } => Ok(PatternExpr::Int(*value)),
            Expr::Bool { value, .. } => Ok(PatternExpr::Bool(*value)),
            Expr::Name(ident) => match scope.param(ident.name) {
                Some((index, TemplateParamKind::Integral(_))) => Ok(PatternExpr::Param(index)),
                _ => Err(SemaError::NotAValue {
                    name: ident.name.to_string(),
                    span: ident.span,
                }),
            },
            Expr::Unary { op, operand, .. } => {
                Ok(PatternExpr::Unary(*op, Box::new(self.lower_expr(scope, operand)?)))
            }
            Expr::Binary { op, lhs, rhs, .. } => Ok(PatternExpr::Binary(
                *op,
                Box::new(self.lower_expr(scope, lhs)?),
                Box::new(self.lower_expr(scope, rhs)?),
            )),
            Expr::SizeOf { ty, .. } => Ok(PatternExpr::SizeOf(Box::new(self.lower_type(scope, ty)?))),
            Expr::AlignOf { ty, .. } => Ok(PatternExpr::AlignOf(Box::new(self.lower_type(scope, ty)?))),
        }
    }

    // ==========================================================================
    // Members
    // ==========================================================================

    /// Lower a record body. Member aliases extend `scope` as they are met.
    ///
    /// Every member is lowered even after an error; `None` means at least
    /// one error was reported.
    pub(crate) fn lower_members(
        &mut self,
        scope: &mut LocalScope,
        tag: RecordTag,
        members: &[Member<'_>],
    ) -> Option<RecordPattern> {
        let mut pattern = RecordPattern::default();
        let mut ok = true;
        for member in members {
            let lowered = match member {
                Member::Field(field) => self.lower_type(scope, &field.ty).map(|ty| {
                    pattern.fields.push(FieldPattern {
                        name: field.name.name.to_string(),
                        ty,
                        is_static: field.is_static,
                        span: field.span,
                    });
                }),
                Member::Method(method) => self.lower_method(scope, tag, method).map(|m| pattern.methods.push(m)),
                Member::StaticAssert(assertion) => self.lower_expr(scope, &assertion.condition).map(|condition| {
                    pattern.static_asserts.push(StaticAssertPattern {
                        condition,
                        message: assertion.message.map(str::to_string),
                        span: assertion.span,
                    });
                }),
                Member::Alias(alias) => self
                    .lower_type(scope, &alias.target)
                    .map(|ty| scope.push_alias(alias.name.name, ty)),
            };
            if let Err(err) = lowered {
                self.errors.push(err);
                ok = false;
            }
        }
        ok.then_some(pattern)
    }

    fn lower_method(
        &self,
        scope: &LocalScope,
        tag: RecordTag,
        method: &MethodDecl<'_>,
    ) -> Result<MethodPattern, SemaError> {
        if method.is_virtual && tag == RecordTag::Union {
            return Err(SemaError::Unsupported {
                what: "virtual functions in unions".to_string(),
                span: method.span,
            });
        }
        let return_type = match (&method.return_type, method.kind) {
            (Some(ty), MethodKind::Method) => self.lower_type(scope, ty)?,
            _ => PatternType::Builtin(BuiltinKind::Void),
        };
        let params = method
            .params
            .iter()
            .map(|param| self.lower_type(scope, &param.ty))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MethodPattern {
            name: method.name.name.to_string(),
            kind: method.kind,
            return_type,
            params,
            is_const: method.is_const,
            is_virtual: method.is_virtual,
            is_static: method.is_static,
            has_body: method.has_body,
            span: method.span,
        })
    }
}

/// The injected class name of a template: the template applied to its own
/// parameters.
pub(crate) fn injected_specialization(template: DeclId, entry: &ClassTemplateEntry) -> PatternType {
    let args = entry
        .params
        .iter()
        .enumerate()
        .map(|(index, param)| match param.kind {
            TemplateParamKind::Type => PatternArg::Type(PatternType::Param(index)),
            TemplateParamKind::Integral(_) => PatternArg::Value(PatternExpr::Param(index)),
        })
        .collect();
    PatternType::Specialization { template, args }
}
