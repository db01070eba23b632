//! Substitution of canonical arguments into template patterns.

use interop_core::{
    BinaryOp, BuiltinKind, CanonicalArg, DeclId, PatternArg, PatternExpr, PatternType, SemaError, Span, Ty,
};

use crate::layout::ty_layout;

use super::const_eval;
use super::instantiation::Instantiator;

/// How complete a substituted type has to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Require {
    /// Naming the type is enough (pointees, parameters, return types).
    Declared,
    /// The type must have a layout (by-value fields, array elements).
    Complete,
}

impl Instantiator<'_> {
    /// Substitute `args` into `pattern`.
    ///
    /// Specializations met on the way are declared; they are instantiated
    /// only when `require` asks for a complete type. `what` describes the
    /// use for incomplete-type diagnostics.
    pub fn substitute_type(
        &mut self,
        pattern: &PatternType,
        args: &[CanonicalArg],
        require: Require,
        what: &str,
        span: Span,
    ) -> Result<Ty, SemaError> {
        let ty = match pattern {
            PatternType::Param(index) => match args.get(*index) {
                Some(CanonicalArg::Type(ty)) => {
                    let ty = ty.clone();
                    if require == Require::Complete {
                        self.require_complete(&ty, what, span)?;
                    }
                    ty
                }
                _ => {
                    return Err(SemaError::NotAType {
                        name: format!("template parameter #{}", index),
                        span,
                    });
                }
            },
            PatternType::Builtin(kind) => {
                if *kind == BuiltinKind::Void && require == Require::Complete {
                    return Err(SemaError::IncompleteType {
                        context: what.to_string(),
                        ty: "void".to_string(),
                        span,
                    });
                }
                Ty::Builtin(*kind)
            }
            PatternType::Decl(id) => {
                let ty = Ty::Record(*id);
                if require == Require::Complete {
                    self.require_complete(&ty, what, span)?;
                }
                ty
            }
            PatternType::Specialization {
                template,
                args: pattern_args,
            } => {
                let converted = self.specialization_args(*template, pattern_args, args, span)?;
                let id = self.declare_instance(*template, converted, span)?;
                if require == Require::Complete {
                    self.complete_instance(id, what, span)?;
                }
                Ty::Record(id)
            }
            PatternType::Pointer(inner) => {
                Ty::pointer(self.substitute_type(inner, args, Require::Declared, what, span)?)
            }
            PatternType::Reference(inner) => {
                Ty::reference(self.substitute_type(inner, args, Require::Declared, what, span)?)
            }
            PatternType::Array(element, bound) => {
                let element = self.substitute_type(element, args, Require::Complete, what, span)?;
                let value = self.evaluate(bound, args, span)?;
                let len = u64::try_from(value)
                    .ok()
                    .filter(|len| *len > 0)
                    .ok_or(SemaError::InvalidArrayBound { value, span })?;
                Ty::array(element, len)
            }
            PatternType::Const(inner) => Ty::constant(self.substitute_type(inner, args, require, what, span)?),
        };
        tracing::trace!(ty = %ty.display(&*self.unit), "substituted");
        Ok(ty)
    }

    /// Make sure `ty` has a layout, instantiating a declared specialization
    /// when needed.
    pub(crate) fn require_complete(&mut self, ty: &Ty, what: &str, span: Span) -> Result<(), SemaError> {
        match ty.unqualified() {
            Ty::Builtin(BuiltinKind::Void) => Err(SemaError::IncompleteType {
                context: what.to_string(),
                ty: "void".to_string(),
                span,
            }),
            Ty::Record(id) => {
                let Some(record) = self.unit.decls().record(*id) else {
                    return Err(SemaError::NotAType {
                        name: id.to_string(),
                        span,
                    });
                };
                if record.is_complete() {
                    Ok(())
                } else if record.is_specialization() {
                    self.complete_instance(*id, what, span)
                } else {
                    Err(SemaError::IncompleteType {
                        context: what.to_string(),
                        ty: record.name.to_string(),
                        span,
                    })
                }
            }
            Ty::Array(element, _) => self.require_complete(element, what, span),
            _ => Ok(()),
        }
    }

    /// Substitute and convert the arguments of a specialization named inside
    /// a pattern, filling omitted trailing arguments from the template's
    /// defaults.
    fn specialization_args(
        &mut self,
        template: DeclId,
        pattern_args: &[PatternArg],
        outer: &[CanonicalArg],
        span: Span,
    ) -> Result<Vec<CanonicalArg>, SemaError> {
        let entry = self.template_entry(template, span)?;
        Self::check_arity(&entry, pattern_args.len(), span)?;

        let mut converted: Vec<CanonicalArg> = Vec::with_capacity(entry.arity());
        for (index, param) in entry.params.iter().enumerate() {
            let arg = match (pattern_args.get(index), &param.default) {
                (Some(arg), _) => self.substitute_arg(arg, outer, span)?,
                // Defaults see the template's own earlier arguments.
                (None, Some(default)) => {
                    let earlier = converted.clone();
                    self.substitute_arg(default, &earlier, span)?
                }
                (None, None) => {
                    return Err(SemaError::TemplateArity {
                        template: entry.name.to_string(),
                        expected: format!("at least {}", index + 1),
                        got: pattern_args.len(),
                        span,
                    });
                }
            };
            converted.push(self.convert_arg(param, index, arg, span)?);
        }
        Ok(converted)
    }

    fn substitute_arg(&mut self, arg: &PatternArg, args: &[CanonicalArg], span: Span) -> Result<CanonicalArg, SemaError> {
        match arg {
            PatternArg::Type(ty) => Ok(CanonicalArg::Type(self.substitute_type(
                ty,
                args,
                Require::Declared,
                "template argument",
                span,
            )?)),
            PatternArg::Value(expr) => Ok(CanonicalArg::Value {
                value: self.evaluate(expr, args, span)?,
                ty: BuiltinKind::Int,
            }),
        }
    }

    // ==========================================================================
    // Constant expressions
    // ==========================================================================

    /// Evaluate an integral constant expression under `args`.
    pub fn evaluate(&mut self, expr: &PatternExpr, args: &[CanonicalArg], span: Span) -> Result<i128, SemaError> {
        let const_err = |detail| SemaError::ConstEval { detail, span };
        match expr {
            PatternExpr::Int(value) => Ok(*value),
            PatternExpr::Bool(value) => Ok(i128::from(*value)),
            PatternExpr::Param(index) => match args.get(*index) {
                Some(CanonicalArg::Value { value, .. }) => Ok(*value),
                _ => Err(SemaError::NotAValue {
                    name: format!("template parameter #{}", index),
                    span,
                }),
            },
            PatternExpr::Unary(op, operand) => {
                let value = self.evaluate(operand, args, span)?;
                const_eval::unary(*op, value).map_err(const_err)
            }
            PatternExpr::Binary(BinaryOp::And, lhs, rhs) => {
                if self.evaluate(lhs, args, span)? == 0 {
                    return Ok(0);
                }
                Ok(i128::from(self.evaluate(rhs, args, span)? != 0))
            }
            PatternExpr::Binary(BinaryOp::Or, lhs, rhs) => {
                if self.evaluate(lhs, args, span)? != 0 {
                    return Ok(1);
                }
                Ok(i128::from(self.evaluate(rhs, args, span)? != 0))
            }
            PatternExpr::Binary(op, lhs, rhs) => {
                let lhs = self.evaluate(lhs, args, span)?;
                let rhs = self.evaluate(rhs, args, span)?;
                const_eval::binary(*op, lhs, rhs).map_err(const_err)
            }
            PatternExpr::SizeOf(ty) => Ok(i128::from(self.operand_layout(ty, args, "sizeof operand", span)?.size)),
            PatternExpr::AlignOf(ty) => {
                Ok(i128::from(self.operand_layout(ty, args, "alignof operand", span)?.align))
            }
        }
    }

    fn operand_layout(
        &mut self,
        pattern: &PatternType,
        args: &[CanonicalArg],
        what: &str,
        span: Span,
    ) -> Result<interop_core::Layout, SemaError> {
        let ty = self.substitute_type(pattern, args, Require::Complete, what, span)?;
        ty_layout(self.unit, &ty).ok_or_else(|| SemaError::IncompleteType {
            context: what.to_string(),
            ty: ty.display(&*self.unit),
            span,
        })
    }
}
