//! TemplateArgumentBuilder - turns host-supplied tokens into template
//! arguments.

use interop_core::{BuiltinKind, InteropError, TargetInfo, TemplateArgument, TypeHandle, TypeKind};
use interop_registry::TranslationUnit;

use crate::resolver;

/// Name resolution as seen by the argument builder.
pub trait TypeLookup {
    fn resolve(&self, name: &str) -> TypeHandle;

    /// Value range of an integral type; the default assumes the host model.
    fn integer_range(&self, kind: BuiltinKind) -> Option<(i128, i128)> {
        TargetInfo::default().integer_range(kind)
    }
}

impl TypeLookup for TranslationUnit {
    fn resolve(&self, name: &str) -> TypeHandle {
        resolver::resolve(self, name)
    }

    fn integer_range(&self, kind: BuiltinKind) -> Option<(i128, i128)> {
        self.target().integer_range(kind)
    }
}

/// Build arguments with `int` as the type of integer tokens.
pub fn build_template_arguments(
    lookup: &impl TypeLookup,
    target: &TypeHandle,
    tokens: &[&str],
) -> Result<Vec<TemplateArgument>, InteropError> {
    build_template_arguments_with(lookup, target, tokens, BuiltinKind::Int)
}

/// Build one argument per token, in order.
///
/// The template check and the arity check both happen before any token is
/// resolved. A non-empty all-digit token is a value of `default_integral`;
/// anything else must resolve to a type.
pub fn build_template_arguments_with(
    lookup: &impl TypeLookup,
    target: &TypeHandle,
    tokens: &[&str],
    default_integral: BuiltinKind,
) -> Result<Vec<TemplateArgument>, InteropError> {
    if !target.is_template() {
        return Err(InteropError::NotATemplate {
            name: target.name().to_string(),
        });
    }
    let expected = target.number_of_template_parameters();
    if tokens.len() != expected {
        return Err(InteropError::ArityMismatch {
            name: target.name().to_string(),
            expected,
            got: tokens.len(),
        });
    }

    tokens
        .iter()
        .map(|token| {
            let unknown = || InteropError::UnknownType {
                token: token.to_string(),
            };
            if is_integer_token(token) {
                let value: i128 = token.parse().map_err(|_| unknown())?;
                let (_, max) = lookup.integer_range(default_integral).ok_or_else(unknown)?;
                if value > max {
                    return Err(unknown());
                }
                return Ok(TemplateArgument::Value {
                    value,
                    ty: TypeHandle::builtin(default_integral),
                });
            }
            let handle = lookup.resolve(token);
            match handle.kind() {
                TypeKind::Unknown | TypeKind::ClassTemplate => Err(unknown()),
                _ => Ok(TemplateArgument::Type(handle)),
            }
        })
        .collect()
}

fn is_integer_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}
