//! TypeResolver - exact-name lookup of types in a translation unit.

use interop_core::{BuiltinKind, Decl, DeclId, Ty, TypeHandle};
use interop_registry::TranslationUnit;

/// Resolve `name` to a type handle.
///
/// Builtin spellings (and `size_t` and friends, per the unit's target)
/// never touch the arena. Other names must match a declaration's qualified
/// name exactly; a leading `::` is ignored. Aliases resolve to the handle
/// of their target. Anything else yields [`TypeHandle::unknown`].
pub fn resolve(unit: &TranslationUnit, name: &str) -> TypeHandle {
    let bare = name.strip_prefix("::").unwrap_or(name);
    let handle = if let Some(kind) = BuiltinKind::from_name(bare) {
        TypeHandle::builtin(kind)
    } else if let Some(kind) = unit.target().builtin_typedef(bare) {
        TypeHandle::builtin(kind)
    } else {
        match unit.lookup(bare) {
            Some(id) => decl_handle(unit, id, name),
            None => TypeHandle::unknown(name),
        }
    };
    tracing::trace!(name, kind = handle.kind_name(), "resolved");
    handle
}

/// Handle for the declaration `id`.
pub fn decl_handle(unit: &TranslationUnit, id: DeclId, requested: &str) -> TypeHandle {
    match unit.decl(id) {
        Some(Decl::Record(record)) => TypeHandle::record(id, record.name.to_string(), record.is_specialization()),
        Some(Decl::ClassTemplate(template)) => {
            TypeHandle::class_template(id, template.name.to_string(), template.arity())
        }
        Some(Decl::Alias(alias)) => ty_handle(unit, &alias.target),
        Some(Decl::Function(_)) | None => TypeHandle::unknown(requested),
    }
}

/// Handle for an alias-free type.
pub fn ty_handle(unit: &TranslationUnit, ty: &Ty) -> TypeHandle {
    match ty {
        Ty::Builtin(kind) => TypeHandle::builtin(*kind),
        Ty::Record(id) => decl_handle(unit, *id, &ty.display(unit)),
        other => TypeHandle::compound(other.clone(), other.display(unit)),
    }
}
