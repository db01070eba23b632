//! Canonical specialization descriptors.

use interop_core::{
    BuiltinKind, CanonicalArg, CanonicalType, InteropError, TemplateArgument, TypeHandle, TypeHash, TypeKind,
};
use interop_registry::TranslationUnit;

/// Build the canonical descriptor of `target<args...>`.
///
/// Pure: the arena is only read. Type arguments are reduced to their
/// alias-free type; value arguments keep the integral type they were
/// built with, conversion to the parameter type happens on instantiation.
pub fn canonicalize(
    unit: &TranslationUnit,
    target: &TypeHandle,
    args: &[TemplateArgument],
) -> Result<CanonicalType, InteropError> {
    let not_a_template = || InteropError::NotATemplate {
        name: target.name().to_string(),
    };
    let template = match (target.kind(), target.decl()) {
        (TypeKind::ClassTemplate, Some(id)) => id,
        _ => return Err(not_a_template()),
    };
    let entry = unit.class_template(template).ok_or_else(not_a_template)?;
    if args.len() != entry.arity() {
        return Err(InteropError::ArityMismatch {
            name: entry.name.to_string(),
            expected: entry.arity(),
            got: args.len(),
        });
    }

    let args = args
        .iter()
        .map(|arg| match arg {
            TemplateArgument::Type(handle) => {
                handle
                    .ty()
                    .cloned()
                    .map(CanonicalArg::Type)
                    .ok_or_else(|| InteropError::UnknownType {
                        token: handle.name().to_string(),
                    })
            }
            TemplateArgument::Value { value, ty } => Ok(CanonicalArg::Value {
                value: *value,
                ty: ty.builtin_kind().filter(|k| k.is_integral()).unwrap_or(BuiltinKind::Int),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let template_hash = unit
        .decls()
        .hash_of(template)
        .unwrap_or_else(|| TypeHash::from_name(&entry.name.to_string()));
    let arg_hashes: Vec<TypeHash> = args.iter().map(|arg| arg.type_hash(unit)).collect();
    let arg_spellings = args.iter().map(|arg| arg.display(unit)).collect();

    Ok(CanonicalType {
        template,
        template_name: entry.name.clone(),
        args,
        arg_spellings,
        hash: TypeHash::from_template_instance(template_hash, &arg_hashes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use interop_core::{
        AliasEntry, ClassTemplateEntry, Decl, QualifiedName, RecordTag, Span, TargetInfo, TemplateParamEntry,
        TemplateParamKind, Ty,
    };
    use pretty_assertions::assert_eq;

    fn unit_with_foo() -> (TranslationUnit, TypeHandle) {
        let mut unit = TranslationUnit::new("test.h", TargetInfo::default());
        let name = QualifiedName::new(vec!["ns".into()], "Foo");
        let entry = ClassTemplateEntry::new(
            name,
            RecordTag::Struct,
            vec![
                TemplateParamEntry::new(Some("T".into()), TemplateParamKind::Type, Span::default()),
                TemplateParamEntry::new(
                    Some("num".into()),
                    TemplateParamKind::Integral(BuiltinKind::Int),
                    Span::default(),
                ),
            ],
            Span::default(),
        );
        let id = unit
            .decls_mut()
            .insert(Decl::ClassTemplate(entry), TypeHash::from_name("ns::Foo"))
            .expect("fresh");
        (unit, TypeHandle::class_template(id, "ns::Foo", 2))
    }

    fn args(ty: TypeHandle, value: i128) -> Vec<TemplateArgument> {
        vec![
            TemplateArgument::Type(ty),
            TemplateArgument::Value {
                value,
                ty: TypeHandle::builtin(BuiltinKind::Int),
            },
        ]
    }

    #[test]
    fn descriptor_and_dump() {
        let (unit, foo) = unit_with_foo();
        let canonical = canonicalize(&unit, &foo, &args(TypeHandle::builtin(BuiltinKind::Int), 4)).expect("valid");
        assert_eq!(canonical.to_string(), "ns::Foo<int, 4>");
        assert_eq!(
            canonical.args,
            vec![
                CanonicalArg::Type(Ty::Builtin(BuiltinKind::Int)),
                CanonicalArg::Value {
                    value: 4,
                    ty: BuiltinKind::Int
                },
            ]
        );
        assert!(canonical.dump().starts_with("TemplateSpecializationType 'ns::Foo<int, 4>' canonical"));
    }

    #[test]
    fn pure_and_deterministic() {
        let (unit, foo) = unit_with_foo();
        let before = unit.decl_count();
        let a = canonicalize(&unit, &foo, &args(TypeHandle::builtin(BuiltinKind::Int), 4)).expect("valid");
        let b = canonicalize(&unit, &foo, &args(TypeHandle::builtin(BuiltinKind::Int), 4)).expect("valid");
        let c = canonicalize(&unit, &foo, &args(TypeHandle::builtin(BuiltinKind::Int), 5)).expect("valid");
        assert_eq!(a, b);
        assert_ne!(a.hash, c.hash);
        assert_eq!(unit.decl_count(), before);
        assert_eq!(unit.cache().instance_count(), 0);
    }

    #[test]
    fn alias_reduces_to_target() {
        let (mut unit, foo) = unit_with_foo();
        let alias = AliasEntry::new(
            QualifiedName::global("IntPtr"),
            Ty::pointer(Ty::Builtin(BuiltinKind::Int)),
            Span::default(),
        );
        unit.decls_mut()
            .insert(Decl::Alias(alias), TypeHash::from_name("IntPtr"))
            .expect("fresh");

        let through_alias = TypeHandle::compound(Ty::pointer(Ty::Builtin(BuiltinKind::Int)), "IntPtr");
        let a = canonicalize(&unit, &foo, &args(through_alias, 1)).expect("valid");
        let spelled = TypeHandle::compound(Ty::pointer(Ty::Builtin(BuiltinKind::Int)), "int *");
        let b = canonicalize(&unit, &foo, &args(spelled, 1)).expect("valid");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "ns::Foo<int *, 1>");
    }

    #[test]
    fn rejects_non_templates_and_bad_arity() {
        let (unit, foo) = unit_with_foo();
        let int = TypeHandle::builtin(BuiltinKind::Int);
        assert_eq!(
            canonicalize(&unit, &int, &[]),
            Err(InteropError::NotATemplate { name: "int".into() })
        );
        assert_eq!(
            canonicalize(&unit, &foo, &[TemplateArgument::Type(int)]),
            Err(InteropError::ArityMismatch {
                name: "ns::Foo".into(),
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn kind_mismatch_is_left_to_instantiation() {
        let (unit, foo) = unit_with_foo();
        let int = TypeHandle::builtin(BuiltinKind::Int);
        let swapped = vec![
            TemplateArgument::Value {
                value: 4,
                ty: int.clone(),
            },
            TemplateArgument::Type(int),
        ];
        let canonical = canonicalize(&unit, &foo, &swapped).expect("shape only");
        assert_eq!(canonical.to_string(), "ns::Foo<4, int>");
    }
}
