//! Itanium C++ ABI name mangling.
//!
//! Covers what the guest subset can declare: namespaces, records, class
//! template instances with type and integral arguments, builtins, pointers,
//! references, arrays and const. Substitutions (`S_`) are never emitted, so
//! a name that repeats a component is longer than a C++ compiler's.

use std::fmt::Write;

use interop_core::{CanonicalArg, DeclId, MethodEntry, MethodKind, QualifiedName, Ty};
use interop_registry::TranslationUnit;

/// Symbol of a free function.
pub fn mangle_function(unit: &TranslationUnit, name: &QualifiedName, params: &[Ty]) -> String {
    if name.scope.is_empty() && name.name == "main" {
        return name.name.clone();
    }
    let mangler = Mangler { unit };
    let mut out = String::from("_Z");
    if name.scope.is_empty() {
        source_name(&mut out, &name.name);
    } else {
        out.push('N');
        for segment in &name.scope {
            source_name(&mut out, segment);
        }
        source_name(&mut out, &name.name);
        out.push('E');
    }
    mangler.params(&mut out, params);
    out
}

/// Symbol of a member function of the record `record`.
pub fn mangle_method(unit: &TranslationUnit, record: DeclId, method: &MethodEntry) -> String {
    let mangler = Mangler { unit };
    let mut out = String::from("_ZN");
    if method.is_const {
        out.push('K');
    }
    mangler.record_prefix(&mut out, record);
    match method.kind {
        MethodKind::Constructor => out.push_str("C1"),
        MethodKind::Destructor => out.push_str("D1"),
        MethodKind::Method => source_name(&mut out, &method.name),
    }
    out.push('E');
    mangler.params(&mut out, &method.params);
    out
}

/// Mangled form of a type on its own, as used inside symbols.
pub fn mangle_type(unit: &TranslationUnit, ty: &Ty) -> String {
    let mut out = String::new();
    Mangler { unit }.ty(&mut out, ty);
    out
}

struct Mangler<'a> {
    unit: &'a TranslationUnit,
}

impl Mangler<'_> {
    fn params(&self, out: &mut String, params: &[Ty]) {
        if params.is_empty() {
            out.push('v');
        }
        for param in params {
            // Top-level cv-qualifiers are not part of the signature.
            let param = match param {
                Ty::Const(inner) => inner.as_ref(),
                other => other,
            };
            self.ty(out, param);
        }
    }

    fn ty(&self, out: &mut String, ty: &Ty) {
        match ty {
            Ty::Builtin(kind) => out.push_str(kind.mangling()),
            Ty::Record(id) => {
                let nested = self
                    .unit
                    .decls()
                    .get(*id)
                    .is_some_and(|decl| !decl.name().scope.is_empty());
                if nested {
                    out.push('N');
                    self.record_prefix(out, *id);
                    out.push('E');
                } else {
                    self.record_prefix(out, *id);
                }
            }
            Ty::Pointer(inner) => {
                out.push('P');
                self.ty(out, inner);
            }
            Ty::Reference(inner) => {
                out.push('R');
                self.ty(out, inner);
            }
            Ty::Const(inner) => {
                out.push('K');
                self.ty(out, inner);
            }
            Ty::Array(element, len) => {
                let _ = write!(out, "A{}_", len);
                self.ty(out, element);
            }
        }
    }

    /// Namespaces, then the record's own name with any template arguments.
    fn record_prefix(&self, out: &mut String, id: DeclId) {
        let Some(record) = self.unit.decls().record(id) else {
            source_name(out, &format!("__invalid{}", id.index()));
            return;
        };
        for segment in &record.name.scope {
            source_name(out, segment);
        }
        let template = record
            .specialization
            .as_ref()
            .and_then(|info| Some((self.unit.class_template(info.template)?, &info.args)));
        match template {
            Some((template, args)) => {
                source_name(out, &template.name.name);
                self.template_args(out, args);
            }
            None => source_name(out, &record.name.name),
        }
    }

    fn template_args(&self, out: &mut String, args: &[CanonicalArg]) {
        out.push('I');
        for arg in args {
            match arg {
                CanonicalArg::Type(ty) => self.ty(out, ty),
                CanonicalArg::Value { value, ty } => {
                    out.push('L');
                    out.push_str(ty.mangling());
                    if *value < 0 {
                        out.push('n');
                    }
                    let _ = write!(out, "{}E", value.unsigned_abs());
                }
            }
        }
        out.push('E');
    }
}

fn source_name(out: &mut String, name: &str) {
    let _ = write!(out, "{}{}", name.len(), name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use interop_core::{
        BuiltinKind, ClassTemplateEntry, Decl, RecordEntry, RecordTag, Span, TargetInfo, TemplateParamEntry,
        TemplateParamKind, TypeHash,
    };
    use pretty_assertions::assert_eq;

    fn int() -> Ty {
        Ty::Builtin(BuiltinKind::Int)
    }

    fn insert(unit: &mut TranslationUnit, decl: Decl) -> DeclId {
        let hash = TypeHash::from_name(&decl.name().to_string());
        unit.decls_mut().insert(decl, hash).expect("fresh name")
    }

    fn method(name: &str, kind: MethodKind, params: Vec<Ty>, is_const: bool) -> MethodEntry {
        MethodEntry {
            name: name.into(),
            kind,
            return_type: Ty::Builtin(BuiltinKind::Void),
            params,
            is_const,
            is_virtual: false,
            is_static: false,
            has_body: true,
            span: Span::default(),
        }
    }

    fn instance(
        unit: &mut TranslationUnit,
        template: DeclId,
        scope: Vec<String>,
        name: &str,
        args: Vec<CanonicalArg>,
    ) -> DeclId {
        insert(
            unit,
            Decl::Record(
                RecordEntry::new(QualifiedName::new(scope, name), RecordTag::Struct, Span::default())
                    .with_specialization(template, args),
            ),
        )
    }

    /// `ns::Bar`, `Foo` and `ns::Box` templates with a few instances.
    struct Fixture {
        unit: TranslationUnit,
        bar: DeclId,
        foo_int_4: DeclId,
        foo_char_neg: DeclId,
        box_bar: DeclId,
    }

    fn fixture() -> Fixture {
        let mut unit = TranslationUnit::new("test.h", TargetInfo::default());
        let bar = insert(
            &mut unit,
            Decl::Record(RecordEntry::new(
                QualifiedName::new(vec!["ns".into()], "Bar"),
                RecordTag::Struct,
                Span::default(),
            )),
        );
        let foo = insert(
            &mut unit,
            Decl::ClassTemplate(ClassTemplateEntry::new(
                QualifiedName::global("Foo"),
                RecordTag::Struct,
                vec![
                    TemplateParamEntry::new(None, TemplateParamKind::Type, Span::default()),
                    TemplateParamEntry::new(None, TemplateParamKind::Integral(BuiltinKind::Int), Span::default()),
                ],
                Span::default(),
            )),
        );
        let boxed = insert(
            &mut unit,
            Decl::ClassTemplate(ClassTemplateEntry::new(
                QualifiedName::new(vec!["ns".into()], "Box"),
                RecordTag::Class,
                vec![TemplateParamEntry::new(None, TemplateParamKind::Type, Span::default())],
                Span::default(),
            )),
        );

        let foo_int_4 = instance(
            &mut unit,
            foo,
            vec![],
            "Foo<int, 4>",
            vec![CanonicalArg::Type(int()), CanonicalArg::Value { value: 4, ty: BuiltinKind::Int }],
        );
        let foo_char_neg = instance(
            &mut unit,
            foo,
            vec![],
            "Foo<char, -1>",
            vec![
                CanonicalArg::Type(Ty::Builtin(BuiltinKind::Char)),
                CanonicalArg::Value { value: -1, ty: BuiltinKind::Int },
            ],
        );
        let box_bar = instance(
            &mut unit,
            boxed,
            vec!["ns".into()],
            "Box<ns::Bar *>",
            vec![CanonicalArg::Type(Ty::pointer(Ty::Record(bar)))],
        );
        Fixture {
            unit,
            bar,
            foo_int_4,
            foo_char_neg,
            box_bar,
        }
    }

    #[test]
    fn free_functions() {
        let f = fixture();
        assert_eq!(mangle_function(&f.unit, &QualifiedName::global("foo"), &[]), "_Z3foov");
        assert_eq!(mangle_function(&f.unit, &QualifiedName::global("main"), &[int()]), "main");
        assert_eq!(
            mangle_function(
                &f.unit,
                &QualifiedName::new(vec!["ns".into()], "bar"),
                &[int(), Ty::pointer(Ty::constant(Ty::Builtin(BuiltinKind::Char)))],
            ),
            "_ZN2ns3barEiPKc"
        );
        // Top-level const is dropped, nested const is kept.
        assert_eq!(
            mangle_function(
                &f.unit,
                &QualifiedName::global("f"),
                &[Ty::constant(int()), Ty::constant(Ty::pointer(int()))],
            ),
            "_Z1fiPi"
        );
        assert_eq!(
            mangle_function(
                &f.unit,
                &QualifiedName::global("g"),
                &[Ty::reference(Ty::array(Ty::Builtin(BuiltinKind::Double), 4))],
            ),
            "_Z1gRA4_d"
        );
    }

    #[test]
    fn records_in_signatures() {
        let f = fixture();
        assert_eq!(mangle_type(&f.unit, &Ty::Record(f.bar)), "N2ns3BarE");
        assert_eq!(mangle_type(&f.unit, &Ty::Record(f.foo_int_4)), "3FooIiLi4EE");
        assert_eq!(mangle_type(&f.unit, &Ty::Record(f.foo_char_neg)), "3FooIcLin1EE");
        assert_eq!(mangle_type(&f.unit, &Ty::Record(f.box_bar)), "N2ns3BoxIPN2ns3BarEEE");
        assert_eq!(
            mangle_function(&f.unit, &QualifiedName::global("take"), &[Ty::reference(Ty::Record(f.foo_int_4))]),
            "_Z4takeR3FooIiLi4EE"
        );
    }

    #[test]
    fn methods() {
        let f = fixture();
        let add = method("add", MethodKind::Method, vec![int()], false);
        assert_eq!(mangle_method(&f.unit, f.foo_int_4, &add), "_ZN3FooIiLi4EE3addEi");

        let get = method("get", MethodKind::Method, vec![], true);
        assert_eq!(mangle_method(&f.unit, f.bar, &get), "_ZNK2ns3Bar3getEv");

        let ctor = method("Bar", MethodKind::Constructor, vec![], false);
        let dtor = method("~Bar", MethodKind::Destructor, vec![], false);
        assert_eq!(mangle_method(&f.unit, f.bar, &ctor), "_ZN2ns3BarC1Ev");
        assert_eq!(mangle_method(&f.unit, f.bar, &dtor), "_ZN2ns3BarD1Ev");

        let put = method("put", MethodKind::Method, vec![Ty::Builtin(BuiltinKind::Bool)], false);
        assert_eq!(mangle_method(&f.unit, f.box_bar, &put), "_ZN2ns3BoxIPN2ns3BarEE3putEb");
    }
}
