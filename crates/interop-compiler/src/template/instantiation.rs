//! Template instantiation.
//!
//! [`Instantiator`] owns the mutable side of a translation unit while types
//! are being elaborated. Instances of a class template are ordinary records
//! carrying their canonical arguments; they move through two states:
//!
//! 1. **Declared**: registered in the arena and the instance cache, but
//!    without members or layout. Naming a specialization through a pointer
//!    or reference, or as a template argument, stops here.
//! 2. **Complete**: members substituted and layout computed. By-value
//!    fields, array elements and `sizeof`/`alignof` operands require this.
//!
//! Completion recurses through the members; the set of instances currently
//! being completed detects self-containment, and the depth limit bounds
//! runaway recursion such as `R<N> { R<N + 1> next; }`.

use interop_core::{
    CanonicalArg, ClassTemplateEntry, Decl, DeclId, FieldEntry, InteropError, MethodEntry,
    QualifiedName, RecordEntry, RecordPattern, RecordTag, SemaError, Span, TemplateArgument,
    TemplateParamEntry, TemplateParamKind, TypeHandle, TypeHash, ensure_sufficient_stack,
};
use interop_registry::TranslationUnit;

use crate::layout::record_layout;

use super::canonical::canonicalize;
use super::substitution::Require;

/// Maximum nesting of instantiations before giving up.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// A fully instantiated class template specialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiatedType {
    /// `TemplateSpecialization` handle of the instance record.
    pub handle: TypeHandle,
    pub size: u64,
    pub align: u64,
}

/// Instantiate `target` with `args`, completing the instance.
///
/// Runs inside an arena transaction: on failure every declaration added and
/// every record completed by this call is rolled back, so the unit looks
/// exactly as it did before.
pub fn instantiate(
    unit: &mut TranslationUnit,
    target: &TypeHandle,
    args: &[TemplateArgument],
    max_depth: usize,
) -> Result<InstantiatedType, InteropError> {
    let canonical = canonicalize(unit, target, args)?;
    let _span = tracing::debug_span!("instantiate", specialization = %canonical).entered();

    let checkpoint = unit.checkpoint();
    let result = Instantiator::new(unit, max_depth).instantiate_canonical(
        canonical.template,
        &canonical.args,
        Span::default(),
    );

    match result {
        Ok(id) => {
            unit.commit(checkpoint);
            let record = unit.decls().record(id).and_then(|r| Some((r, r.layout.as_ref()?)));
            let Some((record, layout)) = record else {
                return Err(InteropError::IncompleteType {
                    name: canonical.to_string(),
                });
            };
            tracing::debug!(instance = %record.name, size = layout.size, "instantiated");
            Ok(InstantiatedType {
                handle: TypeHandle::record(id, record.name.to_string(), true),
                size: layout.size,
                align: layout.align,
            })
        }
        Err(err) => {
            unit.rollback(checkpoint);
            tracing::debug!(error = %err, "instantiation failed, arena rolled back");
            Err(InteropError::Instantiation {
                template: canonical.to_string(),
                detail: err.to_string(),
            })
        }
    }
}

/// Mutable elaboration context over a translation unit.
pub struct Instantiator<'u> {
    pub(crate) unit: &'u mut TranslationUnit,
    max_depth: usize,
    /// Instances whose completion is in progress, outermost first.
    in_progress: Vec<DeclId>,
}

impl<'u> Instantiator<'u> {
    pub fn new(unit: &'u mut TranslationUnit, max_depth: usize) -> Self {
        Self {
            unit,
            max_depth,
            in_progress: Vec::new(),
        }
    }

    pub fn unit(&self) -> &TranslationUnit {
        self.unit
    }

    /// Convert host-supplied canonical arguments and complete the instance.
    pub fn instantiate_canonical(
        &mut self,
        template: DeclId,
        args: &[CanonicalArg],
        span: Span,
    ) -> Result<DeclId, SemaError> {
        let entry = self.template_entry(template, span)?;
        if args.len() != entry.arity() {
            return Err(SemaError::TemplateArity {
                template: entry.name.to_string(),
                expected: entry.arity().to_string(),
                got: args.len(),
                span,
            });
        }
        let converted = entry
            .params
            .iter()
            .enumerate()
            .zip(args)
            .map(|((index, param), arg)| self.convert_arg(param, index, arg.clone(), span))
            .collect::<Result<Vec<_>, _>>()?;

        let id = self.declare_instance(template, converted, span)?;
        self.complete_instance(id, "instance", span)?;
        Ok(id)
    }

    // ==========================================================================
    // Declaration
    // ==========================================================================

    /// The class template `id`, cloned out of the arena.
    pub(crate) fn template_entry(&self, id: DeclId, span: Span) -> Result<ClassTemplateEntry, SemaError> {
        match self.unit.decl(id) {
            Some(Decl::ClassTemplate(template)) => Ok(template.clone()),
            Some(decl) => Err(SemaError::NotATemplate {
                name: decl.name().to_string(),
                span,
            }),
            None => Err(SemaError::UnknownType {
                name: id.to_string(),
                span,
            }),
        }
    }

    /// Find or declare the instance of `template` for converted arguments.
    ///
    /// Equal argument lists always yield the same declaration.
    pub fn declare_instance(
        &mut self,
        template: DeclId,
        args: Vec<CanonicalArg>,
        span: Span,
    ) -> Result<DeclId, SemaError> {
        let entry = self.template_entry(template, span)?;
        let template_hash = self
            .unit
            .decls()
            .hash_of(template)
            .unwrap_or_else(|| TypeHash::from_name(&entry.name.to_string()));
        let unit: &TranslationUnit = self.unit;
        let arg_hashes: Vec<TypeHash> = args.iter().map(|arg| arg.type_hash(unit)).collect();

        if let Some(id) = self.unit.cache().get_instance(template_hash, &arg_hashes) {
            return Ok(id);
        }

        let spellings: Vec<String> = args.iter().map(|arg| arg.display(unit)).collect();
        let name = QualifiedName::new(
            entry.name.scope.clone(),
            format!("{}<{}>", entry.name.name, spellings.join(", ")),
        );
        let hash = TypeHash::from_template_instance(template_hash, &arg_hashes);
        tracing::trace!(instance = %name, "declaring specialization");

        let record = RecordEntry::new(name, entry.tag, entry.span).with_specialization(template, args);
        let id = self.unit.decls_mut().insert(Decl::Record(record), hash)?;
        self.unit
            .cache_mut()
            .cache_instance(template_hash, arg_hashes, id);
        Ok(id)
    }

    /// Check an argument count written in guest source, where trailing
    /// arguments with defaults may be omitted.
    pub(crate) fn check_arity(entry: &ClassTemplateEntry, got: usize, span: Span) -> Result<(), SemaError> {
        let (required, arity) = (entry.required_arity(), entry.arity());
        if (required..=arity).contains(&got) {
            return Ok(());
        }
        let expected = if required == arity {
            arity.to_string()
        } else if got < required {
            format!("at least {}", required)
        } else {
            format!("at most {}", arity)
        };
        Err(SemaError::TemplateArity {
            template: entry.name.to_string(),
            expected,
            got,
            span,
        })
    }

    /// Check an argument against its parameter and convert values to the
    /// parameter's integral type.
    pub(crate) fn convert_arg(
        &self,
        param: &TemplateParamEntry,
        index: usize,
        arg: CanonicalArg,
        span: Span,
    ) -> Result<CanonicalArg, SemaError> {
        let param_name = || format!("template parameter '{}'", param.display_name(index));
        match (param.kind, arg) {
            (TemplateParamKind::Type, arg @ CanonicalArg::Type(_)) => Ok(arg),
            (TemplateParamKind::Type, CanonicalArg::Value { .. }) => Err(SemaError::TemplateArgumentKind {
                param: param_name(),
                expected: "a type".to_string(),
                span,
            }),
            (TemplateParamKind::Integral(kind), CanonicalArg::Value { value, .. }) => {
                let in_range = self
                    .unit
                    .target()
                    .integer_range(kind)
                    .is_some_and(|(min, max)| (min..=max).contains(&value));
                if !in_range {
                    return Err(SemaError::Narrowing {
                        value,
                        ty: kind.to_string(),
                        span,
                    });
                }
                Ok(CanonicalArg::Value { value, ty: kind })
            }
            (TemplateParamKind::Integral(kind), CanonicalArg::Type(_)) => {
                Err(SemaError::TemplateArgumentKind {
                    param: param_name(),
                    expected: format!("an integral constant of type '{}'", kind),
                    span,
                })
            }
        }
    }

    // ==========================================================================
    // Completion
    // ==========================================================================

    /// Complete the instance `id` if it is not complete yet.
    ///
    /// `what` names the use that requires completeness, for diagnostics.
    pub fn complete_instance(&mut self, id: DeclId, what: &str, span: Span) -> Result<(), SemaError> {
        let Some(record) = self.unit.decls().record(id) else {
            return Err(SemaError::NotAType {
                name: id.to_string(),
                span,
            });
        };
        if record.is_complete() {
            return Ok(());
        }
        let name = record.name.to_string();
        let Some(info) = record.specialization.clone() else {
            return Err(SemaError::IncompleteType {
                context: what.to_string(),
                ty: name,
                span,
            });
        };

        if self.in_progress.contains(&id) {
            return Err(SemaError::IncompleteType {
                context: what.to_string(),
                ty: name,
                span,
            });
        }
        if self.in_progress.len() >= self.max_depth {
            return Err(SemaError::DepthExceeded {
                limit: self.max_depth,
                span,
            });
        }

        let template = self.template_entry(info.template, span)?;
        let Some(pattern) = template.pattern.as_ref() else {
            return Err(SemaError::UndefinedTemplate {
                name: template.name.to_string(),
                span,
            });
        };

        self.in_progress.push(id);
        tracing::debug!(instance = %name, depth = self.in_progress.len(), "instantiating members");
        let result =
            ensure_sufficient_stack(|| self.build_members(id, template.tag, pattern, &info.args, template.span));
        self.in_progress.pop();

        result.map_err(|err| match err {
            nested @ SemaError::InInstantiation { .. } => nested,
            other => SemaError::InInstantiation {
                instance: name,
                source: Box::new(other),
                span,
            },
        })
    }

    /// Substitute `args` into `pattern`, lay the record out and complete it.
    ///
    /// Plain records go through here too, with no arguments.
    pub(crate) fn build_members(
        &mut self,
        id: DeclId,
        tag: RecordTag,
        pattern: &RecordPattern,
        args: &[CanonicalArg],
        span: Span,
    ) -> Result<(), SemaError> {
        for assertion in &pattern.static_asserts {
            if self.evaluate(&assertion.condition, args, assertion.span)? == 0 {
                return Err(SemaError::StaticAssertFailed {
                    message: assertion.message.clone(),
                    span: assertion.span,
                });
            }
        }

        let mut fields = Vec::new();
        let mut static_fields = Vec::new();
        for field in &pattern.fields {
            let what = format!("field '{}'", field.name);
            if field.is_static {
                let ty = self.substitute_type(&field.ty, args, Require::Declared, &what, field.span)?;
                static_fields.push(FieldEntry {
                    name: field.name.clone(),
                    ty,
                    span: field.span,
                });
            } else {
                let ty = self.substitute_type(&field.ty, args, Require::Complete, &what, field.span)?;
                fields.push(FieldEntry {
                    name: field.name.clone(),
                    ty,
                    span: field.span,
                });
            }
        }

        let mut methods = Vec::with_capacity(pattern.methods.len());
        for method in &pattern.methods {
            let what = format!("method '{}'", method.name);
            let return_type =
                self.substitute_type(&method.return_type, args, Require::Declared, &what, method.span)?;
            let params = method
                .params
                .iter()
                .map(|param| self.substitute_type(param, args, Require::Declared, &what, method.span))
                .collect::<Result<Vec<_>, _>>()?;
            methods.push(MethodEntry {
                name: method.name.clone(),
                kind: method.kind,
                return_type,
                params,
                is_const: method.is_const,
                is_virtual: method.is_virtual,
                is_static: method.is_static,
                has_body: method.has_body,
                span: method.span,
            });
        }

        let polymorphic = methods.iter().any(|m| m.is_virtual);
        let layout = record_layout(self.unit, tag, &fields, polymorphic, span)?;
        self.unit.decls_mut().update_record(id, span, |record| {
            record.fields = fields;
            record.static_fields = static_fields;
            record.methods = methods;
            record.complete(layout);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interop_core::{
        BuiltinKind, FieldPattern, PatternArg, PatternExpr, PatternType, RecordTag,
        StaticAssertPattern, TargetInfo, Ty,
    };
    use pretty_assertions::assert_eq;

    fn param(name: &str, kind: TemplateParamKind) -> TemplateParamEntry {
        TemplateParamEntry::new(Some(name.into()), kind, Span::default())
    }

    fn field(name: &str, ty: PatternType) -> FieldPattern {
        FieldPattern {
            name: name.into(),
            ty,
            is_static: false,
            span: Span::default(),
        }
    }

    fn add_template(
        unit: &mut TranslationUnit,
        name: &str,
        params: Vec<TemplateParamEntry>,
        pattern: Option<RecordPattern>,
    ) -> DeclId {
        let mut entry = ClassTemplateEntry::new(QualifiedName::global(name), RecordTag::Struct, params, Span::default());
        entry.pattern = pattern;
        unit.decls_mut()
            .insert(Decl::ClassTemplate(entry), TypeHash::from_name(name))
            .expect("fresh name")
    }

    /// `template<class T, int num> struct Foo { T innerFoo; };`
    fn foo_unit() -> (TranslationUnit, DeclId) {
        let mut unit = TranslationUnit::new("test.h", TargetInfo::x86_64_linux());
        let foo = add_template(
            &mut unit,
            "Foo",
            vec![
                param("T", TemplateParamKind::Type),
                param("num", TemplateParamKind::Integral(BuiltinKind::Int)),
            ],
            Some(RecordPattern {
                fields: vec![field("innerFoo", PatternType::Param(0))],
                ..RecordPattern::default()
            }),
        );
        (unit, foo)
    }

    fn int_args(n: i128) -> Vec<TemplateArgument> {
        vec![
            TemplateArgument::Type(TypeHandle::builtin(BuiltinKind::Int)),
            TemplateArgument::Value {
                value: n,
                ty: TypeHandle::builtin(BuiltinKind::Int),
            },
        ]
    }

    #[test]
    fn instantiates_and_lays_out() {
        let (mut unit, foo) = foo_unit();
        let target = TypeHandle::class_template(foo, "Foo", 2);
        let instance = instantiate(&mut unit, &target, &int_args(4), DEFAULT_MAX_DEPTH).expect("instantiable");
        assert_eq!(instance.handle.name(), "Foo<int, 4>");
        assert_eq!(instance.size, 4);
        assert_eq!(instance.align, 4);
        assert_eq!(unit.decl_count(), 2);
        assert_eq!(unit.lookup("Foo<int, 4>"), instance.handle.decl());
    }

    #[test]
    fn equal_arguments_share_one_declaration() {
        let (mut unit, foo) = foo_unit();
        let target = TypeHandle::class_template(foo, "Foo", 2);
        let first = instantiate(&mut unit, &target, &int_args(4), DEFAULT_MAX_DEPTH).expect("instantiable");
        let second = instantiate(&mut unit, &target, &int_args(4), DEFAULT_MAX_DEPTH).expect("instantiable");
        assert_eq!(first, second);
        assert_eq!(unit.decl_count(), 2);
        assert_eq!(unit.cache().instance_count(), 1);

        instantiate(&mut unit, &target, &int_args(5), DEFAULT_MAX_DEPTH).expect("instantiable");
        assert_eq!(unit.decl_count(), 3);
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let (mut unit, foo) = foo_unit();
        let target = TypeHandle::class_template(foo, "Foo", 2);
        let args = vec![
            TemplateArgument::Type(TypeHandle::builtin(BuiltinKind::Int)),
            TemplateArgument::Type(TypeHandle::builtin(BuiltinKind::Int)),
        ];
        let err = instantiate(&mut unit, &target, &args, DEFAULT_MAX_DEPTH).unwrap_err();
        assert_eq!(
            err,
            InteropError::Instantiation {
                template: "Foo<int, int>".into(),
                detail: "template argument for template parameter 'num' must be an integral constant of type 'int'"
                    .into(),
            }
        );
        assert_eq!(unit.decl_count(), 1);
    }

    #[test]
    fn narrowing_is_rejected() {
        let mut unit = TranslationUnit::new("test.h", TargetInfo::x86_64_linux());
        let flag = add_template(
            &mut unit,
            "Flag",
            vec![param("B", TemplateParamKind::Integral(BuiltinKind::Bool))],
            Some(RecordPattern::default()),
        );
        let target = TypeHandle::class_template(flag, "Flag", 1);
        let value = |value| {
            vec![TemplateArgument::Value {
                value,
                ty: TypeHandle::builtin(BuiltinKind::Int),
            }]
        };
        let err = instantiate(&mut unit, &target, &value(2), DEFAULT_MAX_DEPTH).unwrap_err();
        assert!(matches!(err, InteropError::Instantiation { ref detail, .. } if detail.contains("narrowed to type 'bool'")));

        let ok = instantiate(&mut unit, &target, &value(1), DEFAULT_MAX_DEPTH).expect("in range");
        assert_eq!(ok.handle.name(), "Flag<true>");
    }

    #[test]
    fn failed_static_assert_rolls_back() {
        let mut unit = TranslationUnit::new("test.h", TargetInfo::x86_64_linux());
        let checked = add_template(
            &mut unit,
            "Checked",
            vec![param("N", TemplateParamKind::Integral(BuiltinKind::Int))],
            Some(RecordPattern {
                static_asserts: vec![StaticAssertPattern {
                    condition: PatternExpr::Binary(
                        interop_core::BinaryOp::Gt,
                        Box::new(PatternExpr::Param(0)),
                        Box::new(PatternExpr::Int(0)),
                    ),
                    message: Some("N must be positive".into()),
                    span: Span::default(),
                }],
                ..RecordPattern::default()
            }),
        );
        let target = TypeHandle::class_template(checked, "Checked", 1);
        let args = vec![TemplateArgument::Value {
            value: 0,
            ty: TypeHandle::builtin(BuiltinKind::Int),
        }];

        let err = instantiate(&mut unit, &target, &args, DEFAULT_MAX_DEPTH).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot instantiate `Checked<0>`: in instantiation of 'Checked<0>': static assertion failed: N must be positive"
        );
        assert_eq!(unit.decl_count(), 1);
        assert_eq!(unit.cache().instance_count(), 0);
        assert_eq!(unit.lookup("Checked<0>"), None);
    }

    #[test]
    fn runaway_recursion_hits_depth_limit() {
        // template<int N> struct R { R<N + 1> next; };
        let mut unit = TranslationUnit::new("test.h", TargetInfo::x86_64_linux());
        let r = DeclId::new(0);
        let next = PatternType::Specialization {
            template: r,
            args: vec![PatternArg::Value(PatternExpr::Binary(
                interop_core::BinaryOp::Add,
                Box::new(PatternExpr::Param(0)),
                Box::new(PatternExpr::Int(1)),
            ))],
        };
        let id = add_template(
            &mut unit,
            "R",
            vec![param("N", TemplateParamKind::Integral(BuiltinKind::Int))],
            Some(RecordPattern {
                fields: vec![field("next", next)],
                ..RecordPattern::default()
            }),
        );
        assert_eq!(id, r);

        let target = TypeHandle::class_template(r, "R", 1);
        let args = vec![TemplateArgument::Value {
            value: 0,
            ty: TypeHandle::builtin(BuiltinKind::Int),
        }];
        let err = instantiate(&mut unit, &target, &args, 16).unwrap_err();
        assert!(err.to_string().contains("exceeded maximum depth of 16"), "{err}");
        assert_eq!(unit.decl_count(), 1);
    }

    #[test]
    fn self_containment_is_incomplete() {
        // template<class T> struct Node { Node<T> next; };
        let mut unit = TranslationUnit::new("test.h", TargetInfo::x86_64_linux());
        let node = DeclId::new(0);
        let self_ty = PatternType::Specialization {
            template: node,
            args: vec![PatternArg::Type(PatternType::Param(0))],
        };
        add_template(
            &mut unit,
            "Node",
            vec![param("T", TemplateParamKind::Type)],
            Some(RecordPattern {
                fields: vec![
                    field("link", PatternType::Pointer(Box::new(self_ty.clone()))),
                    field("next", self_ty),
                ],
                ..RecordPattern::default()
            }),
        );
        let target = TypeHandle::class_template(node, "Node", 1);
        let args = vec![TemplateArgument::Type(TypeHandle::builtin(BuiltinKind::Int))];
        let err = instantiate(&mut unit, &target, &args, DEFAULT_MAX_DEPTH).unwrap_err();
        assert!(
            err.to_string().contains("field 'next' has incomplete type 'Node<int>'"),
            "{err}"
        );
    }

    #[test]
    fn pointer_members_only_declare() {
        // template<class T> struct Node { T value; Node<T> *next; };
        let mut unit = TranslationUnit::new("test.h", TargetInfo::x86_64_linux());
        let node = DeclId::new(0);
        let other = PatternType::Specialization {
            template: node,
            args: vec![PatternArg::Type(PatternType::Pointer(Box::new(PatternType::Param(0))))],
        };
        add_template(
            &mut unit,
            "Node",
            vec![param("T", TemplateParamKind::Type)],
            Some(RecordPattern {
                fields: vec![
                    field("value", PatternType::Param(0)),
                    field("other", PatternType::Pointer(Box::new(other))),
                ],
                ..RecordPattern::default()
            }),
        );
        let target = TypeHandle::class_template(node, "Node", 1);
        let args = vec![TemplateArgument::Type(TypeHandle::builtin(BuiltinKind::Char))];
        let instance = instantiate(&mut unit, &target, &args, DEFAULT_MAX_DEPTH).expect("instantiable");
        assert_eq!(instance.size, 16);

        // Node<char *> is declared but left incomplete.
        let declared = unit.lookup("Node<char *>").expect("declared");
        assert!(unit.decls().record(declared).is_some_and(|r| !r.is_complete()));
        assert_eq!(
            unit.decls().record(declared).map(|r| r.specialization.clone()),
            Some(Some(interop_core::SpecializationInfo {
                template: node,
                args: vec![CanonicalArg::Type(Ty::pointer(Ty::Builtin(BuiltinKind::Char)))],
            }))
        );
    }

    #[test]
    fn undefined_template_cannot_be_instantiated() {
        let mut unit = TranslationUnit::new("test.h", TargetInfo::x86_64_linux());
        let fwd = add_template(&mut unit, "Fwd", vec![param("T", TemplateParamKind::Type)], None);
        let target = TypeHandle::class_template(fwd, "Fwd", 1);
        let args = vec![TemplateArgument::Type(TypeHandle::builtin(BuiltinKind::Int))];
        let err = instantiate(&mut unit, &target, &args, DEFAULT_MAX_DEPTH).unwrap_err();
        assert!(err.to_string().contains("implicit instantiation of undefined template 'Fwd'"), "{err}");
        assert_eq!(unit.decl_count(), 1);
    }
}
