//! ModuleEmitter - lowers a translation unit to a textual, LLVM-flavoured IR
//! module.
//!
//! The module holds one named struct type per complete record and one
//! function per free function and per method of a complete record, in arena
//! order. Class template patterns are never emitted; specializations appear
//! once instantiated. Function bodies are not lowered, so every function,
//! defined in the source or not, is an external `declare` that links against
//! the real compilation of the same source.
//!
//! Emission never mutates the unit and returns either a whole module or an
//! [`InteropError::Emit`].

mod mangle;

use std::fmt;

use rustc_hash::FxHashSet;

use interop_core::{
    BuiltinKind, DeclId, InteropError, Layout, MethodEntry, RecordEntry, RecordTag, Span, Ty, source_location,
};
use interop_registry::TranslationUnit;

use crate::layout::ty_layout;

pub use mangle::{mangle_function, mangle_method, mangle_type};

/// A named struct type. `body` is `None` for opaque (incomplete) records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrStruct {
    pub name: String,
    pub body: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrFunction {
    pub symbol: String,
    pub return_type: String,
    pub params: Vec<String>,
    /// Whether the implicit object parameter leads the parameter list.
    pub has_this: bool,
    /// The source defines a body. Its signature must then be complete.
    pub is_definition: bool,
}

/// A lowered module. `Display` renders the textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrModule {
    pub module_id: String,
    pub source_filename: String,
    pub data_layout: String,
    pub triple: String,
    pub types: Vec<IrStruct>,
    pub functions: Vec<IrFunction>,
}

impl IrModule {
    pub fn struct_type(&self, name: &str) -> Option<&IrStruct> {
        self.types.iter().find(|ty| ty.name == name)
    }

    pub fn function(&self, symbol: &str) -> Option<&IrFunction> {
        self.functions.iter().find(|f| f.symbol == symbol)
    }
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.module_id)?;
        writeln!(f, "source_filename = \"{}\"", self.source_filename)?;
        writeln!(f, "target datalayout = \"{}\"", self.data_layout)?;
        writeln!(f, "target triple = \"{}\"", self.triple)?;

        if !self.types.is_empty() {
            writeln!(f)?;
        }
        for ty in &self.types {
            match &ty.body {
                Some(body) => writeln!(f, "{} = type {{ {} }}", ty.name, body.join(", "))?,
                None => writeln!(f, "{} = type opaque", ty.name)?,
            }
        }

        for function in &self.functions {
            writeln!(f)?;
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}

impl fmt::Display for IrFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params = Vec::with_capacity(self.params.len() + 1);
        if self.has_this {
            params.push("ptr".to_string());
        }
        params.extend(self.params.iter().cloned());
        writeln!(f, "declare {} @{}({})", self.return_type, self.symbol, params.join(", "))
    }
}

/// Lower `unit` to an IR module.
pub fn emit(unit: &TranslationUnit) -> Result<IrModule, InteropError> {
    let _span = tracing::debug_span!("emit", file = unit.file()).entered();
    let emitter = Emitter {
        unit,
        opaque: FxHashSet::default(),
    };
    let module = emitter.run()?;
    tracing::debug!(
        types = module.types.len(),
        functions = module.functions.len(),
        "module emitted"
    );
    Ok(module)
}

struct Emitter<'u> {
    unit: &'u TranslationUnit,
    /// Incomplete records named by value in a signature.
    opaque: FxHashSet<DeclId>,
}

impl Emitter<'_> {
    fn run(mut self) -> Result<IrModule, InteropError> {
        let unit = self.unit;
        let mut types = Vec::new();
        let mut functions = Vec::new();

        for (id, decl) in unit.decls().iter() {
            if let Some(record) = decl.as_record() {
                if !record.is_complete() {
                    continue;
                }
                types.push(IrStruct {
                    name: self.struct_name(id),
                    body: Some(self.struct_body(record)),
                });
                for method in &record.methods {
                    functions.push(self.method(id, record, method)?);
                }
            } else if let Some(function) = decl.as_function() {
                let symbol = mangle_function(unit, &function.name, &function.params);
                let what = format!("function '{}'", function.name);
                functions.push(self.function(
                    symbol,
                    &function.return_type,
                    &function.params,
                    false,
                    function.has_body,
                    (&what, function.span),
                )?);
            }
        }

        let mut opaque: Vec<DeclId> = self.opaque.iter().copied().collect();
        opaque.sort();
        types.extend(opaque.into_iter().map(|id| IrStruct {
            name: self.struct_name(id),
            body: None,
        }));

        Ok(IrModule {
            module_id: unit.file().to_string(),
            source_filename: unit.file().to_string(),
            data_layout: unit.target().data_layout.to_string(),
            triple: unit.target().triple.to_string(),
            types,
            functions,
        })
    }

    fn method(&mut self, record_id: DeclId, record: &RecordEntry, method: &MethodEntry) -> Result<IrFunction, InteropError> {
        let symbol = mangle_method(self.unit, record_id, method);
        let what = format!("member function '{}::{}'", record.name, method.name);
        self.function(
            symbol,
            &method.return_type,
            &method.params,
            !method.is_static,
            method.has_body,
            (&what, method.span),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn function(
        &mut self,
        symbol: String,
        return_type: &Ty,
        params: &[Ty],
        has_this: bool,
        is_definition: bool,
        (what, span): (&str, Span),
    ) -> Result<IrFunction, InteropError> {
        let return_type = self.signature_type(return_type, is_definition, "return type of", what, span)?;
        let params = params
            .iter()
            .map(|param| self.signature_type(param, is_definition, "parameter of", what, span))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IrFunction {
            symbol,
            return_type,
            params,
            has_this,
            is_definition,
        })
    }

    /// Lower a return or parameter type. Definitions need complete by-value
    /// records; declarations name them as opaque types.
    fn signature_type(
        &mut self,
        ty: &Ty,
        is_definition: bool,
        role: &str,
        what: &str,
        span: Span,
    ) -> Result<String, InteropError> {
        if let Some(id) = ty.as_record() {
            if ty_layout(self.unit, ty).is_none() {
                if is_definition {
                    return Err(InteropError::Emit {
                        diagnostic: format!(
                            "{}: error: {} {} has incomplete type '{}'",
                            source_location(self.unit.file(), span),
                            role,
                            what,
                            ty.display(self.unit)
                        ),
                    });
                }
                self.opaque.insert(id);
            }
        }
        Ok(self.value_type(ty))
    }

    /// IR type of a value in registers (`bool` is `i1`).
    fn value_type(&self, ty: &Ty) -> String {
        match ty.unqualified() {
            Ty::Builtin(BuiltinKind::Bool) => "i1".to_string(),
            _ => self.memory_type(ty),
        }
    }

    /// IR type of a value in memory (`bool` is `i8`).
    fn memory_type(&self, ty: &Ty) -> String {
        match ty {
            Ty::Builtin(kind) => self.builtin_type(*kind).to_string(),
            Ty::Record(id) => self.struct_name(*id),
            Ty::Pointer(_) | Ty::Reference(_) => "ptr".to_string(),
            Ty::Array(element, len) => format!("[{} x {}]", len, self.memory_type(element)),
            Ty::Const(inner) => self.memory_type(inner),
        }
    }

    fn builtin_type(&self, kind: BuiltinKind) -> &'static str {
        match kind {
            BuiltinKind::Void => "void",
            BuiltinKind::Bool | BuiltinKind::Char | BuiltinKind::SChar | BuiltinKind::UChar => "i8",
            BuiltinKind::Short | BuiltinKind::UShort => "i16",
            BuiltinKind::Int | BuiltinKind::UInt => "i32",
            BuiltinKind::Long | BuiltinKind::ULong if self.unit.target().long_width == 4 => "i32",
            BuiltinKind::Long | BuiltinKind::ULong | BuiltinKind::LongLong | BuiltinKind::ULongLong => "i64",
            BuiltinKind::Float => "float",
            BuiltinKind::Double => "double",
        }
    }

    /// `%struct.Foo`, quoted when the name needs it (`%"struct.ns::Foo<int, 4>"`).
    fn struct_name(&self, id: DeclId) -> String {
        let (tag, name) = match self.unit.decls().record(id) {
            Some(record) => (record.tag, record.name.to_string()),
            None => (RecordTag::Struct, format!("anon.{}", id.index())),
        };
        let raw = format!("{}.{}", tag.keyword(), name);
        if raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            format!("%{}", raw)
        } else {
            format!("%\"{}\"", raw)
        }
    }

    fn struct_body(&self, record: &RecordEntry) -> Vec<String> {
        let Some(layout) = record.layout.as_ref() else {
            return vec!["i8".to_string()];
        };
        let pointer = self.unit.target().pointer_layout();
        let mut body = Vec::new();
        let mut end = 0;

        if record.is_union() {
            // The most aligned member (largest on ties) carries the union's alignment.
            let mut largest: Option<(&Ty, Layout)> = None;
            for field in &record.fields {
                let Some(field_layout) = ty_layout(self.unit, &field.ty) else {
                    continue;
                };
                let better = largest.is_none_or(|(_, best)| {
                    (field_layout.align, field_layout.size) > (best.align, best.size)
                });
                if better {
                    largest = Some((&field.ty, field_layout));
                }
            }
            if let Some((ty, field_layout)) = largest {
                body.push(self.memory_type(ty));
                end = field_layout.size;
            }
        } else {
            if layout.has_vtable_pointer {
                body.push("ptr".to_string());
                end = pointer.size;
            }
            for (field, offset) in record.fields.iter().zip(&layout.field_offsets) {
                if *offset > end {
                    body.push(padding(*offset - end));
                }
                body.push(self.memory_type(&field.ty));
                let size = ty_layout(self.unit, &field.ty).map_or(0, |l| l.size);
                end = offset + size;
            }
        }

        if body.is_empty() {
            return vec!["i8".to_string()];
        }
        if layout.size > end {
            body.push(padding(layout.size - end));
        }
        body
    }
}

fn padding(bytes: u64) -> String {
    format!("[{} x i8]", bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::analyze;
    use crate::template::{DEFAULT_MAX_DEPTH, build_template_arguments, instantiate};
    use bumpalo::Bump;
    use interop_core::TargetInfo;
    use interop_parser::Parser;
    use pretty_assertions::assert_eq;

    fn unit_for(source: &str, target: TargetInfo) -> TranslationUnit {
        let arena = Bump::new();
        let ast = Parser::parse(source, &arena).expect("source parses");
        analyze("test.h", &ast, target, DEFAULT_MAX_DEPTH).expect("source is valid")
    }

    fn unit(source: &str) -> TranslationUnit {
        unit_for(source, TargetInfo::x86_64_linux())
    }

    fn body(module: &IrModule, name: &str) -> Option<Vec<String>> {
        module.struct_type(name).and_then(|ty| ty.body.clone())
    }

    const FOO: &str = r#"
        template<class T, int num = 4>
        struct Foo {
            T innerFoo;
            T add(T arg) { return innerFoo + arg; }
        };
        int foo() { Foo<int> F; return F.add(1); }
    "#;

    #[test]
    fn foo_specialization_module() {
        let mut unit = unit(FOO);
        let foo = crate::resolver::resolve(&unit, "Foo");
        let args = build_template_arguments(&unit, &foo, &["int", "4"]).expect("arguments");
        instantiate(&mut unit, &foo, &args, DEFAULT_MAX_DEPTH).expect("instantiates");

        let module = emit(&unit).expect("emits");
        assert_eq!(body(&module, "%\"struct.Foo<int, 4>\""), Some(vec!["i32".to_string()]));
        assert!(module.struct_type("%struct.Foo").is_none());

        let add = module.function("_ZN3FooIiLi4EE3addEi").expect("method emitted");
        assert!(add.is_definition);
        assert!(add.has_this);
        assert!(module.function("_Z3foov").is_some_and(|f| f.is_definition));

        let text = module.to_string();
        assert!(text.starts_with("; ModuleID = 'test.h'\nsource_filename = \"test.h\"\n"));
        assert!(text.contains("target triple = \"x86_64-unknown-linux-gnu\""));
        assert!(text.contains("%\"struct.Foo<int, 4>\" = type { i32 }"));
        assert!(text.contains("declare i32 @_ZN3FooIiLi4EE3addEi(ptr, i32)\n"));
        assert!(text.contains("declare i32 @_Z3foov()\n"));
    }

    #[test]
    fn emission_is_read_only() {
        let unit = unit(FOO);
        let before = unit.decl_count();
        let first = emit(&unit).expect("emits").to_string();
        let second = emit(&unit).expect("emits").to_string();
        assert_eq!(first, second);
        assert_eq!(unit.decl_count(), before);
    }

    #[test]
    fn padding_and_vtables() {
        let unit = unit(
            r#"
            struct Padded { char c; double d; short s; };
            class Shape { public: virtual ~Shape(); int sides; };
            struct Empty {};
            struct Flags { bool on; bool off[3]; };
            "#,
        );
        let module = emit(&unit).expect("emits");
        assert_eq!(
            body(&module, "%struct.Padded"),
            Some(vec![
                "i8".to_string(),
                "[7 x i8]".to_string(),
                "double".to_string(),
                "i16".to_string(),
                "[6 x i8]".to_string(),
            ])
        );
        assert_eq!(
            body(&module, "%class.Shape"),
            Some(vec!["ptr".to_string(), "i32".to_string(), "[4 x i8]".to_string()])
        );
        assert_eq!(body(&module, "%struct.Empty"), Some(vec!["i8".to_string()]));
        assert_eq!(
            body(&module, "%struct.Flags"),
            Some(vec!["i8".to_string(), "[3 x i8]".to_string()])
        );
        let dtor = module.function("_ZN5ShapeD1Ev").expect("destructor");
        assert!(!dtor.is_definition);
        assert!(module.to_string().contains("declare void @_ZN5ShapeD1Ev(ptr)"));
    }

    #[test]
    fn unions_use_their_largest_member() {
        let unit = unit("union Value { char c; int i; double d; char bytes[12]; };");
        let module = emit(&unit).expect("emits");
        assert_eq!(
            body(&module, "%union.Value"),
            Some(vec!["double".to_string(), "[8 x i8]".to_string()])
        );
    }

    #[test]
    fn signatures_and_names() {
        let unit = unit(
            r#"
            namespace ns {
                struct Point { int x; int y; };
                bool near(const Point &a, const Point *b, long n);
            }
            struct Counter {
                int value;
                int get() const { return value; }
                static Counter make(int start);
                Counter();
            };
            "#,
        );
        let module = emit(&unit).expect("emits");
        let text = module.to_string();
        assert!(text.contains("%\"struct.ns::Point\" = type { i32, i32 }"));
        assert!(text.contains("declare i1 @_ZN2ns4nearERKN2ns5PointEPKN2ns5PointEl(ptr, ptr, i64)"));
        assert!(text.contains("declare i32 @_ZNK7Counter3getEv(ptr)"));
        assert!(text.contains("declare %struct.Counter @_ZN7Counter4makeEi(i32)"));
        assert!(text.contains("declare void @_ZN7CounterC1Ev(ptr)"));
    }

    #[test]
    fn defined_functions_are_not_given_bodies() {
        let unit = unit(
            r#"
            struct Counter {
                int value;
                int get() const { return value; }
                void bump() { value = value + 1; }
            };
            int twice(int x) { return x * 2; }
            "#,
        );
        let module = emit(&unit).expect("emits");
        assert!(module.functions.iter().all(|f| f.is_definition));
        let text = module.to_string();
        assert!(!text.contains("define"));
        assert!(!text.contains("linkonce_odr"));
        assert!(!text.contains("unreachable"));
        assert!(text.contains("declare void @_ZN7Counter4bumpEv(ptr)"));
        assert!(text.contains("declare i32 @_Z5twicei(i32)"));
    }

    #[test]
    fn long_follows_the_target() {
        let unit = unit_for("struct L { long l; long long ll; };", TargetInfo::i686_linux());
        let module = emit(&unit).expect("emits");
        assert_eq!(
            body(&module, "%struct.L"),
            Some(vec!["i32".to_string(), "i64".to_string()])
        );
        assert!(module.to_string().contains("target triple = \"i686-unknown-linux-gnu\""));
    }

    #[test]
    fn declarations_may_name_incomplete_records() {
        let unit = unit(
            r#"
            struct Opaque;
            void consume(Opaque value);
            Opaque *make();
            "#,
        );
        let module = emit(&unit).expect("emits");
        let text = module.to_string();
        assert!(text.contains("%struct.Opaque = type opaque"));
        assert!(text.contains("declare void @_Z7consume6Opaque(%struct.Opaque)"));
        assert!(text.contains("declare ptr @_Z4makev()"));
    }

    #[test]
    fn definitions_need_complete_records() {
        let unit = unit("struct Opaque;\nvoid consume(Opaque value) {}\n");
        let err = emit(&unit).expect_err("incomplete parameter");
        let message = err.to_string();
        assert!(message.starts_with("cannot emit module: test.h:2:"));
        assert!(message.ends_with("error: parameter of function 'consume' has incomplete type 'Opaque'"));

        let unit = self::unit("template<class T> struct Box { T value; };\nBox<int> open() {}\n");
        let err = emit(&unit).expect_err("declared-only specialization");
        assert!(err.to_string().contains("return type of function 'open' has incomplete type 'Box<int>'"));
    }
}
