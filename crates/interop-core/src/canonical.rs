//! Canonical specialization descriptors.

use std::fmt;

use crate::{BuiltinKind, DeclId, DeclNames, QualifiedName, Ty, TypeHash};

/// A canonical template argument: an alias-free type, or an integral value
/// tagged with its integral type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalArg {
    Type(Ty),
    Value { value: i128, ty: BuiltinKind },
}

impl CanonicalArg {
    /// Identity hash; equal arguments hash equal.
    pub fn type_hash(&self, names: &impl DeclNames) -> TypeHash {
        match self {
            CanonicalArg::Type(ty) => ty.type_hash(names),
            CanonicalArg::Value { value, ty } => {
                TypeHash::from_value(TypeHash::from_name(ty.name()), *value)
            }
        }
    }

    /// Spelling inside a template argument list.
    pub fn display(&self, names: &impl DeclNames) -> String {
        match self {
            CanonicalArg::Type(ty) => ty.display(names),
            CanonicalArg::Value { value, ty } => format_value(*value, *ty),
        }
    }
}

/// Spell an integral value the way it appears in a specialization name.
pub fn format_value(value: i128, ty: BuiltinKind) -> String {
    match ty {
        BuiltinKind::Bool => (if value != 0 { "true" } else { "false" }).to_string(),
        _ => value.to_string(),
    }
}

/// The canonical, alias-free descriptor of a class template specialization.
///
/// Produced without touching the arena; two descriptors are equal exactly
/// when they name the same template with structurally equal arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalType {
    pub template: DeclId,
    pub template_name: QualifiedName,
    pub args: Vec<CanonicalArg>,
    /// Rendered arguments, parallel to `args`.
    pub arg_spellings: Vec<String>,
    pub hash: TypeHash,
}

impl CanonicalType {
    /// Render a tree describing the specialization.
    pub fn dump(&self) -> String {
        let mut out = format!("TemplateSpecializationType '{}' canonical\n", self);
        for (arg, spelling) in self.args.iter().zip(&self.arg_spellings) {
            match arg {
                CanonicalArg::Type(_) => {
                    out.push_str(&format!("|-TemplateArgument type '{}'\n", spelling));
                }
                CanonicalArg::Value { ty, .. } => {
                    out.push_str(&format!(
                        "|-TemplateArgument integral {} '{}'\n",
                        spelling, ty
                    ));
                }
            }
        }
        out.push_str(&format!("`-ClassTemplate '{}'", self.template_name));
        out
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}<{}>",
            self.template_name,
            self.arg_spellings.join(", ")
        )
    }
}
