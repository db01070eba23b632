//! Type handles returned by name resolution, and template arguments built
//! from them.

use std::fmt;

use crate::{BuiltinKind, DeclId, Ty};

/// Coarse classification of what a [`TypeHandle`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Builtin,
    Record,
    ClassTemplate,
    TemplateSpecialization,
    /// Pointer, reference, array or const type reached through an alias.
    Compound,
    Unknown,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Builtin => "Builtin",
            TypeKind::Record => "Record",
            TypeKind::ClassTemplate => "ClassTemplate",
            TypeKind::TemplateSpecialization => "TemplateSpecialization",
            TypeKind::Compound => "Compound",
            TypeKind::Unknown => "Unknown",
        }
    }
}

/// A non-owning reference to a type known to a translation unit.
///
/// Handles are plain values holding arena indices; they stay meaningful only
/// for the unit that produced them. "Not found" is the [`TypeKind::Unknown`]
/// handle, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    kind: TypeKind,
    name: String,
    decl: Option<DeclId>,
    ty: Option<Ty>,
    template_arity: usize,
}

impl TypeHandle {
    /// The "not found" handle for `name`.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Unknown,
            name: name.into(),
            decl: None,
            ty: None,
            template_arity: 0,
        }
    }

    pub fn builtin(kind: BuiltinKind) -> Self {
        Self {
            kind: TypeKind::Builtin,
            name: kind.name().to_string(),
            decl: None,
            ty: Some(Ty::Builtin(kind)),
            template_arity: 0,
        }
    }

    /// A record; `specialization` selects [`TypeKind::TemplateSpecialization`].
    pub fn record(decl: DeclId, name: impl Into<String>, specialization: bool) -> Self {
        Self {
            kind: if specialization {
                TypeKind::TemplateSpecialization
            } else {
                TypeKind::Record
            },
            name: name.into(),
            decl: Some(decl),
            ty: Some(Ty::Record(decl)),
            template_arity: 0,
        }
    }

    pub fn class_template(decl: DeclId, name: impl Into<String>, arity: usize) -> Self {
        Self {
            kind: TypeKind::ClassTemplate,
            name: name.into(),
            decl: Some(decl),
            ty: None,
            template_arity: arity,
        }
    }

    pub fn compound(ty: Ty, name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Compound,
            name: name.into(),
            decl: None,
            ty: Some(ty),
            template_arity: 0,
        }
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn decl(&self) -> Option<DeclId> {
        self.decl
    }

    /// The semantic type, for handles that denote a type.
    #[inline]
    pub fn ty(&self) -> Option<&Ty> {
        self.ty.as_ref()
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.kind != TypeKind::Unknown
    }

    #[inline]
    pub fn is_template(&self) -> bool {
        self.kind == TypeKind::ClassTemplate
    }

    /// Number of template parameters; 0 for anything but a class template.
    #[inline]
    pub fn number_of_template_parameters(&self) -> usize {
        self.template_arity
    }

    pub fn builtin_kind(&self) -> Option<BuiltinKind> {
        match (&self.kind, &self.ty) {
            (TypeKind::Builtin, Some(Ty::Builtin(kind))) => Some(*kind),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn builtin_kind_name(&self) -> Option<&'static str> {
        self.builtin_kind().map(BuiltinKind::kind_name)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(decl) = self.decl {
            write!(f, "(@{})", decl)?;
        }
        write!(f, " {}", self.kind_name())?;
        if let Some(builtin) = self.builtin_kind_name() {
            write!(f, "({})", builtin)?;
        }
        Ok(())
    }
}

/// A template argument as built from a host-supplied token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateArgument {
    Type(TypeHandle),
    /// An integer literal and the integral type it was read as.
    Value { value: i128, ty: TypeHandle },
}

impl TemplateArgument {
    pub fn is_value(&self) -> bool {
        matches!(self, TemplateArgument::Value { .. })
    }
}
