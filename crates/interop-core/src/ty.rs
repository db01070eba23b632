//! Semantic types and declaration identities.
//!
//! [`Ty`] is the alias-free type every guest type expression reduces to.
//! Records are referenced by [`DeclId`], an index into the translation
//! unit's declaration arena; a `Ty` is only meaningful for the unit that
//! produced it.

use std::fmt;

use crate::{BuiltinKind, TypeHash};

/// Index of a declaration in a translation unit's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(u32);

impl DeclId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A namespace-qualified declaration name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QualifiedName {
    /// Enclosing namespaces, outermost first.
    pub scope: Vec<String>,
    /// The unqualified name (for specializations, the full `Foo<int, 4>` spelling).
    pub name: String,
}

impl QualifiedName {
    pub fn new(scope: Vec<String>, name: impl Into<String>) -> Self {
        Self {
            scope,
            name: name.into(),
        }
    }

    /// A name in the global namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self::new(Vec::new(), name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.scope {
            write!(f, "{}::", segment)?;
        }
        f.write_str(&self.name)
    }
}

/// Access to declaration names and identities, for rendering and hashing types.
pub trait DeclNames {
    /// Qualified spelling of a record declaration.
    fn decl_name(&self, id: DeclId) -> String;

    /// Canonical identity hash of a record declaration.
    fn decl_hash(&self, id: DeclId) -> TypeHash;
}

/// An alias-free guest type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    Builtin(BuiltinKind),
    Record(DeclId),
    Pointer(Box<Ty>),
    Reference(Box<Ty>),
    Array(Box<Ty>, u64),
    Const(Box<Ty>),
}

impl Ty {
    pub fn pointer(pointee: Ty) -> Ty {
        Ty::Pointer(Box::new(pointee))
    }

    pub fn reference(referent: Ty) -> Ty {
        Ty::Reference(Box::new(referent))
    }

    pub fn array(element: Ty, len: u64) -> Ty {
        Ty::Array(Box::new(element), len)
    }

    /// Const-qualify; qualifying twice or qualifying a reference is a no-op.
    pub fn constant(inner: Ty) -> Ty {
        match inner {
            Ty::Const(_) | Ty::Reference(_) => inner,
            other => Ty::Const(Box::new(other)),
        }
    }

    /// The type without top-level const.
    pub fn unqualified(&self) -> &Ty {
        match self {
            Ty::Const(inner) => inner.unqualified(),
            other => other,
        }
    }

    /// Whether the type is (possibly const) `void`.
    pub fn is_void(&self) -> bool {
        matches!(self.unqualified(), Ty::Builtin(BuiltinKind::Void))
    }

    /// Whether values of this type are stored indirectly (pointer or reference).
    pub fn is_indirect(&self) -> bool {
        matches!(self.unqualified(), Ty::Pointer(_) | Ty::Reference(_))
    }

    /// The builtin kind if this is a (possibly const) builtin.
    pub fn as_builtin(&self) -> Option<BuiltinKind> {
        match self.unqualified() {
            Ty::Builtin(kind) => Some(*kind),
            _ => None,
        }
    }

    /// The record if this is a (possibly const) record.
    pub fn as_record(&self) -> Option<DeclId> {
        match self.unqualified() {
            Ty::Record(id) => Some(*id),
            _ => None,
        }
    }

    /// Structural identity hash of the type.
    pub fn type_hash(&self, names: &impl DeclNames) -> TypeHash {
        match self {
            Ty::Builtin(kind) => TypeHash::from_name(kind.name()),
            Ty::Record(id) => names.decl_hash(*id),
            Ty::Pointer(inner) => TypeHash::from_pointer(inner.type_hash(names)),
            Ty::Reference(inner) => TypeHash::from_reference(inner.type_hash(names)),
            Ty::Array(inner, len) => TypeHash::from_array(inner.type_hash(names), *len),
            Ty::Const(inner) => TypeHash::from_const(inner.type_hash(names)),
        }
    }

    /// Render the type the way guest diagnostics spell it (`const int *`, `int[4]`).
    pub fn display(&self, names: &impl DeclNames) -> String {
        match self {
            Ty::Builtin(kind) => kind.name().to_string(),
            Ty::Record(id) => names.decl_name(*id),
            Ty::Pointer(inner) => suffixed(inner.display(names), "*"),
            Ty::Reference(inner) => suffixed(inner.display(names), "&"),
            Ty::Array(inner, len) => format!("{}[{}]", inner.display(names), len),
            Ty::Const(inner) => match inner.as_ref() {
                Ty::Pointer(_) => format!("{}const", inner.display(names)),
                _ => format!("const {}", inner.display(names)),
            },
        }
    }
}

fn suffixed(inner: String, declarator: &str) -> String {
    if inner.ends_with('*') || inner.ends_with('&') {
        format!("{}{}", inner, declarator)
    } else {
        format!("{} {}", inner, declarator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Names;

    impl DeclNames for Names {
        fn decl_name(&self, id: DeclId) -> String {
            format!("R{}", id.index())
        }

        fn decl_hash(&self, id: DeclId) -> TypeHash {
            TypeHash::from_name(&self.decl_name(id))
        }
    }

    #[test]
    fn display_spellings() {
        let int = Ty::Builtin(BuiltinKind::Int);
        assert_eq!(int.display(&Names), "int");
        assert_eq!(Ty::pointer(int.clone()).display(&Names), "int *");
        assert_eq!(
            Ty::pointer(Ty::pointer(int.clone())).display(&Names),
            "int **"
        );
        assert_eq!(Ty::constant(int.clone()).display(&Names), "const int");
        assert_eq!(
            Ty::constant(Ty::pointer(int.clone())).display(&Names),
            "int *const"
        );
        assert_eq!(Ty::array(int.clone(), 4).display(&Names), "int[4]");
        assert_eq!(Ty::reference(Ty::Record(DeclId::new(2))).display(&Names), "R2 &");
    }

    #[test]
    fn qualification_helpers() {
        let int = Ty::Builtin(BuiltinKind::Int);
        let konst = Ty::constant(Ty::constant(int.clone()));
        assert_eq!(konst, Ty::Const(Box::new(int.clone())));
        assert_eq!(konst.unqualified(), &int);
        assert_eq!(konst.as_builtin(), Some(BuiltinKind::Int));
        assert!(Ty::constant(Ty::Builtin(BuiltinKind::Void)).is_void());
        assert!(Ty::pointer(int.clone()).is_indirect());
        assert!(!int.is_indirect());
    }

    #[test]
    fn hash_distinguishes_structure() {
        let int = Ty::Builtin(BuiltinKind::Int);
        assert_ne!(
            int.type_hash(&Names),
            Ty::constant(int.clone()).type_hash(&Names)
        );
        assert_eq!(
            Ty::Record(DeclId::new(1)).type_hash(&Names),
            TypeHash::from_name("R1")
        );
    }

    #[test]
    fn qualified_name_display() {
        let name = QualifiedName::new(vec!["a".into(), "b".into()], "Foo");
        assert_eq!(name.to_string(), "a::b::Foo");
        assert_eq!(QualifiedName::global("Foo").to_string(), "Foo");
    }
}
