//! Unified declaration enum.

use crate::{AliasEntry, ClassTemplateEntry, FunctionEntry, QualifiedName, RecordEntry, Span};

/// Any declaration held by the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Record(RecordEntry),
    ClassTemplate(ClassTemplateEntry),
    Alias(AliasEntry),
    Function(FunctionEntry),
}

impl Decl {
    pub fn name(&self) -> &QualifiedName {
        match self {
            Decl::Record(r) => &r.name,
            Decl::ClassTemplate(t) => &t.name,
            Decl::Alias(a) => &a.name,
            Decl::Function(f) => &f.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Decl::Record(r) => r.span,
            Decl::ClassTemplate(t) => t.span,
            Decl::Alias(a) => a.span,
            Decl::Function(f) => f.span,
        }
    }

    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Decl::Record(r) if r.is_specialization() => "class template specialization",
            Decl::Record(r) => r.tag.keyword(),
            Decl::ClassTemplate(_) => "class template",
            Decl::Alias(_) => "type alias",
            Decl::Function(_) => "function",
        }
    }

    pub fn as_record(&self) -> Option<&RecordEntry> {
        match self {
            Decl::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut RecordEntry> {
        match self {
            Decl::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_class_template(&self) -> Option<&ClassTemplateEntry> {
        match self {
            Decl::ClassTemplate(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_class_template_mut(&mut self) -> Option<&mut ClassTemplateEntry> {
        match self {
            Decl::ClassTemplate(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&AliasEntry> {
        match self {
            Decl::Alias(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionEntry> {
        match self {
            Decl::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Whether this declaration names a type.
    pub fn is_type(&self) -> bool {
        !matches!(self, Decl::Function(_))
    }
}

impl From<RecordEntry> for Decl {
    fn from(entry: RecordEntry) -> Self {
        Decl::Record(entry)
    }
}

impl From<ClassTemplateEntry> for Decl {
    fn from(entry: ClassTemplateEntry) -> Self {
        Decl::ClassTemplate(entry)
    }
}

impl From<AliasEntry> for Decl {
    fn from(entry: AliasEntry) -> Self {
        Decl::Alias(entry)
    }
}

impl From<FunctionEntry> for Decl {
    fn from(entry: FunctionEntry) -> Self {
        Decl::Function(entry)
    }
}
