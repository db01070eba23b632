//! Record (struct/class/union) entries.

use bitflags::bitflags;

use crate::{CanonicalArg, DeclId, QualifiedName, Span, Ty};

bitflags! {
    /// State and shape flags of a record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RecordFlags: u8 {
        /// The definition has been seen (or instantiated) and laid out.
        const COMPLETE = 1 << 0;
        /// The record is an instance of a class template.
        const SPECIALIZATION = 1 << 1;
        /// At least one method is virtual; the layout starts with a vtable pointer.
        const POLYMORPHIC = 1 << 2;
    }
}

/// The class-key a record was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    Struct,
    Class,
    Union,
}

impl RecordTag {
    pub fn keyword(self) -> &'static str {
        match self {
            RecordTag::Struct => "struct",
            RecordTag::Class => "class",
            RecordTag::Union => "union",
        }
    }
}

/// A non-static data member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: String,
    pub ty: Ty,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Method,
    Constructor,
    Destructor,
}

/// A member function signature. Bodies are never analysed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    pub name: String,
    pub kind: MethodKind,
    /// `void` for constructors and destructors.
    pub return_type: Ty,
    pub params: Vec<Ty>,
    pub is_const: bool,
    pub is_virtual: bool,
    pub is_static: bool,
    pub has_body: bool,
    pub span: Span,
}

/// Concrete layout of a complete record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    pub size: u64,
    pub align: u64,
    /// Byte offset of each field, parallel to [`RecordEntry::fields`].
    pub field_offsets: Vec<u64>,
    pub has_vtable_pointer: bool,
}

/// Which template and arguments an instance record was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecializationInfo {
    pub template: DeclId,
    pub args: Vec<CanonicalArg>,
}

/// A struct, class or union.
///
/// Instances of class templates are ordinary records carrying
/// [`SpecializationInfo`]; they start incomplete when only declared (for
/// example through a pointer) and become complete once instantiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    pub name: QualifiedName,
    pub tag: RecordTag,
    pub flags: RecordFlags,
    pub fields: Vec<FieldEntry>,
    pub static_fields: Vec<FieldEntry>,
    pub methods: Vec<MethodEntry>,
    pub layout: Option<RecordLayout>,
    pub specialization: Option<SpecializationInfo>,
    pub span: Span,
}

impl RecordEntry {
    /// A declared but not yet defined record.
    pub fn new(name: QualifiedName, tag: RecordTag, span: Span) -> Self {
        Self {
            name,
            tag,
            flags: RecordFlags::empty(),
            fields: Vec::new(),
            static_fields: Vec::new(),
            methods: Vec::new(),
            layout: None,
            specialization: None,
            span,
        }
    }

    /// Builder: mark as an instance of `template` with `args`.
    pub fn with_specialization(mut self, template: DeclId, args: Vec<CanonicalArg>) -> Self {
        self.flags |= RecordFlags::SPECIALIZATION;
        self.specialization = Some(SpecializationInfo { template, args });
        self
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.flags.contains(RecordFlags::COMPLETE)
    }

    #[inline]
    pub fn is_specialization(&self) -> bool {
        self.flags.contains(RecordFlags::SPECIALIZATION)
    }

    #[inline]
    pub fn is_polymorphic(&self) -> bool {
        self.flags.contains(RecordFlags::POLYMORPHIC)
    }

    #[inline]
    pub fn is_union(&self) -> bool {
        self.tag == RecordTag::Union
    }

    /// Attach a layout and mark the record complete.
    pub fn complete(&mut self, layout: RecordLayout) {
        if layout.has_vtable_pointer {
            self.flags |= RecordFlags::POLYMORPHIC;
        }
        self.layout = Some(layout);
        self.flags |= RecordFlags::COMPLETE;
    }
}
