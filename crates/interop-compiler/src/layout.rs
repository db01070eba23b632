//! LayoutOracle - size, alignment and field offsets of complete types.
//!
//! All sizes come from the unit's [`TargetInfo`](interop_core::TargetInfo).
//! Record layout follows the System V rules the guest compiler uses:
//!
//! - a vtable pointer first when any method is virtual
//! - fields in declaration order, each at the next offset aligned to its
//!   alignment
//! - size rounded up to the record alignment, empty records have size 1
//! - union members all start at offset 0

use interop_core::{
    FieldEntry, InteropError, Layout, RecordLayout, RecordTag, SemaError, Span, Ty, TypeHandle,
    align_to,
};
use interop_registry::TranslationUnit;

/// Layout of one field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: String,
    pub offset: u64,
    pub size: u64,
}

/// Size, alignment and (for records) field placement of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLayout {
    pub size: u64,
    pub align: u64,
    pub fields: Vec<FieldLayout>,
    pub has_vtable_pointer: bool,
}

/// Layout of `ty`, or `None` when it (or anything it embeds) is incomplete.
pub fn ty_layout(unit: &TranslationUnit, ty: &Ty) -> Option<Layout> {
    match ty {
        Ty::Builtin(kind) => unit.target().builtin_layout(*kind),
        Ty::Record(id) => unit
            .decls()
            .record(*id)
            .and_then(|record| record.layout.as_ref())
            .map(|layout| Layout::new(layout.size, layout.align)),
        Ty::Pointer(_) | Ty::Reference(_) => Some(unit.target().pointer_layout()),
        Ty::Array(element, len) => {
            let element = ty_layout(unit, element)?;
            Some(Layout::new(element.size.checked_mul(*len)?, element.align))
        }
        Ty::Const(inner) => ty_layout(unit, inner),
    }
}

/// Lay out a record with the given (complete) fields.
pub fn record_layout(
    unit: &TranslationUnit,
    tag: RecordTag,
    fields: &[FieldEntry],
    polymorphic: bool,
    span: Span,
) -> Result<RecordLayout, SemaError> {
    let mut offset = 0;
    let mut align = 1;
    if polymorphic {
        let vptr = unit.target().pointer_layout();
        offset = vptr.size;
        align = vptr.align;
    }

    let mut field_offsets = Vec::with_capacity(fields.len());
    for field in fields {
        let layout = ty_layout(unit, &field.ty).ok_or_else(|| SemaError::IncompleteType {
            context: format!("field '{}'", field.name),
            ty: field.ty.display(unit),
            span: field.span,
        })?;
        align = align.max(layout.align);
        if tag == RecordTag::Union {
            field_offsets.push(0);
            offset = offset.max(layout.size);
        } else {
            let at = align_to(offset, layout.align);
            field_offsets.push(at);
            offset = at.checked_add(layout.size).ok_or_else(|| SemaError::ConstEval {
                detail: "record size overflows".to_string(),
                span,
            })?;
        }
    }

    let size = align_to(offset, align).max(1);
    Ok(RecordLayout {
        size,
        align,
        field_offsets,
        has_vtable_pointer: polymorphic,
    })
}

// ==========================================================================
// Handle queries
// ==========================================================================

/// Size in bytes of the complete type behind `handle`.
pub fn size_of(unit: &TranslationUnit, handle: &TypeHandle) -> Result<u64, InteropError> {
    layout_of(unit, handle).map(|layout| layout.size)
}

/// Alignment in bytes of the complete type behind `handle`.
pub fn align_of(unit: &TranslationUnit, handle: &TypeHandle) -> Result<u64, InteropError> {
    layout_of(unit, handle).map(|layout| layout.align)
}

/// Full layout of the complete type behind `handle`.
///
/// Fails with [`InteropError::IncompleteType`] for `void`, class templates,
/// forward-declared records, declared-only specializations and unknown
/// handles.
pub fn layout_of(unit: &TranslationUnit, handle: &TypeHandle) -> Result<TypeLayout, InteropError> {
    let incomplete = || InteropError::IncompleteType {
        name: handle.name().to_string(),
    };
    let ty = handle.ty().ok_or_else(incomplete)?;
    let layout = ty_layout(unit, ty).ok_or_else(incomplete)?;

    let (fields, has_vtable_pointer) = match ty.unqualified() {
        Ty::Record(id) => match unit.decls().record(*id).and_then(|r| Some((r, r.layout.as_ref()?))) {
            Some((record, record_layout)) => {
                let fields = record
                    .fields
                    .iter()
                    .zip(&record_layout.field_offsets)
                    .map(|(field, offset)| FieldLayout {
                        name: field.name.clone(),
                        offset: *offset,
                        size: ty_layout(unit, &field.ty).map_or(0, |l| l.size),
                    })
                    .collect();
                (fields, record_layout.has_vtable_pointer)
            }
            None => return Err(incomplete()),
        },
        _ => (Vec::new(), false),
    };

    Ok(TypeLayout {
        size: layout.size,
        align: layout.align,
        fields,
        has_vtable_pointer,
    })
}
