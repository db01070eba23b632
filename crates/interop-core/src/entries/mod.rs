//! Declaration entries stored in a translation unit's arena.
//!
//! - [`Decl`] - Unified enum wrapping every entry kind
//! - [`RecordEntry`] - Structs, classes and unions, including template instances
//! - [`ClassTemplateEntry`] - Class templates with their parameter list and pattern
//! - [`AliasEntry`] - `using`/`typedef` aliases
//! - [`FunctionEntry`] - Free function declarations and definitions

mod alias;
mod decl;
mod function;
mod record;
mod template;

pub use alias::AliasEntry;
pub use decl::Decl;
pub use function::FunctionEntry;
pub use record::{
    FieldEntry, MethodEntry, MethodKind, RecordEntry, RecordFlags, RecordLayout, RecordTag,
    SpecializationInfo,
};
pub use template::{
    ClassTemplateEntry, FieldPattern, MethodPattern, RecordPattern, StaticAssertPattern,
    TemplateParamEntry, TemplateParamKind,
};
