//! Guest Template Compiler
//!
//! Turns parsed guest declarations into a [`TranslationUnit`] and drives
//! class template specialization on it.
//!
//! ## Architecture
//!
//! - **Analysis**: [`analyze`] elaborates a parsed file into the unit's
//!   declaration arena, keeping class templates as uninstantiated patterns
//! - **Specialization**: [`build_template_arguments`] turns host tokens into
//!   arguments, [`canonicalize`] describes the specialization without side
//!   effects and [`instantiate`] materializes it transactionally
//! - **Queries**: [`size_of`] / [`layout_of`] and [`emit`] read the unit
//!
//! ## Modules
//!
//! - [`emit`]: IR module lowering and Itanium name mangling
//! - [`layout`]: size, alignment and field offsets
//! - [`resolver`]: name to [`TypeHandle`](interop_core::TypeHandle) resolution
//! - [`sema`]: declaration-level semantic analysis
//! - [`template`]: argument building, canonicalization and instantiation

pub mod emit;
pub mod layout;
pub mod resolver;
pub mod sema;
pub mod template;

pub use emit::{IrFunction, IrModule, IrStruct, emit};
pub use layout::{FieldLayout, TypeLayout, align_of, layout_of, size_of};
pub use resolver::resolve;
pub use sema::analyze;
pub use template::{
    DEFAULT_MAX_DEPTH, InstantiatedType, TypeLookup, build_template_arguments,
    build_template_arguments_with, canonicalize, instantiate,
};

pub use interop_registry::TranslationUnit;
