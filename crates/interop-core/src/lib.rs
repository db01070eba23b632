//! Shared types for guest template interop.
//!
//! This crate holds everything the parser, the declaration registry and the
//! compiler agree on:
//!
//! - [`TypeHash`] - deterministic identities for types and specializations
//! - [`Ty`] / [`PatternType`] - concrete and template-dependent types
//! - [`Decl`] and the entry types - what a translation unit declares
//! - [`TypeHandle`] / [`TemplateArgument`] - what name resolution hands out
//! - [`CanonicalType`] - the canonical descriptor of a specialization
//! - [`TargetInfo`] - the platform model behind layout and emission
//! - Error types for every phase

pub mod builtin;
pub mod canonical;
pub mod entries;
pub mod error;
pub mod handle;
pub mod ops;
pub mod pattern;
pub mod span;
pub mod stack;
pub mod target;
pub mod ty;
pub mod type_hash;

pub use builtin::BuiltinKind;
pub use canonical::{CanonicalArg, CanonicalType, format_value};
pub use entries::*;
pub use error::{
    FrontendError, InteropError, LexError, ParseError, ParseErrorKind, ParseErrors, SemaError,
    SemaErrors,
};
pub use handle::{TemplateArgument, TypeHandle, TypeKind};
pub use ops::{BinaryOp, UnaryOp};
pub use pattern::{PatternArg, PatternExpr, PatternType};
pub use span::{SourceLocation, Span, source_location};
pub use stack::ensure_sufficient_stack;
pub use target::{Layout, TargetInfo, align_to};
pub use ty::{DeclId, DeclNames, QualifiedName, Ty};
pub use type_hash::{TypeHash, hash_constants};
