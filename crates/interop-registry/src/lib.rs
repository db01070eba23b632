//! Declaration storage for guest translation units.
//!
//! This crate provides:
//! - [`DeclArena`] - append-only declaration storage with name/hash indexes
//!   and transactional rollback
//! - [`TemplateInstanceCache`] - deduplication of class template instances
//! - [`TranslationUnit`] - one source file's arena, cache and target

mod arena;
mod cache;
mod unit;

pub use arena::{Checkpoint, DeclArena};
pub use cache::TemplateInstanceCache;
pub use unit::TranslationUnit;
