//! Class template support: argument building, canonicalization and
//! instantiation.
//!
//! # Flow
//!
//! ```text
//! tokens ──build_template_arguments──▶ [TemplateArgument]
//!        ──canonicalize──────────────▶ CanonicalType      (pure)
//!        ──instantiate───────────────▶ InstantiatedType   (mutates the unit)
//! ```

mod args;
mod canonical;
mod const_eval;
mod instantiation;
mod substitution;

pub use args::{TypeLookup, build_template_arguments, build_template_arguments_with};
pub use canonical::canonicalize;
pub use instantiation::{DEFAULT_MAX_DEPTH, InstantiatedType, Instantiator, instantiate};
pub use substitution::Require;
