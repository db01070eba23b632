//! Guest Template Interop
//!
//! Specialize, instantiate and lay out guest-language class templates from a
//! host compiler.
//!
//! ## Example
//!
//! ```
//! use interop::{Session, SessionConfig};
//!
//! let source = r#"
//!     template<class T, int num = 4>
//!     struct Foo {
//!         T innerFoo;
//!         T add(T arg) { return innerFoo + arg; }
//!     };
//! "#;
//!
//! let mut session = Session::from_source("test.h", source, SessionConfig::default()).unwrap();
//! let spec = session.specialize("Foo", &["int", "4"]).unwrap();
//! assert_eq!(spec.canonical.to_string(), "Foo<int, 4>");
//! assert_eq!(spec.size, 4);
//! println!("{}", session.emit().unwrap());
//! ```
//!
//! ## Crates
//!
//! - `interop_core`: shared types, handles and errors
//! - `interop_parser`: lexer and AST for the guest declaration subset
//! - `interop_registry`: the translation unit's declaration arena
//! - `interop_compiler`: analysis, specialization, layout and emission

mod frontend;
mod session;

pub use frontend::{Frontend, GuestFrontend};
pub use session::{Session, SessionConfig, Specialization};

pub use interop_compiler::{DEFAULT_MAX_DEPTH, IrModule, TranslationUnit};
pub use interop_core::{
    BuiltinKind, CanonicalType, FrontendError, InteropError, TargetInfo, TemplateArgument, TypeHandle,
    TypeKind,
};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
