//! Front ends: turning guest source into a [`TranslationUnit`].

use std::path::Path;

use bumpalo::Bump;
use interop_compiler::{DEFAULT_MAX_DEPTH, analyze};
use interop_core::{FrontendError, TargetInfo};
use interop_parser::Parser;
use interop_registry::TranslationUnit;

/// Produces translation units from guest source.
pub trait Frontend {
    /// Parse and analyze `text`, reporting locations against `name`.
    fn parse_source(&self, name: &str, text: &str) -> Result<TranslationUnit, FrontendError>;

    /// Read `path` and parse it.
    fn parse_file(&self, path: &Path) -> Result<TranslationUnit, FrontendError> {
        let text = std::fs::read_to_string(path).map_err(|source| FrontendError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_source(&path.display().to_string(), &text)
    }
}

/// The built-in front end for the guest declaration subset.
#[derive(Debug, Clone)]
pub struct GuestFrontend {
    target: TargetInfo,
    max_depth: usize,
}

impl GuestFrontend {
    pub fn new(target: TargetInfo, max_depth: usize) -> Self {
        Self { target, max_depth }
    }
}

impl Default for GuestFrontend {
    fn default() -> Self {
        Self::new(TargetInfo::default(), DEFAULT_MAX_DEPTH)
    }
}

impl Frontend for GuestFrontend {
    fn parse_source(&self, name: &str, text: &str) -> Result<TranslationUnit, FrontendError> {
        let _span = tracing::debug_span!("frontend", file = name).entered();
        let arena = Bump::new();
        let ast = Parser::parse(text, &arena).map_err(|errors| FrontendError::Parse {
            file: name.to_string(),
            errors,
        })?;
        let unit = analyze(name, &ast, self.target.clone(), self.max_depth).map_err(|errors| {
            FrontendError::Sema {
                file: name.to_string(),
                errors,
            }
        })?;
        tracing::debug!(decls = unit.decl_count(), "translation unit opened");
        Ok(unit)
    }
}
