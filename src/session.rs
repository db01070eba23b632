//! One opened translation unit and the specialization pipeline over it.

use std::path::Path;

use interop_compiler::{
    DEFAULT_MAX_DEPTH, InstantiatedType, IrModule, build_template_arguments_with, canonicalize, emit,
    instantiate, resolve, size_of,
};
use interop_core::{
    BuiltinKind, CanonicalType, FrontendError, InteropError, TargetInfo, TemplateArgument, TypeHandle,
};
use interop_registry::TranslationUnit;

use crate::frontend::{Frontend, GuestFrontend};

/// Knobs for opening and specializing.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub target: TargetInfo,
    /// Nesting limit for instantiations that trigger further instantiations.
    pub max_instantiation_depth: usize,
    /// Type given to integer tokens when building template arguments.
    pub default_integral: BuiltinKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target: TargetInfo::default(),
            max_instantiation_depth: DEFAULT_MAX_DEPTH,
            default_integral: BuiltinKind::Int,
        }
    }
}

/// Everything [`Session::specialize`] produced.
#[derive(Debug, Clone)]
pub struct Specialization {
    /// The class template that was specialized.
    pub target: TypeHandle,
    pub arguments: Vec<TemplateArgument>,
    pub canonical: CanonicalType,
    /// The complete instance.
    pub instance: TypeHandle,
    pub size: u64,
}

/// An opened translation unit.
///
/// Queries borrow the session shared; [`instantiate`](Self::instantiate)
/// and [`specialize`](Self::specialize) borrow it exclusively.
#[derive(Debug)]
pub struct Session {
    unit: TranslationUnit,
    config: SessionConfig,
}

impl Session {
    /// Open `path` with the built-in front end.
    pub fn open(path: impl AsRef<Path>, config: SessionConfig) -> Result<Self, FrontendError> {
        let frontend = GuestFrontend::new(config.target.clone(), config.max_instantiation_depth);
        Self::open_with(&frontend, path, config)
    }

    /// Open `path` with a caller-supplied front end.
    pub fn open_with(
        frontend: &dyn Frontend,
        path: impl AsRef<Path>,
        config: SessionConfig,
    ) -> Result<Self, FrontendError> {
        let unit = frontend.parse_file(path.as_ref())?;
        Ok(Self { unit, config })
    }

    /// Open in-memory source; `name` is used in diagnostics.
    pub fn from_source(name: &str, text: &str, config: SessionConfig) -> Result<Self, FrontendError> {
        let frontend = GuestFrontend::new(config.target.clone(), config.max_instantiation_depth);
        let unit = frontend.parse_source(name, text)?;
        Ok(Self { unit, config })
    }

    pub fn unit(&self) -> &TranslationUnit {
        &self.unit
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Look up a type by name. Misses are `Unknown` handles.
    pub fn resolve(&self, name: &str) -> TypeHandle {
        resolve(&self.unit, name)
    }

    pub fn build_arguments(
        &self,
        target: &TypeHandle,
        tokens: &[&str],
    ) -> Result<Vec<TemplateArgument>, InteropError> {
        build_template_arguments_with(&self.unit, target, tokens, self.config.default_integral)
    }

    pub fn canonicalize(
        &self,
        target: &TypeHandle,
        args: &[TemplateArgument],
    ) -> Result<CanonicalType, InteropError> {
        canonicalize(&self.unit, target, args)
    }

    pub fn instantiate(
        &mut self,
        target: &TypeHandle,
        args: &[TemplateArgument],
    ) -> Result<InstantiatedType, InteropError> {
        instantiate(&mut self.unit, target, args, self.config.max_instantiation_depth)
    }

    pub fn size_of(&self, handle: &TypeHandle) -> Result<u64, InteropError> {
        size_of(&self.unit, handle)
    }

    pub fn emit(&self) -> Result<IrModule, InteropError> {
        emit(&self.unit)
    }

    /// Resolve `symbol`, build `tokens` into arguments, then canonicalize,
    /// instantiate and measure the specialization.
    pub fn specialize(&mut self, symbol: &str, tokens: &[&str]) -> Result<Specialization, InteropError> {
        let _span = tracing::debug_span!("specialize", symbol).entered();
        let target = self.resolve(symbol);
        if !target.is_valid() {
            return Err(InteropError::NotFound {
                name: symbol.to_string(),
            });
        }
        let arguments = self.build_arguments(&target, tokens)?;
        let canonical = self.canonicalize(&target, &arguments)?;
        let instance = self.instantiate(&target, &arguments)?;
        Ok(Specialization {
            target,
            arguments,
            canonical,
            size: instance.size,
            instance: instance.handle,
        })
    }
}
