//! TranslationUnit - one parsed guest source file and everything derived
//! from it.

use interop_core::{
    ClassTemplateEntry, Decl, DeclId, DeclNames, TargetInfo, TypeHash,
};

use crate::{Checkpoint, DeclArena, TemplateInstanceCache};

/// A guest translation unit: its declaration arena, the instances created
/// from its class templates, and the target it is laid out for.
///
/// Readers take `&TranslationUnit`; only instantiation needs `&mut`.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    file: String,
    target: TargetInfo,
    decls: DeclArena,
    cache: TemplateInstanceCache,
}

impl TranslationUnit {
    pub fn new(file: impl Into<String>, target: TargetInfo) -> Self {
        Self {
            file: file.into(),
            target,
            decls: DeclArena::new(),
            cache: TemplateInstanceCache::new(),
        }
    }

    /// Name of the source file the unit was parsed from.
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn target(&self) -> &TargetInfo {
        &self.target
    }

    pub fn decls(&self) -> &DeclArena {
        &self.decls
    }

    pub fn decls_mut(&mut self) -> &mut DeclArena {
        &mut self.decls
    }

    pub fn cache(&self) -> &TemplateInstanceCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TemplateInstanceCache {
        &mut self.cache
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    /// Find a type declaration by exact qualified name.
    pub fn lookup(&self, name: &str) -> Option<DeclId> {
        self.decls.lookup(name)
    }

    pub fn decl(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id)
    }

    pub fn class_template(&self, id: DeclId) -> Option<&ClassTemplateEntry> {
        self.decl(id).and_then(Decl::as_class_template)
    }

    /// Number of declarations, including instances.
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    // ==========================================================================
    // Transactions
    // ==========================================================================

    pub fn checkpoint(&mut self) -> Checkpoint {
        self.decls.checkpoint()
    }

    pub fn commit(&mut self, checkpoint: Checkpoint) {
        self.decls.commit(checkpoint);
    }

    /// Roll the arena back and drop cache entries for removed instances.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.decls.rollback(checkpoint);
        self.cache.purge_from(checkpoint.decl_count());
    }
}

impl DeclNames for TranslationUnit {
    fn decl_name(&self, id: DeclId) -> String {
        self.decls.decl_name(id)
    }

    fn decl_hash(&self, id: DeclId) -> TypeHash {
        self.decls.decl_hash(id)
    }
}
