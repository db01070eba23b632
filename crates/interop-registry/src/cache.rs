//! Template instance cache.
//!
//! Maps a class template and its canonical argument hashes to the record
//! that represents the instance, so equal argument lists always reach the
//! same declaration.

use interop_core::{DeclId, TypeHash};
use rustc_hash::FxHashMap;

/// Cache for class template instances.
///
/// Maps (template_hash, arg_hashes) → instance record. Entries are added
/// when an instance is first declared, whether it is completed right away
/// or only named through a pointer.
#[derive(Debug, Default, Clone)]
pub struct TemplateInstanceCache {
    instances: FxHashMap<(TypeHash, Vec<TypeHash>), DeclId>,
}

impl TemplateInstanceCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance.
    pub fn cache_instance(&mut self, template: TypeHash, args: Vec<TypeHash>, instance: DeclId) {
        self.instances.insert((template, args), instance);
    }

    /// Look up a cached instance.
    pub fn get_instance(&self, template: TypeHash, args: &[TypeHash]) -> Option<DeclId> {
        self.instances.get(&(template, args.to_vec())).copied()
    }

    /// Get the number of cached instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Drop every entry whose instance lies at or beyond `len`; used when
    /// the declaration arena is rolled back to `len` declarations.
    pub fn purge_from(&mut self, len: usize) {
        self.instances.retain(|_, instance| instance.index() < len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> TypeHash {
        TypeHash::from_name("int")
    }

    #[test]
    fn cache_new_is_empty() {
        let cache = TemplateInstanceCache::new();
        assert_eq!(cache.instance_count(), 0);
    }

    #[test]
    fn cache_instance() {
        let mut cache = TemplateInstanceCache::new();
        let foo = TypeHash::from_name("Foo");

        cache.cache_instance(foo, vec![int()], DeclId::new(1));

        assert_eq!(cache.get_instance(foo, &[int()]), Some(DeclId::new(1)));
        assert_eq!(cache.instance_count(), 1);
    }

    #[test]
    fn cache_instance_different_args() {
        let mut cache = TemplateInstanceCache::new();
        let foo = TypeHash::from_name("Foo");
        let double = TypeHash::from_name("double");

        cache.cache_instance(foo, vec![int()], DeclId::new(1));
        cache.cache_instance(foo, vec![double], DeclId::new(2));

        assert_eq!(cache.get_instance(foo, &[int()]), Some(DeclId::new(1)));
        assert_eq!(cache.get_instance(foo, &[double]), Some(DeclId::new(2)));
        assert_eq!(cache.instance_count(), 2);
    }

    #[test]
    fn argument_order_matters() {
        let mut cache = TemplateInstanceCache::new();
        let pair = TypeHash::from_name("Pair");
        let double = TypeHash::from_name("double");

        cache.cache_instance(pair, vec![int(), double], DeclId::new(3));
        assert_eq!(cache.get_instance(pair, &[double, int()]), None);
    }

    #[test]
    fn purge_drops_rolled_back_instances() {
        let mut cache = TemplateInstanceCache::new();
        let foo = TypeHash::from_name("Foo");
        let char_ = TypeHash::from_name("char");

        cache.cache_instance(foo, vec![int()], DeclId::new(1));
        cache.cache_instance(foo, vec![char_], DeclId::new(4));
        cache.purge_from(3);

        assert_eq!(cache.get_instance(foo, &[int()]), Some(DeclId::new(1)));
        assert_eq!(cache.get_instance(foo, &[char_]), None);
        assert_eq!(cache.instance_count(), 1);
    }
}
