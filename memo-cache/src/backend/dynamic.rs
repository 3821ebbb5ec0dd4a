use super::{Cache, DenseCache, ExpandableCache, FixedCache, HashMapCache};
use crate::error::CacheError;
use crate::slot::Slot;

/// A `usize`-keyed cache whose backend is chosen at runtime.
///
/// Built from a [`BackendConfig`](crate::BackendConfig). Every call is a
/// `match` and a delegation, so the behavior of each variant, bounds
/// failures included, is exactly that of the wrapped backend.
#[derive(Debug, Clone)]
pub enum DynCache<V, S = Option<V>> {
    HashMap(HashMapCache<usize, V>),
    Dense(DenseCache<usize, V, S>),
    Fixed(FixedCache<V, S>),
    Expandable(ExpandableCache<V, S>),
}

impl<V, S> DynCache<V, S> {
    /// Short backend name, as used in log events.
    pub fn backend_name(&self) -> &'static str {
        match self {
            DynCache::HashMap(_) => "hash_map",
            DynCache::Dense(_) => "dense",
            DynCache::Fixed(_) => "fixed",
            DynCache::Expandable(_) => "expandable",
        }
    }
}

impl<V: Clone, S: Slot<V>> Cache for DynCache<V, S> {
    type Key = usize;
    type Value = V;

    fn lookup(&self, key: &usize) -> Result<Option<V>, CacheError> {
        match self {
            DynCache::HashMap(cache) => cache.lookup(key),
            DynCache::Dense(cache) => cache.lookup(key),
            DynCache::Fixed(cache) => cache.lookup(key),
            DynCache::Expandable(cache) => cache.lookup(key),
        }
    }

    fn store(&mut self, key: usize, value: V) -> Result<(), CacheError> {
        match self {
            DynCache::HashMap(cache) => cache.store(key, value),
            DynCache::Dense(cache) => cache.store(key, value),
            DynCache::Fixed(cache) => cache.store(key, value),
            DynCache::Expandable(cache) => cache.store(key, value),
        }
    }

    fn len(&self) -> usize {
        match self {
            DynCache::HashMap(cache) => cache.len(),
            DynCache::Dense(cache) => cache.len(),
            DynCache::Fixed(cache) => cache.len(),
            DynCache::Expandable(cache) => cache.len(),
        }
    }

    fn contains(&self, key: &usize) -> Result<bool, CacheError> {
        match self {
            DynCache::HashMap(cache) => cache.contains(key),
            DynCache::Dense(cache) => cache.contains(key),
            DynCache::Fixed(cache) => cache.contains(key),
            DynCache::Expandable(cache) => cache.contains(key),
        }
    }
}
