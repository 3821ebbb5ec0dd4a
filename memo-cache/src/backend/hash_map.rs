use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use super::Cache;
use crate::error::CacheError;

/// A HashMap-based cache for arbitrary hashable keys.
///
/// This backend supports any key type that implements `Hash + Eq`.
/// It is suitable for sparse keys or non-integer key types, and it keeps an
/// explicit presence flag, so every value of `V` can be cached safely.
#[derive(Debug, Clone)]
pub struct HashMapCache<K, V> {
    data: HashMap<K, V>,
}

impl<K, V> HashMapCache<K, V> {
    /// Creates a new empty HashMapCache.
    pub fn new() -> Self {
        debug!(backend = "hash_map", "allocating cache");
        Self {
            data: HashMap::new(),
        }
    }

    /// Creates a new HashMapCache with room for `capacity` entries before rehashing.
    pub fn with_capacity(capacity: usize) -> Self {
        debug!(backend = "hash_map", capacity, "allocating cache");
        Self {
            data: HashMap::with_capacity(capacity),
        }
    }

    /// Iterates over the stored entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.data.iter()
    }

    /// Consumes the cache and returns its entries.
    pub fn into_inner(self) -> HashMap<K, V> {
        self.data
    }
}

impl<K, V> Default for HashMapCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V: Clone> Cache for HashMapCache<K, V> {
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Result<Option<V>, CacheError> {
        Ok(self.data.get(key).cloned())
    }

    fn store(&mut self, key: K, value: V) -> Result<(), CacheError> {
        self.data.insert(key, value);
        Ok(())
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn contains(&self, key: &K) -> Result<bool, CacheError> {
        Ok(self.data.contains_key(key))
    }
}
