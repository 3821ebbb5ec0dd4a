//! Storage backends for memoization.
//!
//! Every backend implements [`Cache`], so the memoize combinator works the
//! same way over all of them:
//!
//! - [`HashMapCache`]: arbitrary hashable keys, grows on demand, never out of range
//! - [`DenseCache`]: integer or tuple keys inside a declared inclusive range
//! - [`FixedCache`]: `usize` keys in `0..capacity`, allocated once
//! - [`ExpandableCache`]: `usize` keys with no upper bound, doubles to fit
//! - [`DynCache`]: one of the above for `usize` keys, picked at runtime from a
//!   [`BackendConfig`](crate::BackendConfig)
//!
//! The vector-based backends take a slot type parameter `S` that defaults to
//! `Option<V>`. Passing [`Packed<V>`](crate::Packed) instead stores raw values
//! with a sentinel marking empty slots; see [`crate::slot`] for the hazard.

mod dense;
mod dynamic;
mod expandable;
mod fixed;
mod hash_map;

pub use dense::{DenseCache, PackedDenseCache};
pub use dynamic::DynCache;
pub use expandable::{ExpandableCache, PackedExpandableCache};
pub use fixed::{FixedCache, PackedFixedCache};
pub use hash_map::HashMapCache;

use crate::error::CacheError;

/// The capability every cache backend provides.
///
/// # Contract
///
/// - `lookup` never changes what is stored
/// - `store` overwrites any previous entry for the key (last write wins)
/// - bounds-checked backends fail both operations with
///   [`CacheError::IndexOutOfRange`] for keys outside their domain; the others
///   never fail
pub trait Cache {
    /// Key type addressing an entry.
    type Key;
    /// Value type held by every entry.
    type Value;

    /// Returns the value stored for `key`, or `None` if nothing is stored yet.
    fn lookup(&self, key: &Self::Key) -> Result<Option<Self::Value>, CacheError>;

    /// Stores `value` for `key`, replacing any earlier value.
    fn store(&mut self, key: Self::Key, value: Self::Value) -> Result<(), CacheError>;

    /// Number of keys holding a value.
    fn len(&self) -> usize;

    /// Returns `true` if no key holds a value.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if a value is stored for `key`.
    fn contains(&self, key: &Self::Key) -> Result<bool, CacheError> {
        Ok(self.lookup(key)?.is_some())
    }
}
