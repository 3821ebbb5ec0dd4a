//! Runtime backend selection

use std::fmt;

use crate::backend::{DenseCache, DynCache, ExpandableCache, FixedCache, HashMapCache};
use crate::error::CacheError;
use crate::slot::Slot;

/// Which backend to allocate for a `usize`-keyed computation, and how to size it.
///
/// # Example
///
/// ```rust
/// use memo_cache::{BackendConfig, Cache, CacheError, DynCache};
///
/// let config = BackendConfig::Fixed { capacity: 8 };
/// let mut cache: DynCache<u64> = config.build()?;
/// cache.store(7, 13)?;
/// assert!(cache.store(8, 21).is_err());
/// assert_eq!(config.to_string(), "fixed(capacity = 8)");
/// # Ok::<(), CacheError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendConfig {
    /// Hash map, starts empty.
    #[default]
    HashMap,
    /// Dense array over the inclusive key range `lo..=hi`.
    Dense { lo: usize, hi: usize },
    /// Preallocated vector for keys `0..capacity`.
    Fixed { capacity: usize },
    /// Growable vector; `None` uses [`ExpandableCache::DEFAULT_CAPACITY`].
    Expandable { initial_capacity: Option<usize> },
}

impl BackendConfig {
    /// Allocates the configured backend.
    ///
    /// # Errors
    ///
    /// [`CacheError::RangeTooLarge`] for a dense range that cannot be allocated.
    pub fn build<V, S>(&self) -> Result<DynCache<V, S>, CacheError>
    where
        V: Clone,
        S: Slot<V>,
    {
        Ok(match *self {
            BackendConfig::HashMap => DynCache::HashMap(HashMapCache::new()),
            BackendConfig::Dense { lo, hi } => DynCache::Dense(DenseCache::allocate(lo, hi)?),
            BackendConfig::Fixed { capacity } => DynCache::Fixed(FixedCache::allocate(capacity)),
            BackendConfig::Expandable { initial_capacity } => DynCache::Expandable(
                ExpandableCache::allocate(
                    initial_capacity.unwrap_or(ExpandableCache::<V, S>::DEFAULT_CAPACITY),
                ),
            ),
        })
    }
}

impl fmt::Display for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendConfig::HashMap => write!(f, "hash_map"),
            BackendConfig::Dense { lo, hi } => write!(f, "dense({}..={})", lo, hi),
            BackendConfig::Fixed { capacity } => write!(f, "fixed(capacity = {})", capacity),
            BackendConfig::Expandable {
                initial_capacity: Some(capacity),
            } => write!(f, "expandable(capacity = {})", capacity),
            BackendConfig::Expandable {
                initial_capacity: None,
            } => write!(f, "expandable"),
        }
    }
}
