use std::marker::PhantomData;

use tracing::debug;

use super::Cache;
use crate::error::CacheError;
use crate::index::DenseIndex;
use crate::slot::{Packed, Sentinel, Slot};

/// A cache over a declared inclusive key range `lo..=hi`.
///
/// All slots are allocated up front, so lookups and stores are a bounds check
/// and an index. Keys may be integers or tuples of integers (see
/// [`DenseIndex`]). A key outside the range fails with
/// [`CacheError::IndexOutOfRange`].
///
/// # Example
///
/// ```rust
/// use memo_cache::{Cache, CacheError, DenseCache};
///
/// let mut cache: DenseCache<(i32, i32), u64> = DenseCache::new((-1, 0), (1, 4))?;
/// cache.store((-1, 4), 7)?;
/// assert_eq!(cache.lookup(&(-1, 4))?, Some(7));
/// assert_eq!(cache.lookup(&(0, 0))?, None);
/// assert!(cache.lookup(&(2, 0)).is_err());
/// # Ok::<(), CacheError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DenseCache<K, V, S = Option<V>> {
    lo: K,
    hi: K,
    slots: Vec<S>,
    _phantom: PhantomData<V>,
}

/// A [`DenseCache`] storing raw values with a sentinel for empty slots.
///
/// Only correct if the memoized function never returns the sentinel of `V`.
pub type PackedDenseCache<K, V> = DenseCache<K, V, Packed<V>>;

impl<K: DenseIndex, V: Clone> DenseCache<K, V> {
    /// Allocates a cache covering every key in `lo..=hi`.
    ///
    /// An empty range (`lo > hi`) is accepted; every key is then out of range.
    ///
    /// # Errors
    ///
    /// [`CacheError::RangeTooLarge`] if the range has more keys than `usize` can count.
    pub fn new(lo: K, hi: K) -> Result<Self, CacheError> {
        Self::allocate(lo, hi)
    }
}

impl<K: DenseIndex, V: Sentinel> PackedDenseCache<K, V> {
    /// Allocates a sentinel-coded cache covering every key in `lo..=hi`.
    ///
    /// # Errors
    ///
    /// [`CacheError::RangeTooLarge`] if the range has more keys than `usize` can count.
    pub fn packed(lo: K, hi: K) -> Result<Self, CacheError> {
        Self::allocate(lo, hi)
    }
}

impl<K: DenseIndex, V, S: Slot<V>> DenseCache<K, V, S> {
    /// Allocates a cache covering `lo..=hi` with any slot representation.
    pub fn allocate(lo: K, hi: K) -> Result<Self, CacheError> {
        let size = K::range_size(lo, hi).ok_or_else(|| CacheError::too_large(&(lo..=hi)))?;
        debug!(backend = "dense", ?lo, ?hi, size, "allocating cache");

        let mut slots = Vec::with_capacity(size);
        slots.resize_with(size, S::vacant);
        Ok(Self {
            lo,
            hi,
            slots,
            _phantom: PhantomData,
        })
    }

    /// The declared inclusive bounds.
    pub fn bounds(&self) -> (K, K) {
        (self.lo, self.hi)
    }

    /// Number of slots, filled or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over the filled entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.slots.iter().enumerate().filter_map(|(offset, slot)| {
            slot.load()
                .map(|value| (K::from_offset(self.lo, self.hi, offset), value))
        })
    }

    /// Consumes the cache and returns every slot decoded, in key order.
    pub fn into_values(self) -> Vec<Option<V>> {
        self.slots.iter().map(|slot| slot.load()).collect()
    }

    /// Consumes the cache and returns its raw slot storage.
    pub fn into_slots(self) -> Vec<S> {
        self.slots
    }

    fn offset(&self, key: &K) -> Result<usize, CacheError> {
        K::offset(self.lo, self.hi, *key)
            .ok_or_else(|| CacheError::out_of_range(key, &(self.lo..=self.hi)))
    }
}

impl<K: DenseIndex, V, S: Slot<V>> Cache for DenseCache<K, V, S> {
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Result<Option<V>, CacheError> {
        let offset = self.offset(key)?;
        Ok(self.slots[offset].load())
    }

    fn store(&mut self, key: K, value: V) -> Result<(), CacheError> {
        let offset = self.offset(&key)?;
        self.slots[offset] = S::filled(value);
        Ok(())
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_vacant()).count()
    }

    fn contains(&self, key: &K) -> Result<bool, CacheError> {
        let offset = self.offset(key)?;
        Ok(!self.slots[offset].is_vacant())
    }
}
