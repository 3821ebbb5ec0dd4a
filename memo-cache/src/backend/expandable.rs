use std::marker::PhantomData;

use tracing::{debug, trace};

use super::Cache;
use crate::error::CacheError;
use crate::slot::{Packed, Sentinel, Slot};

/// A vector cache for `usize` keys with no fixed upper bound.
///
/// It starts with a small number of slots and doubles whenever a key at or
/// beyond the current capacity is stored. Growth only appends empty slots, so
/// every entry stored before keeps its value. Lookups never grow the cache:
/// a key beyond the current capacity simply reads as absent.
///
/// # Example
///
/// ```rust
/// use memo_cache::{Cache, CacheError, ExpandableCache};
///
/// let mut cache: ExpandableCache<u32> = ExpandableCache::with_capacity(4);
/// cache.store(9, 81)?;
/// assert_eq!(cache.capacity(), 16);
/// assert_eq!(cache.lookup(&9)?, Some(81));
/// assert_eq!(cache.lookup(&1_000)?, None);
/// # Ok::<(), CacheError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ExpandableCache<V, S = Option<V>> {
    slots: Vec<S>,
    _phantom: PhantomData<V>,
}

/// An [`ExpandableCache`] storing raw values with a sentinel for empty slots.
///
/// Only correct if the memoized function never returns the sentinel of `V`.
pub type PackedExpandableCache<V> = ExpandableCache<V, Packed<V>>;

impl<V: Clone> ExpandableCache<V> {
    /// Creates a cache with [`DEFAULT_CAPACITY`](Self::DEFAULT_CAPACITY) empty slots.
    pub fn new() -> Self {
        Self::allocate(Self::DEFAULT_CAPACITY)
    }

    /// Creates a cache with `capacity` empty slots.
    ///
    /// Zero is allowed; the first store then grows the cache.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::allocate(capacity)
    }
}

impl<V: Sentinel> PackedExpandableCache<V> {
    /// Creates a sentinel-coded cache with [`DEFAULT_CAPACITY`](Self::DEFAULT_CAPACITY) slots.
    pub fn packed() -> Self {
        Self::allocate(Self::DEFAULT_CAPACITY)
    }

    /// Creates a sentinel-coded cache with `capacity` slots.
    pub fn packed_with_capacity(capacity: usize) -> Self {
        Self::allocate(capacity)
    }
}

impl<V, S: Slot<V>> ExpandableCache<V, S> {
    /// Number of slots allocated by [`ExpandableCache::new`].
    pub const DEFAULT_CAPACITY: usize = 16;

    /// Creates a cache with `capacity` empty slots and any slot representation.
    pub fn allocate(capacity: usize) -> Self {
        debug!(backend = "expandable", capacity, "allocating cache");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, S::vacant);
        Self {
            slots,
            _phantom: PhantomData,
        }
    }

    /// Number of slots currently allocated, filled or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over the filled entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, V)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(key, slot)| slot.load().map(|value| (key, value)))
    }

    /// Consumes the cache and returns every slot decoded, in key order.
    pub fn into_values(self) -> Vec<Option<V>> {
        self.slots.iter().map(|slot| slot.load()).collect()
    }

    /// Consumes the cache and returns its raw slot storage.
    pub fn into_slots(self) -> Vec<S> {
        self.slots
    }

    /// Doubles the slot count until `key` fits.
    fn grow_to_fit(&mut self, key: usize) {
        let old_capacity = self.slots.len();
        let mut new_capacity = old_capacity.max(1);
        while new_capacity <= key {
            new_capacity = new_capacity.saturating_mul(2);
            if new_capacity == usize::MAX {
                break;
            }
        }
        trace!(old_capacity, new_capacity, key, "growing expandable cache");
        self.slots.resize_with(new_capacity, S::vacant);
    }
}

impl<V: Clone> Default for ExpandableCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S: Slot<V>> Cache for ExpandableCache<V, S> {
    type Key = usize;
    type Value = V;

    fn lookup(&self, key: &usize) -> Result<Option<V>, CacheError> {
        Ok(self.slots.get(*key).and_then(|slot| slot.load()))
    }

    fn store(&mut self, key: usize, value: V) -> Result<(), CacheError> {
        if key >= self.slots.len() {
            self.grow_to_fit(key);
        }
        self.slots[key] = S::filled(value);
        Ok(())
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_vacant()).count()
    }

    fn contains(&self, key: &usize) -> Result<bool, CacheError> {
        Ok(self.slots.get(*key).is_some_and(|slot| !slot.is_vacant()))
    }
}
