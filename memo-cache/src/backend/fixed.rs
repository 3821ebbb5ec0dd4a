use std::marker::PhantomData;

use tracing::debug;

use super::Cache;
use crate::error::CacheError;
use crate::slot::{Packed, Sentinel, Slot};

/// A preallocated cache for `usize` keys in `0..capacity`.
///
/// The whole vector is allocated once; keys at or beyond `capacity` fail with
/// [`CacheError::IndexOutOfRange`].
#[derive(Debug, Clone)]
pub struct FixedCache<V, S = Option<V>> {
    slots: Vec<S>,
    _phantom: PhantomData<V>,
}

/// A [`FixedCache`] storing raw values with a sentinel for empty slots.
///
/// Only correct if the memoized function never returns the sentinel of `V`.
pub type PackedFixedCache<V> = FixedCache<V, Packed<V>>;

impl<V: Clone> FixedCache<V> {
    /// Allocates `capacity` empty slots for keys `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self::allocate(capacity)
    }
}

impl<V: Sentinel> PackedFixedCache<V> {
    /// Allocates `capacity` sentinel-coded slots for keys `0..capacity`.
    pub fn packed(capacity: usize) -> Self {
        Self::allocate(capacity)
    }
}

impl<V, S: Slot<V>> FixedCache<V, S> {
    /// Allocates `capacity` empty slots with any slot representation.
    pub fn allocate(capacity: usize) -> Self {
        debug!(backend = "fixed", capacity, "allocating cache");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, S::vacant);
        Self {
            slots,
            _phantom: PhantomData,
        }
    }

    /// Number of slots, filled or not.
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

    fn slot_index(&self, key: usize) -> Result<usize, CacheError> {
        if key < self.slots.len() {
            Ok(key)
        } else {
            Err(CacheError::out_of_range(&key, &(0..self.slots.len())))
        }
    }
}

impl<V, S: Slot<V>> Cache for FixedCache<V, S> {
    type Key = usize;
    type Value = V;

    fn lookup(&self, key: &usize) -> Result<Option<V>, CacheError> {
        let index = self.slot_index(*key)?;
        Ok(self.slots[index].load())
    }

    fn store(&mut self, key: usize, value: V) -> Result<(), CacheError> {
        let index = self.slot_index(key)?;
        self.slots[index] = S::filled(value);
        Ok(())
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_vacant()).count()
    }

    fn contains(&self, key: &usize) -> Result<bool, CacheError> {
        let index = self.slot_index(*key)?;
        Ok(!self.slots[index].is_vacant())
    }
}
