//! Error types for cache backends

use std::fmt::Debug;

use thiserror::Error;

/// Error type for cache lookups, stores and allocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Key falls outside the domain declared when the cache was allocated
    #[error("Key {key} is out of range {bounds}")]
    IndexOutOfRange { key: String, bounds: String },
    /// Declared range has more slots than can be addressed
    #[error("Range {bounds} is too large to allocate")]
    RangeTooLarge { bounds: String },
}

impl CacheError {
    pub(crate) fn out_of_range<K: Debug, B: Debug>(key: &K, bounds: &B) -> Self {
        CacheError::IndexOutOfRange {
            key: format!("{:?}", key),
            bounds: format!("{:?}", bounds),
        }
    }

    pub(crate) fn too_large<B: Debug>(bounds: &B) -> Self {
        CacheError::RangeTooLarge {
            bounds: format!("{:?}", bounds),
        }
    }
}
