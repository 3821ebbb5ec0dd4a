//! Memoization of recursive functions over pluggable caches
//!
//! This crate turns an ordinary recursive function into one that computes each
//! distinct input at most once. The function takes a [`Memo`] context as its
//! first argument and routes its recursive calls through [`Memo::memo`]; the
//! context owns the cache for the whole evaluation.
//!
//! # Cache Types
//!
//! - [`HashMapCache`]: any `Hash + Eq` key, no sizing needed
//! - [`DenseCache`]: integer or tuple keys inside a declared inclusive range
//! - [`FixedCache`]: `usize` keys in `0..capacity`, one allocation
//! - [`ExpandableCache`]: `usize` keys with no upper bound, grows by doubling
//! - [`DynCache`]: any of the above for `usize` keys, chosen by a [`BackendConfig`]
//!
//! All of them implement the [`Cache`] trait. The vector-based ones store
//! `Option<V>` slots by default; their `Packed*` variants store raw values and
//! reserve a [`Sentinel`] value for "empty" instead.
//!
//! # Warning: Cycle Behavior
//!
//! **There is no cycle detection.** If computing a key needs that same key
//! before it is stored, the evaluation recurses until the stack overflows.
//!
//! **Users MUST ensure the recurrence is well-founded.**
//!
//! # Warning: Sentinel Collisions
//!
//! A packed cache cannot store its sentinel. If the function returns it, the
//! entry reads back as missing and is recomputed. Use the default `Option`
//! slots unless the sentinel provably never occurs.
//!
//! # Example: Fixed-capacity Fibonacci
//!
//! ```rust
//! use memo_cache::{eval_fixed, CacheError, FixedCache, Memo};
//!
//! fn fib(ctx: &mut Memo<FixedCache<u64>>, n: usize) -> Result<u64, CacheError> {
//!     if n <= 1 {
//!         return Ok(n as u64);
//!     }
//!     Ok(ctx.memo(fib, n - 1)? + ctx.memo(fib, n - 2)?)
//! }
//!
//! let value = eval_fixed(51, |ctx| ctx.memo(fib, 50))?;
//! assert_eq!(value, 12_586_269_025);
//! # Ok::<(), CacheError>(())
//! ```
//!
//! # Example: Tuple keys in a Dense cache
//!
//! Longest common subsequence, keyed by positions in both inputs:
//!
//! ```rust
//! use memo_cache::{eval_dense, CacheError, DenseCache, Memo};
//!
//! fn lcs(a: &[u8], b: &[u8]) -> Result<usize, CacheError> {
//!     fn go(
//!         ctx: &mut Memo<DenseCache<(usize, usize), usize>>,
//!         a: &[u8],
//!         b: &[u8],
//!         (i, j): (usize, usize),
//!     ) -> Result<usize, CacheError> {
//!         if i == a.len() || j == b.len() {
//!             return Ok(0);
//!         }
//!         if a[i] == b[j] {
//!             return Ok(1 + ctx.memo(|ctx, k| go(ctx, a, b, k), (i + 1, j + 1))?);
//!         }
//!         let skip_a = ctx.memo(|ctx, k| go(ctx, a, b, k), (i + 1, j))?;
//!         let skip_b = ctx.memo(|ctx, k| go(ctx, a, b, k), (i, j + 1))?;
//!         Ok(skip_a.max(skip_b))
//!     }
//!
//!     eval_dense((0, 0), (a.len(), b.len()), |ctx| go(ctx, a, b, (0, 0)))
//! }
//!
//! assert_eq!(lcs(b"ABCBDAB", b"BDCABA")?, 4);
//! # Ok::<(), CacheError>(())
//! ```
//!
//! # Example: Backend chosen at runtime
//!
//! ```rust
//! use memo_cache::{BackendConfig, Cache, CacheError, Memo};
//!
//! fn stairs<C>(ctx: &mut Memo<C>, n: usize) -> Result<u64, CacheError>
//! where
//!     C: Cache<Key = usize, Value = u64>,
//! {
//!     match n {
//!         0 | 1 => Ok(1),
//!         _ => Ok(ctx.memo(stairs, n - 1)? + ctx.memo(stairs, n - 2)?),
//!     }
//! }
//!
//! for config in [
//!     BackendConfig::HashMap,
//!     BackendConfig::Dense { lo: 0, hi: 30 },
//!     BackendConfig::Fixed { capacity: 31 },
//!     BackendConfig::Expandable { initial_capacity: Some(2) },
//! ] {
//!     let cache = config.build::<u64, Option<u64>>()?;
//!     assert_eq!(Memo::eval(cache, |ctx| stairs(ctx, 30))?, 1_346_269);
//! }
//! # Ok::<(), CacheError>(())
//! ```
//!
//! Mutually recursive functions use one layer each; see [`Memo::memo_at`].

mod backend;
mod config;
mod error;
mod index;
mod layer;
mod memo;
pub mod slot;

pub use backend::{
    Cache, DenseCache, DynCache, ExpandableCache, FixedCache, HashMapCache, PackedDenseCache,
    PackedExpandableCache, PackedFixedCache,
};
pub use config::BackendConfig;
pub use error::CacheError;
pub use index::DenseIndex;
pub use layer::{Layer, LayerKey, LayerValue};
pub use memo::{
    Memo, MemoStats, eval_dense, eval_expandable, eval_fixed, eval_hash_map, run_dense,
    run_expandable, run_fixed, run_hash_map,
};
pub use slot::{Packed, Sentinel, Slot};

#[cfg(test)]
mod tests;
