//! Memoization context and evaluation entry points.

use tracing::debug;

use crate::backend::{Cache, DenseCache, ExpandableCache, FixedCache, HashMapCache};
use crate::error::CacheError;
use crate::index::DenseIndex;

/// Hit and miss counters for one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    /// Lookups answered from a cache.
    pub hits: u64,
    /// Lookups that ran the memoized body.
    pub misses: u64,
}

/// The context a memoized computation runs in.
///
/// `Memo` owns the cache (or, for mutually recursive functions, a tuple or
/// array of caches, one per layer) for the whole evaluation. Memoized functions
/// take `&mut Memo<L>` as their first argument and hand it down to every call
/// they make, so nested calls reach the same caches without any of the
/// intermediate signatures naming them. Two evaluations never share a `Memo`,
/// so they never observe each other's entries.
///
/// # Type Parameters
///
/// - `L`: the installed cache, a [`Cache`] for [`Memo::memo`], or a tuple /
///   array of caches for [`Memo::memo_at`]
///
/// # Warning: No Cycle Detection
///
/// A key whose computation asks for itself before it has been stored recurses
/// until the stack overflows. **Users MUST ensure the recurrence is
/// well-founded**, for example by strictly decreasing keys.
///
/// # Example
///
/// ```rust
/// use memo_cache::{Cache, CacheError, FixedCache, Memo};
///
/// fn fib<C>(ctx: &mut Memo<C>, n: usize) -> Result<u64, CacheError>
/// where
///     C: Cache<Key = usize, Value = u64>,
/// {
///     if n <= 1 {
///         return Ok(n as u64);
///     }
///     Ok(ctx.memo(fib, n - 1)? + ctx.memo(fib, n - 2)?)
/// }
///
/// let value = Memo::eval(FixedCache::new(91), |ctx| ctx.memo(fib, 90))?;
/// assert_eq!(value, 2_880_067_194_370_816_120);
/// # Ok::<(), CacheError>(())
/// ```
#[derive(Debug)]
pub struct Memo<L> {
    caches: L,
    stats: MemoStats,
}

impl<L> Memo<L> {
    /// Wraps already allocated caches in a fresh context.
    pub fn new(caches: L) -> Self {
        Self {
            caches,
            stats: MemoStats::default(),
        }
    }

    /// Runs `body` against `caches` and returns only its result.
    ///
    /// The caches are dropped when the evaluation ends.
    pub fn eval<R, E>(caches: L, body: impl FnOnce(&mut Self) -> Result<R, E>) -> Result<R, E> {
        Self::run(caches, body).map(|(result, _)| result)
    }

    /// Runs `body` against `caches` and returns its result with the final caches.
    pub fn run<R, E>(
        caches: L,
        body: impl FnOnce(&mut Self) -> Result<R, E>,
    ) -> Result<(R, L), E> {
        let mut memo = Self::new(caches);
        let result = body(&mut memo);
        debug!(
            hits = memo.stats.hits,
            misses = memo.stats.misses,
            ok = result.is_ok(),
            "evaluation finished"
        );
        result.map(|value| (value, memo.caches))
    }

    /// The installed cache, or the tuple / array of layers.
    pub fn cache(&self) -> &L {
        &self.caches
    }

    /// Hit and miss counts so far, across all layers.
    pub fn stats(&self) -> MemoStats {
        self.stats
    }

    /// Consumes the context and returns its caches.
    pub fn into_caches(self) -> L {
        self.caches
    }

    /// Memoizes `f` at `key` in the cache chosen by `select`.
    pub(crate) fn memoize_in<C, E, F>(
        &mut self,
        select: fn(&mut L) -> &mut C,
        f: F,
        key: C::Key,
    ) -> Result<C::Value, E>
    where
        C: Cache,
        C::Key: Clone,
        C::Value: Clone,
        F: FnOnce(&mut Self, C::Key) -> Result<C::Value, E>,
        E: From<CacheError>,
    {
        // Fast path: already computed
        if let Some(value) = select(&mut self.caches).lookup(&key)? {
            self.stats.hits += 1;
            return Ok(value);
        }

        self.stats.misses += 1;
        let value = f(self, key.clone())?;
        select(&mut self.caches).store(key, value.clone())?;
        Ok(value)
    }
}

fn whole<L>(caches: &mut L) -> &mut L {
    caches
}

impl<L: Cache> Memo<L>
where
    L::Key: Clone,
    L::Value: Clone,
{
    /// Returns the value of `f` at `key`, running `f` only on a cache miss.
    ///
    /// On a miss, `f` receives this context and `key`; it may call `memo`
    /// again for other keys before its result is stored. For one context and
    /// one key the body of `f` runs at most once, however often `memo` is
    /// called. Errors from the cache (`CacheError` converted into `E`) and from
    /// `f` itself are returned unchanged; nothing is stored for a key whose `f`
    /// failed.
    pub fn memo<E, F>(&mut self, f: F, key: L::Key) -> Result<L::Value, E>
    where
        F: FnOnce(&mut Self, L::Key) -> Result<L::Value, E>,
        E: From<CacheError>,
    {
        self.memoize_in(whole, f, key)
    }
}

/// Evaluates `body` over a fresh [`HashMapCache`] and discards the cache.
pub fn eval_hash_map<K, V, R, E>(
    body: impl FnOnce(&mut Memo<HashMapCache<K, V>>) -> Result<R, E>,
) -> Result<R, E> {
    Memo::eval(HashMapCache::new(), body)
}

/// Evaluates `body` over a fresh [`HashMapCache`] and returns the cache too.
pub fn run_hash_map<K, V, R, E>(
    body: impl FnOnce(&mut Memo<HashMapCache<K, V>>) -> Result<R, E>,
) -> Result<(R, HashMapCache<K, V>), E> {
    Memo::run(HashMapCache::new(), body)
}

/// Evaluates `body` over a fresh [`DenseCache`] covering `lo..=hi` and discards the cache.
pub fn eval_dense<K, V, R, E>(
    lo: K,
    hi: K,
    body: impl FnOnce(&mut Memo<DenseCache<K, V>>) -> Result<R, E>,
) -> Result<R, E>
where
    K: DenseIndex,
    V: Clone,
    E: From<CacheError>,
{
    Memo::eval(DenseCache::new(lo, hi)?, body)
}

/// Evaluates `body` over a fresh [`DenseCache`] covering `lo..=hi` and returns the cache too.
pub fn run_dense<K, V, R, E>(
    lo: K,
    hi: K,
    body: impl FnOnce(&mut Memo<DenseCache<K, V>>) -> Result<R, E>,
) -> Result<(R, DenseCache<K, V>), E>
where
    K: DenseIndex,
    V: Clone,
    E: From<CacheError>,
{
    Memo::run(DenseCache::new(lo, hi)?, body)
}

/// Evaluates `body` over a fresh [`FixedCache`] of `capacity` slots and discards the cache.
pub fn eval_fixed<V, R, E>(
    capacity: usize,
    body: impl FnOnce(&mut Memo<FixedCache<V>>) -> Result<R, E>,
) -> Result<R, E>
where
    V: Clone,
{
    Memo::eval(FixedCache::new(capacity), body)
}

/// Evaluates `body` over a fresh [`FixedCache`] of `capacity` slots and returns the cache too.
pub fn run_fixed<V, R, E>(
    capacity: usize,
    body: impl FnOnce(&mut Memo<FixedCache<V>>) -> Result<R, E>,
) -> Result<(R, FixedCache<V>), E>
where
    V: Clone,
{
    Memo::run(FixedCache::new(capacity), body)
}

/// Evaluates `body` over a fresh [`ExpandableCache`] and discards the cache.
///
/// `initial_capacity` of `None` starts at [`ExpandableCache::DEFAULT_CAPACITY`].
pub fn eval_expandable<V, R, E>(
    initial_capacity: Option<usize>,
    body: impl FnOnce(&mut Memo<ExpandableCache<V>>) -> Result<R, E>,
) -> Result<R, E>
where
    V: Clone,
{
    Memo::eval(expandable(initial_capacity), body)
}

/// Evaluates `body` over a fresh [`ExpandableCache`] and returns the cache too.
pub fn run_expandable<V, R, E>(
    initial_capacity: Option<usize>,
    body: impl FnOnce(&mut Memo<ExpandableCache<V>>) -> Result<R, E>,
) -> Result<(R, ExpandableCache<V>), E>
where
    V: Clone,
{
    Memo::run(expandable(initial_capacity), body)
}

fn expandable<V: Clone>(initial_capacity: Option<usize>) -> ExpandableCache<V> {
    match initial_capacity {
        Some(capacity) => ExpandableCache::with_capacity(capacity),
        None => ExpandableCache::new(),
    }
}
