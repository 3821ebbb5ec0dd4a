//! Layered caches for mutually recursive functions.
//!
//! When two or more memoized functions call each other, each gets its own
//! layer: its own cache inside one [`Memo`] context. Layers are fixed when the
//! context is built (a tuple of up to four caches of any backend, or an array of
//! caches of one type) and each function addresses its layer by a constant
//! index, so a key written by one function is never seen by another.

use crate::backend::Cache;
use crate::error::CacheError;
use crate::memo::Memo;

/// Static access to layer `I` of a cache stack.
pub trait Layer<const I: usize> {
    /// The cache type of this layer.
    type Cache: Cache;

    /// Shared access to the layer.
    fn layer(&self) -> &Self::Cache;

    /// Exclusive access to the layer.
    fn layer_mut(&mut self) -> &mut Self::Cache;
}

/// Key type of layer `I` in stack `L`.
pub type LayerKey<L, const I: usize> = <<L as Layer<I>>::Cache as Cache>::Key;

/// Value type of layer `I` in stack `L`.
pub type LayerValue<L, const I: usize> = <<L as Layer<I>>::Cache as Cache>::Value;

macro_rules! tuple_layer {
    ($idx:tt => $target:ident; $($all:ident),+) => {
        impl<$($all: Cache),+> Layer<$idx> for ($($all,)+) {
            type Cache = $target;

            fn layer(&self) -> &$target {
                &self.$idx
            }

            fn layer_mut(&mut self) -> &mut $target {
                &mut self.$idx
            }
        }
    };
}

tuple_layer!(0 => A; A);

tuple_layer!(0 => A; A, B);
tuple_layer!(1 => B; A, B);

tuple_layer!(0 => A; A, B, C);
tuple_layer!(1 => B; A, B, C);
tuple_layer!(2 => C; A, B, C);

tuple_layer!(0 => A; A, B, C, D);
tuple_layer!(1 => B; A, B, C, D);
tuple_layer!(2 => C; A, B, C, D);
tuple_layer!(3 => D; A, B, C, D);

impl<C: Cache, const N: usize, const I: usize> Layer<I> for [C; N] {
    type Cache = C;

    fn layer(&self) -> &C {
        const { assert!(I < N, "layer index out of bounds") };
        &self[I]
    }

    fn layer_mut(&mut self) -> &mut C {
        const { assert!(I < N, "layer index out of bounds") };
        &mut self[I]
    }
}

impl<L> Memo<L> {
    /// Like [`Memo::memo`], but memoizes in layer `I` of the installed stack.
    ///
    /// # Example
    ///
    /// Hofstadter's female and male sequences, each in its own layer:
    ///
    /// ```rust
    /// use memo_cache::{CacheError, FixedCache, Memo};
    ///
    /// type Stack = (FixedCache<i64>, FixedCache<i64>);
    ///
    /// fn female(ctx: &mut Memo<Stack>, n: usize) -> Result<i64, CacheError> {
    ///     if n == 0 {
    ///         return Ok(1);
    ///     }
    ///     let f = ctx.memo_at::<0, _>(female, n - 1)?;
    ///     Ok(n as i64 - ctx.memo_at::<1, _>(male, f as usize)?)
    /// }
    ///
    /// fn male(ctx: &mut Memo<Stack>, n: usize) -> Result<i64, CacheError> {
    ///     if n == 0 {
    ///         return Ok(0);
    ///     }
    ///     let m = ctx.memo_at::<1, _>(male, n - 1)?;
    ///     Ok(n as i64 - ctx.memo_at::<0, _>(female, m as usize)?)
    /// }
    ///
    /// let layers = (FixedCache::new(11), FixedCache::new(11));
    /// let fs = Memo::eval(layers, |ctx| {
    ///     (0..=10).map(|n| ctx.memo_at::<0, _>(female, n)).collect::<Result<Vec<_>, _>>()
    /// })?;
    /// assert_eq!(fs, vec![1, 1, 2, 2, 3, 3, 4, 5, 5, 6, 6]);
    /// # Ok::<(), CacheError>(())
    /// ```
    pub fn memo_at<const I: usize, E>(
        &mut self,
        f: impl FnOnce(&mut Self, LayerKey<L, I>) -> Result<LayerValue<L, I>, E>,
        key: LayerKey<L, I>,
    ) -> Result<LayerValue<L, I>, E>
    where
        L: Layer<I>,
        LayerKey<L, I>: Clone,
        LayerValue<L, I>: Clone,
        E: From<CacheError>,
    {
        self.memoize_in(<L as Layer<I>>::layer_mut, f, key)
    }

    /// Layer `I` of the installed stack.
    pub fn layer<const I: usize>(&self) -> &<L as Layer<I>>::Cache
    where
        L: Layer<I>,
    {
        <L as Layer<I>>::layer(self.cache())
    }
}
