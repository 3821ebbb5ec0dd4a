//! Key types that can address a bounded dense cache.

use std::fmt::Debug;

/// A key type with a dense, ordered layout over an inclusive range `lo..=hi`.
///
/// Integers map to their distance from `lo`. Tuples are laid out row-major,
/// the last component varying fastest.
///
/// # Example
///
/// ```rust
/// use memo_cache::DenseIndex;
///
/// assert_eq!(i32::range_size(-2, 2), Some(5));
/// assert_eq!(i32::offset(-2, 2, 0), Some(2));
/// assert_eq!(<(u8, u8)>::offset((0, 0), (2, 3), (1, 2)), Some(6));
/// assert_eq!(<(u8, u8)>::offset((0, 0), (2, 3), (3, 0)), None);
/// ```
pub trait DenseIndex: Copy + Debug {
    /// Number of keys in `lo..=hi`, or `None` if it does not fit in `usize`.
    ///
    /// An empty range (`lo > hi` in any component) has size zero.
    fn range_size(lo: Self, hi: Self) -> Option<usize>;

    /// Position of `key` within `lo..=hi`, or `None` if it lies outside.
    fn offset(lo: Self, hi: Self, key: Self) -> Option<usize>;

    /// Key at position `offset`; inverse of [`DenseIndex::offset`].
    ///
    /// `offset` must be below `range_size(lo, hi)`.
    fn from_offset(lo: Self, hi: Self, offset: usize) -> Self;
}

macro_rules! dense_int {
    ($($ty:ty),*) => {
        $(
            impl DenseIndex for $ty {
                fn range_size(lo: Self, hi: Self) -> Option<usize> {
                    if lo > hi {
                        return Some(0);
                    }
                    let span = (hi as i128) - (lo as i128) + 1;
                    usize::try_from(span).ok()
                }

                fn offset(lo: Self, hi: Self, key: Self) -> Option<usize> {
                    if key < lo || key > hi {
                        return None;
                    }
                    usize::try_from((key as i128) - (lo as i128)).ok()
                }

                fn from_offset(lo: Self, _hi: Self, offset: usize) -> Self {
                    ((lo as i128) + (offset as i128)) as $ty
                }
            }
        )*
    };
}

dense_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl DenseIndex for char {
    fn range_size(lo: Self, hi: Self) -> Option<usize> {
        u32::range_size(lo as u32, hi as u32)
    }

    // Surrogate code points are not chars, but they still occupy slots so the
    // layout stays a plain subtraction.
    fn offset(lo: Self, hi: Self, key: Self) -> Option<usize> {
        u32::offset(lo as u32, hi as u32, key as u32)
    }

    fn from_offset(lo: Self, hi: Self, offset: usize) -> Self {
        let code = u32::from_offset(lo as u32, hi as u32, offset);
        char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

impl<A: DenseIndex, B: DenseIndex> DenseIndex for (A, B) {
    fn range_size(lo: Self, hi: Self) -> Option<usize> {
        A::range_size(lo.0, hi.0)?.checked_mul(B::range_size(lo.1, hi.1)?)
    }

    fn offset(lo: Self, hi: Self, key: Self) -> Option<usize> {
        let a = A::offset(lo.0, hi.0, key.0)?;
        let b = B::offset(lo.1, hi.1, key.1)?;
        Some(a * B::range_size(lo.1, hi.1)? + b)
    }

    fn from_offset(lo: Self, hi: Self, offset: usize) -> Self {
        let width = B::range_size(lo.1, hi.1).unwrap_or(1).max(1);
        (
            A::from_offset(lo.0, hi.0, offset / width),
            B::from_offset(lo.1, hi.1, offset % width),
        )
    }
}

impl<A: DenseIndex, B: DenseIndex, C: DenseIndex> DenseIndex for (A, B, C) {
    fn range_size(lo: Self, hi: Self) -> Option<usize> {
        <(A, B)>::range_size((lo.0, lo.1), (hi.0, hi.1))?.checked_mul(C::range_size(lo.2, hi.2)?)
    }

    fn offset(lo: Self, hi: Self, key: Self) -> Option<usize> {
        let ab = <(A, B)>::offset((lo.0, lo.1), (hi.0, hi.1), (key.0, key.1))?;
        let c = C::offset(lo.2, hi.2, key.2)?;
        Some(ab * C::range_size(lo.2, hi.2)? + c)
    }

    fn from_offset(lo: Self, hi: Self, offset: usize) -> Self {
        let width = C::range_size(lo.2, hi.2).unwrap_or(1).max(1);
        let (a, b) = <(A, B)>::from_offset((lo.0, lo.1), (hi.0, hi.1), offset / width);
        (a, b, C::from_offset(lo.2, hi.2, offset % width))
    }
}
