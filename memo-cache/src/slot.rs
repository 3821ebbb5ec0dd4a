//! Slot representations for inline-storing backends.
//!
//! A slot is logically an `Option<V>`. Backends that keep their values in a
//! vector are generic over how that option is laid out in memory:
//!
//! - [`Option<V>`] is the default: an explicit presence flag, always correct.
//! - [`Packed<V>`] stores the raw value and reserves one [`Sentinel`] value of
//!   `V` to mean "no entry yet". No tag, no wrapper, so a packed cache is just
//!   a vector of `V`.
//!
//! # Warning: Sentinel Collisions
//!
//! A packed slot cannot tell a stored sentinel apart from an empty slot. If the
//! memoized function ever returns `V::sentinel()`, the value is silently
//! dropped and the next lookup reports a miss, so the body runs again. This is
//! not detected. Only choose `Packed<V>` when the function provably never
//! produces the sentinel; otherwise stay with `Option<V>`.

/// Physical representation of one cache slot holding an optional `V`.
pub trait Slot<V>: Sized {
    /// The empty slot.
    fn vacant() -> Self;

    /// Returns `true` if the slot holds no value.
    fn is_vacant(&self) -> bool;

    /// A slot holding `value`.
    fn filled(value: V) -> Self;

    /// Reads the value out of a slot known to be filled.
    ///
    /// Callers must check [`Slot::is_vacant`] first. For a vacant slot the
    /// result is unspecified: a packed slot hands back the sentinel, an
    /// `Option` slot panics.
    fn extract(&self) -> V;

    /// Reads the slot as an `Option`.
    fn load(&self) -> Option<V> {
        if self.is_vacant() {
            None
        } else {
            Some(self.extract())
        }
    }
}

impl<V: Clone> Slot<V> for Option<V> {
    fn vacant() -> Self {
        None
    }

    fn is_vacant(&self) -> bool {
        self.is_none()
    }

    fn filled(value: V) -> Self {
        Some(value)
    }

    fn extract(&self) -> V {
        match self {
            Some(value) => value.clone(),
            None => unreachable!("extract called on a vacant slot"),
        }
    }

    fn load(&self) -> Option<V> {
        self.clone()
    }
}

/// A value type with one reserved "empty" representative.
///
/// The sentinel must never be a value the memoized function returns. See the
/// module docs for what happens otherwise.
pub trait Sentinel: Clone {
    /// The reserved value meaning "absent".
    fn sentinel() -> Self;

    /// Returns `true` if `self` is the reserved value.
    fn is_sentinel(&self) -> bool;
}

macro_rules! sentinel_int {
    ($bound:ident => $($ty:ty),*) => {
        $(
            impl Sentinel for $ty {
                fn sentinel() -> Self {
                    <$ty>::$bound
                }

                fn is_sentinel(&self) -> bool {
                    *self == <$ty>::$bound
                }
            }
        )*
    };
}

// Signed integers reserve MIN, unsigned ones MAX: zero is far too common a result.
sentinel_int!(MIN => i8, i16, i32, i64, i128, isize);
sentinel_int!(MAX => u8, u16, u32, u64, u128, usize);

macro_rules! sentinel_float {
    ($($ty:ty),*) => {
        $(
            impl Sentinel for $ty {
                fn sentinel() -> Self {
                    <$ty>::NAN
                }

                fn is_sentinel(&self) -> bool {
                    self.is_nan()
                }
            }
        )*
    };
}

sentinel_float!(f32, f64);

impl Sentinel for char {
    fn sentinel() -> Self {
        char::MAX
    }

    fn is_sentinel(&self) -> bool {
        *self == char::MAX
    }
}

/// Sentinel-coded slot: the raw value, with [`Sentinel::sentinel`] meaning empty.
///
/// `#[repr(transparent)]`, so `Vec<Packed<V>>` has the layout of `Vec<V>`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct Packed<V>(V);

impl<V> Packed<V> {
    /// Returns the raw stored value, sentinel included.
    pub fn into_raw(self) -> V {
        self.0
    }
}

impl<V: Sentinel> Slot<V> for Packed<V> {
    fn vacant() -> Self {
        Packed(V::sentinel())
    }

    fn is_vacant(&self) -> bool {
        self.0.is_sentinel()
    }

    fn filled(value: V) -> Self {
        Packed(value)
    }

    fn extract(&self) -> V {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_slot() {
        let empty: Option<u32> = Slot::vacant();
        assert!(empty.is_vacant());
        assert_eq!(empty.load(), None);

        let full: Option<u32> = Slot::filled(0);
        assert!(!full.is_vacant());
        assert_eq!(full.load(), Some(0));
    }

    #[test]
    fn test_packed_integer_slots() {
        let empty: Packed<i64> = Slot::vacant();
        assert!(empty.is_vacant());
        assert_eq!(empty.into_raw(), i64::MIN);

        let zero: Packed<u8> = Slot::filled(0);
        assert_eq!(zero.load(), Some(0));
        let empty: Packed<u8> = Slot::vacant();
        assert_eq!(empty.load(), None);
    }

    #[test]
    fn test_packed_float_uses_nan() {
        let empty: Packed<f64> = Slot::vacant();
        assert!(empty.is_vacant());
        let inf: Packed<f64> = Slot::filled(f64::INFINITY);
        assert_eq!(inf.load(), Some(f64::INFINITY));
    }

    #[test]
    fn test_sentinel_collision_reads_as_vacant() {
        // Storing the sentinel itself is indistinguishable from an empty slot
        let collided: Packed<i32> = Slot::filled(i32::MIN);
        assert!(collided.is_vacant());
        assert_eq!(collided.load(), None);
    }

    #[test]
    fn test_packed_is_transparent() {
        assert_eq!(std::mem::size_of::<Packed<u32>>(), std::mem::size_of::<u32>());
        assert!(std::mem::size_of::<Option<u32>>() > std::mem::size_of::<u32>());
    }
}
