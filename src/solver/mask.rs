#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Fixed-width machine words used as value bit sets.
//!
//! A unit (row, column or box) tracks its placed values in a single unsigned
//! word: bit `v - 1` is set when value `v` is present. Candidate sets for a
//! cell are formed by or-ing the three unit words, complementing, and masking
//! down to the low `side` bits. The word width is therefore a hard ceiling on
//! the supported side length: [`u32`] covers sides up to 25 and [`u64`] up to
//! 49 (the largest perfect squares not exceeding the width).

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// An unsigned machine word acting as a set of candidate or placed values.
///
/// Implementations exist for [`u32`] (the default engine word) and [`u64`]
/// (the wide variant). All operations are branch-free bit manipulation.
pub trait MaskWord:
    Copy
    + Debug
    + Eq
    + Hash
    + Default
    + Send
    + Sync
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
    + BitAndAssign
    + BitOrAssign
{
    /// Width of the word in bits, and the capacity ceiling on side length.
    const BITS: u32;

    /// The empty set.
    const EMPTY: Self;

    /// The set containing only bit `index`.
    #[must_use]
    fn bit(index: u32) -> Self;

    /// The set of the low `n` bits. `n == Self::BITS` yields the full word;
    /// the shift-by-width case is handled explicitly rather than left to
    /// overflow semantics.
    #[must_use]
    fn low_bits(n: u32) -> Self;

    /// Number of set bits.
    #[must_use]
    fn count(self) -> u32;

    /// Index of the lowest set bit, or `Self::BITS` when empty.
    #[must_use]
    fn lowest(self) -> u32;

    /// The set with its lowest set bit removed.
    #[must_use]
    fn clear_lowest(self) -> Self;

    /// Whether no bit is set.
    #[must_use]
    fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

macro_rules! impl_mask_word {
    ($ty:ty) => {
        impl MaskWord for $ty {
            const BITS: u32 = <$ty>::BITS;
            const EMPTY: Self = 0;

            #[inline]
            fn bit(index: u32) -> Self {
                debug_assert!(index < Self::BITS);
                1 << index
            }

            #[inline]
            fn low_bits(n: u32) -> Self {
                debug_assert!(n <= Self::BITS);
                if n == Self::BITS { !0 } else { (1 << n) - 1 }
            }

            #[inline]
            fn count(self) -> u32 {
                self.count_ones()
            }

            #[inline]
            fn lowest(self) -> u32 {
                self.trailing_zeros()
            }

            #[inline]
            fn clear_lowest(self) -> Self {
                self & self.wrapping_sub(1)
            }
        }
    };
}

impl_mask_word!(u32);
impl_mask_word!(u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_bits_partial() {
        assert_eq!(u32::low_bits(0), 0);
        assert_eq!(u32::low_bits(9), 0b1_1111_1111);
        assert_eq!(u64::low_bits(49), (1 << 49) - 1);
    }

    #[test]
    fn test_low_bits_full_width() {
        assert_eq!(u32::low_bits(32), u32::MAX);
        assert_eq!(u64::low_bits(64), u64::MAX);
    }

    #[test]
    fn test_bit_and_lowest() {
        let m = u32::bit(4) | u32::bit(8);
        assert_eq!(m.count(), 2);
        assert_eq!(m.lowest(), 4);
        assert_eq!(m.clear_lowest(), u32::bit(8));
        assert_eq!(m.clear_lowest().clear_lowest(), u32::EMPTY);
    }

    #[test]
    fn test_empty_lowest_is_width() {
        assert_eq!(u32::EMPTY.lowest(), 32);
        assert!(u64::EMPTY.is_empty());
    }
}
