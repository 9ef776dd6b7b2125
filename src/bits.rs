//! Word-level bit manipulation primitives shared by all set representations.

/// Number of bits in one storage word.
pub const WORD_BITS: usize = u64::BITS as usize;

/// Returns a word with exactly the bits `[from, to)` set.
///
/// Both bounds must lie in `0..=64` with `from <= to`. The `to == 64` edge
/// is handled without shifting by the word width.
///
/// ```
/// use natset::bits::mask;
/// assert_eq!(mask(0, 0), 0);
/// assert_eq!(mask(0, 64), !0);
/// assert_eq!(mask(1, 3), 0b110);
/// ```
#[inline]
pub fn mask(from: usize, to: usize) -> u64 {
    debug_assert!(from <= to && to <= WORD_BITS);
    mask_to(to) & !mask_to(from)
}

/// Returns a word with the bits `[0, to)` set.
#[inline]
pub fn mask_to(to: usize) -> u64 {
    debug_assert!(to <= WORD_BITS);
    if to == WORD_BITS {
        !0
    } else {
        (1u64 << to) - 1
    }
}

/// Index of the word holding bit `index`.
#[inline]
pub fn word_index(index: usize) -> usize {
    index / WORD_BITS
}

/// Position of bit `index` within its word.
#[inline]
pub fn bit_index(index: usize) -> usize {
    index % WORD_BITS
}

/// The single-bit mask for `index` within its word.
#[inline]
pub fn bit(index: usize) -> u64 {
    1u64 << bit_index(index)
}

/// Number of words needed to hold `bits` bits.
#[inline]
pub fn words_for(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_to_edges() {
        assert_eq!(mask_to(0), 0);
        assert_eq!(mask_to(1), 1);
        assert_eq!(mask_to(63), !0 >> 1);
        assert_eq!(mask_to(64), !0);
    }

    #[test]
    fn test_mask_ranges() {
        assert_eq!(mask(0, 64), !0);
        assert_eq!(mask(5, 5), 0);
        assert_eq!(mask(62, 64), 0b11 << 62);
        for from in 0..=64 {
            for to in from..=64 {
                let expected: u64 = (from..to).fold(0, |acc, i| acc | (1 << i));
                assert_eq!(mask(from, to), expected, "mask({from}, {to})");
            }
        }
    }

    #[test]
    fn test_word_split() {
        assert_eq!(word_index(0), 0);
        assert_eq!(word_index(63), 0);
        assert_eq!(word_index(64), 1);
        assert_eq!(bit_index(64), 0);
        assert_eq!(bit(65), 2);
        assert_eq!(words_for(0), 0);
        assert_eq!(words_for(1), 1);
        assert_eq!(words_for(64), 1);
        assert_eq!(words_for(65), 2);
    }
}
