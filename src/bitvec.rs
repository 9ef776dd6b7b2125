//! Dense growable bit vector.
//!
//! This is the plain, uncompressed backing store used by the dense set
//! representation. Each `u64` word holds 64 bits and the word vector grows
//! automatically when bits beyond the current extent are written. Reads
//! beyond the extent simply report the bit as clear.

use std::fmt;
use std::ops::Range;

use crate::bits::{bit, bit_index, mask, word_index, words_for, WORD_BITS};

/// A growable bit vector backed by a vector of u64 words.
#[derive(Clone, Default)]
pub struct BitVec {
    /// Storage: each u64 holds 64 bits.
    words: Vec<u64>,
    /// Number of set bits (maintained eagerly for O(1) `len()`).
    count: usize,
}

impl BitVec {
    /// Creates a new empty bit vector with no pre-allocated capacity.
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            count: 0,
        }
    }

    /// Creates an empty bit vector with capacity for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: vec![0; words_for(bits)],
            count: 0,
        }
    }

    /// Returns the number of set bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no bits are set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the index one past the highest set bit, or 0 if empty.
    pub fn length(&self) -> usize {
        for (w, &word) in self.words.iter().enumerate().rev() {
            if word != 0 {
                return w * WORD_BITS + (WORD_BITS - word.leading_zeros() as usize);
            }
        }
        0
    }

    /// Ensures the vector can hold at least `bits` bits.
    pub fn reserve(&mut self, bits: usize) {
        let needed = words_for(bits);
        if needed > self.words.len() {
            self.words.resize(needed, 0);
        }
    }

    /// Returns true if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        match self.words.get(word_index(index)) {
            Some(&word) => word & bit(index) != 0,
            None => false,
        }
    }

    /// Sets the bit at the given index. Returns true if the bit was not
    /// previously set.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        let w = word_index(index);
        if w >= self.words.len() {
            self.words.resize(w + 1, 0);
        }
        let mask = bit(index);
        let was_clear = self.words[w] & mask == 0;
        if was_clear {
            self.words[w] |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Clears the bit at the given index. Returns true if the bit was
    /// previously set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        let w = word_index(index);
        if w >= self.words.len() {
            return false;
        }
        let mask = bit(index);
        let was_set = self.words[w] & mask != 0;
        if was_set {
            self.words[w] &= !mask;
            self.count -= 1;
        }
        was_set
    }

    /// Sets the bit at the given index.
    #[inline]
    pub fn set(&mut self, index: usize) {
        self.insert(index);
    }

    /// Clears the bit at the given index.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        self.remove(index);
    }

    /// Flips the bit at the given index.
    #[inline]
    pub fn flip(&mut self, index: usize) {
        if !self.remove(index) {
            self.insert(index);
        }
    }

    /// Sets all bits in the given range.
    ///
    /// # Panics
    ///
    /// Panics if `range.start > range.end`.
    pub fn set_range(&mut self, range: Range<usize>) {
        check_range(&range);
        if range.is_empty() {
            return;
        }
        self.reserve(range.end);
        self.apply_range(range, |word, mask| word | mask);
    }

    /// Clears all bits in the given range.
    pub fn clear_range(&mut self, range: Range<usize>) {
        check_range(&range);
        if range.is_empty() {
            return;
        }
        let end = range.end.min(self.words.len() * WORD_BITS);
        if range.start >= end {
            return;
        }
        self.apply_range(range.start..end, |word, mask| word & !mask);
    }

    /// Flips all bits in the given range.
    pub fn flip_range(&mut self, range: Range<usize>) {
        check_range(&range);
        if range.is_empty() {
            return;
        }
        self.reserve(range.end);
        self.apply_range(range, |word, mask| word ^ mask);
    }

    fn apply_range(&mut self, range: Range<usize>, op: impl Fn(u64, u64) -> u64) {
        let first = word_index(range.start);
        let last = word_index(range.end - 1);
        for w in first..=last {
            let lo = if w == first { bit_index(range.start) } else { 0 };
            let hi = if w == last {
                bit_index(range.end - 1) + 1
            } else {
                WORD_BITS
            };
            let word = self.words[w];
            let updated = op(word, mask(lo, hi));
            self.words[w] = updated;
            self.count = self.count + updated.count_ones() as usize - word.count_ones() as usize;
        }
    }

    /// Clears all bits.
    pub fn clear_all(&mut self) {
        for word in &mut self.words {
            *word = 0;
        }
        self.count = 0;
    }

    /// Returns the smallest set bit at or above `from`, if any.
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        let mut w = word_index(from);
        if w >= self.words.len() {
            return None;
        }
        let mut word = self.words[w] & !(bit(from) - 1);
        loop {
            if word != 0 {
                return Some(w * WORD_BITS + word.trailing_zeros() as usize);
            }
            w += 1;
            if w >= self.words.len() {
                return None;
            }
            word = self.words[w];
        }
    }

    /// Returns the smallest clear bit at or above `from`. Always exists,
    /// since the vector is conceptually infinite and zero-padded.
    pub fn next_clear_bit(&self, from: usize) -> usize {
        let mut w = word_index(from);
        if w >= self.words.len() {
            return from;
        }
        let mut word = !self.words[w] & !(bit(from) - 1);
        loop {
            if word != 0 {
                return w * WORD_BITS + word.trailing_zeros() as usize;
            }
            w += 1;
            if w >= self.words.len() {
                return w * WORD_BITS;
            }
            word = !self.words[w];
        }
    }

    /// Returns the largest set bit at or below `index`, if any.
    pub fn previous_set_bit(&self, index: usize) -> Option<usize> {
        let mut w = word_index(index);
        let mut word;
        if w >= self.words.len() {
            if self.words.is_empty() {
                return None;
            }
            w = self.words.len() - 1;
            word = self.words[w];
        } else {
            word = self.words[w] & (bit(index) | (bit(index) - 1));
        }
        loop {
            if word != 0 {
                return Some(w * WORD_BITS + (WORD_BITS - 1 - word.leading_zeros() as usize));
            }
            if w == 0 {
                return None;
            }
            w -= 1;
            word = self.words[w];
        }
    }

    /// Returns the largest clear bit at or below `index`, if any.
    pub fn previous_clear_bit(&self, index: usize) -> Option<usize> {
        let w = word_index(index);
        if w >= self.words.len() {
            return Some(index);
        }
        let mut w = w;
        let mut word = !self.words[w] & (bit(index) | (bit(index) - 1));
        loop {
            if word != 0 {
                return Some(w * WORD_BITS + (WORD_BITS - 1 - word.leading_zeros() as usize));
            }
            if w == 0 {
                return None;
            }
            w -= 1;
            word = !self.words[w];
        }
    }

    /// Intersects this vector with `other`.
    pub fn and(&mut self, other: &BitVec) {
        let common = self.words.len().min(other.words.len());
        for w in 0..common {
            self.words[w] &= other.words[w];
        }
        for word in &mut self.words[common..] {
            *word = 0;
        }
        self.recount();
    }

    /// Removes all bits of `other` from this vector.
    pub fn and_not(&mut self, other: &BitVec) {
        let common = self.words.len().min(other.words.len());
        for w in 0..common {
            self.words[w] &= !other.words[w];
        }
        self.recount();
    }

    /// Unions this vector with `other`.
    pub fn or(&mut self, other: &BitVec) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (w, &word) in other.words.iter().enumerate() {
            self.words[w] |= word;
        }
        self.recount();
    }

    /// Symmetric difference with `other`.
    pub fn xor(&mut self, other: &BitVec) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (w, &word) in other.words.iter().enumerate() {
            self.words[w] ^= word;
        }
        self.recount();
    }

    /// Returns true if this vector shares a set bit with `other`.
    pub fn intersects(&self, other: &BitVec) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(&a, &b)| a & b != 0)
    }

    /// Returns true if every set bit of `other` is also set here.
    pub fn is_superset(&self, other: &BitVec) -> bool {
        let common = self.words.len().min(other.words.len());
        if other.words[common..].iter().any(|&word| word != 0) {
            return false;
        }
        self.words[..common]
            .iter()
            .zip(&other.words[..common])
            .all(|(&a, &b)| b & !a == 0)
    }

    fn recount(&mut self) {
        self.count = self.words.iter().map(|w| w.count_ones() as usize).sum();
    }

    /// Returns an iterator over all set bit indices in ascending order.
    pub fn iter(&self) -> BitVecIter<'_> {
        BitVecIter {
            words: &self.words,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

fn check_range(range: &Range<usize>) {
    assert!(
        range.start <= range.end,
        "invalid range {}..{}",
        range.start,
        range.end
    );
}

impl PartialEq for BitVec {
    fn eq(&self, other: &Self) -> bool {
        let common = self.words.len().min(other.words.len());
        self.words[..common] == other.words[..common]
            && self.words[common..].iter().all(|&w| w == 0)
            && other.words[common..].iter().all(|&w| w == 0)
    }
}

impl Eq for BitVec {}

impl fmt::Debug for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Extend<usize> for BitVec {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for index in iter {
            self.insert(index);
        }
    }
}

impl FromIterator<usize> for BitVec {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut vec = BitVec::new();
        vec.extend(iter);
        vec
    }
}

/// Iterator over set bits in a [`BitVec`].
pub struct BitVecIter<'a> {
    words: &'a [u64],
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitVecIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1;
                return Some(self.word_idx * WORD_BITS + bit_idx);
            }
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current_word = self.words[self.word_idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_contains_remove() {
        let mut vec = BitVec::new();
        assert!(vec.insert(42));
        assert!(!vec.insert(42));
        assert!(vec.contains(42));
        assert_eq!(vec.len(), 1);
        assert!(vec.remove(42));
        assert!(!vec.remove(42));
        assert!(vec.is_empty());
    }

    #[test]
    fn test_auto_grow() {
        let mut vec = BitVec::new();
        vec.set(1000);
        assert!(vec.contains(1000));
        assert!(!vec.contains(999));
        assert_eq!(vec.length(), 1001);
    }

    #[test]
    fn test_range_ops_word_boundary() {
        let mut vec = BitVec::new();
        vec.set_range(63..65);
        assert_eq!(vec.iter().collect::<Vec<_>>(), vec![63, 64]);
        vec.flip_range(64..66);
        assert_eq!(vec.iter().collect::<Vec<_>>(), vec![63, 65]);
        vec.clear_range(0..66);
        assert!(vec.is_empty());
    }

    #[test]
    fn test_empty_range_noop() {
        let mut vec = BitVec::new();
        vec.set_range(10..10);
        assert!(vec.is_empty());
        vec.clear_range(1000..1000);
        assert!(vec.is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid range")]
    fn test_reversed_range_panics() {
        let mut vec = BitVec::new();
        vec.set_range(5..2);
    }

    #[test]
    fn test_next_previous_queries() {
        let mut vec = BitVec::new();
        vec.extend([3, 64, 200]);
        assert_eq!(vec.next_set_bit(0), Some(3));
        assert_eq!(vec.next_set_bit(4), Some(64));
        assert_eq!(vec.next_set_bit(201), None);
        assert_eq!(vec.next_clear_bit(3), 4);
        assert_eq!(vec.previous_set_bit(63), Some(3));
        assert_eq!(vec.previous_set_bit(2), None);
        assert_eq!(vec.previous_clear_bit(64), Some(63));
        assert_eq!(vec.previous_set_bit(100_000), Some(200));
    }

    #[test]
    fn test_next_clear_bit_dense_prefix() {
        let mut vec = BitVec::new();
        vec.set_range(0..130);
        assert_eq!(vec.next_clear_bit(0), 130);
        assert_eq!(vec.previous_clear_bit(129), None);
    }

    #[test]
    fn test_bulk_ops() {
        let a: BitVec = [1, 2, 3, 100].into_iter().collect();
        let b: BitVec = [2, 3, 4, 200].into_iter().collect();

        let mut and = a.clone();
        and.and(&b);
        assert_eq!(and.iter().collect::<Vec<_>>(), vec![2, 3]);

        let mut or = a.clone();
        or.or(&b);
        assert_eq!(or.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 100, 200]);

        let mut xor = a.clone();
        xor.xor(&b);
        assert_eq!(xor.iter().collect::<Vec<_>>(), vec![1, 4, 100, 200]);

        let mut and_not = a.clone();
        and_not.and_not(&b);
        assert_eq!(and_not.iter().collect::<Vec<_>>(), vec![1, 100]);

        assert!(a.intersects(&b));
        assert!(or.is_superset(&a));
        assert!(!a.is_superset(&b));
    }

    #[test]
    fn test_eq_ignores_trailing_words() {
        let mut a = BitVec::new();
        let mut b = BitVec::with_capacity(1024);
        a.insert(5);
        b.insert(5);
        assert_eq!(a, b);
        b.insert(900);
        assert_ne!(a, b);
    }
}
