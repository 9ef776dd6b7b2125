//! Single-word representations: sets over indices below 64.
//!
//! All operations, ranged ones included, are constant-time mask algebra on
//! one `u64`. The bounded form keeps the store in a shared `Cell` so the
//! complement view is a handle over the same word.

use std::cell::Cell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use crate::bits::{bit, mask, mask_to, WORD_BITS};

use super::{check_in_domain, check_range, check_range_in_domain};

fn check_index(index: usize) {
    assert!(
        index < WORD_BITS,
        "index {index} out of single-word range [0, {WORD_BITS})"
    );
}

fn check_word_range(from: usize, to: usize) {
    check_range(from, to);
    assert!(
        to <= WORD_BITS,
        "end {to} out of single-word range [0, {WORD_BITS}]"
    );
}

fn first_bit(word: u64) -> Option<usize> {
    (word != 0).then(|| word.trailing_zeros() as usize)
}

fn last_bit(word: u64) -> Option<usize> {
    (word != 0).then(|| WORD_BITS - 1 - word.leading_zeros() as usize)
}

/// A set of natural numbers below 64, stored in one word.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct WordSet {
    store: u64,
}

impl WordSet {
    pub fn new() -> Self {
        Self { store: 0 }
    }

    /// The largest supported domain.
    pub const fn max_size() -> usize {
        WORD_BITS
    }

    pub(crate) fn from_store(store: u64) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> u64 {
        self.store
    }

    pub fn contains(&self, index: usize) -> bool {
        index < WORD_BITS && self.store & bit(index) != 0
    }

    pub fn len(&self) -> usize {
        self.store.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.store == 0
    }

    pub fn first(&self) -> Option<usize> {
        first_bit(self.store)
    }

    pub fn last(&self) -> Option<usize> {
        last_bit(self.store)
    }

    pub fn next_present(&self, from: usize) -> Option<usize> {
        if from >= WORD_BITS {
            return None;
        }
        first_bit(self.store & !mask_to(from))
    }

    pub fn next_absent(&self, from: usize) -> usize {
        if from >= WORD_BITS {
            return from;
        }
        first_bit(!self.store & !mask_to(from)).unwrap_or(WORD_BITS)
    }

    pub fn previous_present(&self, index: usize) -> Option<usize> {
        last_bit(self.store & mask_to(index.min(WORD_BITS - 1) + 1))
    }

    pub fn previous_absent(&self, index: usize) -> Option<usize> {
        if index >= WORD_BITS {
            return Some(index);
        }
        last_bit(!self.store & mask_to(index + 1))
    }

    /// # Panics
    ///
    /// Panics if `index >= 64`.
    pub fn set(&mut self, index: usize) {
        check_index(index);
        self.store |= bit(index);
    }

    pub fn clear(&mut self, index: usize) {
        if index < WORD_BITS {
            self.store &= !bit(index);
        }
    }

    pub fn flip(&mut self, index: usize) {
        check_index(index);
        self.store ^= bit(index);
    }

    pub fn insert(&mut self, index: usize) -> bool {
        check_index(index);
        let missing = self.store & bit(index) == 0;
        self.store |= bit(index);
        missing
    }

    pub fn remove(&mut self, index: usize) -> bool {
        if index >= WORD_BITS {
            return false;
        }
        let present = self.store & bit(index) != 0;
        self.store &= !bit(index);
        present
    }

    /// # Panics
    ///
    /// Panics if the range leaves `0..=64`.
    pub fn set_range(&mut self, range: Range<usize>) {
        check_word_range(range.start, range.end);
        self.store |= mask(range.start, range.end);
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        check_range(range.start, range.end);
        let end = range.end.min(WORD_BITS);
        if range.start < end {
            self.store &= !mask(range.start, end);
        }
    }

    pub fn flip_range(&mut self, range: Range<usize>) {
        check_word_range(range.start, range.end);
        self.store ^= mask(range.start, range.end);
    }

    pub fn clear_from(&mut self, from: usize) {
        if from < WORD_BITS {
            self.store &= mask_to(from);
        }
    }

    pub fn clear_all(&mut self) {
        self.store = 0;
    }

    pub fn and(&mut self, other: &WordSet) {
        self.store &= other.store;
    }

    pub fn and_not(&mut self, other: &WordSet) {
        self.store &= !other.store;
    }

    pub fn or(&mut self, other: &WordSet) {
        self.store |= other.store;
    }

    pub fn xor(&mut self, other: &WordSet) {
        self.store ^= other.store;
    }

    pub fn intersects(&self, other: &WordSet) -> bool {
        self.store & other.store != 0
    }

    pub fn is_superset(&self, other: &WordSet) -> bool {
        other.store & !self.store == 0
    }
}

impl fmt::Debug for WordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries((0..WORD_BITS).filter(|&i| self.contains(i)))
            .finish()
    }
}

impl Extend<usize> for WordSet {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for index in iter {
            self.set(index);
        }
    }
}

/// A bounded set over a domain of at most 64 elements, backed by a shared
/// word. The view and its complement are handles over the same `Cell`.
pub struct BoundedWordSet {
    store: Rc<Cell<u64>>,
    domain_size: usize,
    complement: bool,
}

impl BoundedWordSet {
    /// # Panics
    ///
    /// Panics if `domain_size > 64`.
    pub fn new(domain_size: usize) -> Self {
        assert!(
            domain_size <= WORD_BITS,
            "domain size {domain_size} exceeds single-word range"
        );
        Self {
            store: Rc::new(Cell::new(0)),
            domain_size,
            complement: false,
        }
    }

    pub(crate) fn from_word(word: u64, domain_size: usize) -> Self {
        let set = Self::new(domain_size);
        debug_assert!(word & !mask_to(domain_size) == 0);
        set.store.set(word);
        set
    }

    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    pub(crate) fn is_complement(&self) -> bool {
        self.complement
    }

    pub fn complement(&self) -> BoundedWordSet {
        BoundedWordSet {
            store: Rc::clone(&self.store),
            domain_size: self.domain_size,
            complement: !self.complement,
        }
    }

    pub fn shares_store_with(&self, other: &BoundedWordSet) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    /// The membership word of this view.
    fn view(&self) -> u64 {
        let store = self.store.get();
        let word = if self.complement { !store } else { store };
        word & mask_to(self.domain_size)
    }

    /// Stores the membership word, translating back through the polarity.
    fn write(&self, view: u64) {
        let word = if self.complement { !view } else { view };
        self.store.set(word & mask_to(self.domain_size));
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.domain_size && self.view() & bit(index) != 0
    }

    pub fn len(&self) -> usize {
        self.view().count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.view() == 0
    }

    pub fn first(&self) -> Option<usize> {
        first_bit(self.view())
    }

    pub fn last(&self) -> Option<usize> {
        last_bit(self.view())
    }

    pub fn next_present(&self, from: usize) -> Option<usize> {
        if from >= self.domain_size {
            return None;
        }
        first_bit(self.view() & !mask_to(from))
    }

    pub fn next_absent(&self, from: usize) -> usize {
        if from >= self.domain_size {
            return from;
        }
        first_bit(!self.view() & !mask_to(from)).unwrap_or(WORD_BITS)
    }

    pub fn previous_present(&self, index: usize) -> Option<usize> {
        if self.domain_size == 0 {
            return None;
        }
        last_bit(self.view() & mask_to(index.min(self.domain_size - 1) + 1))
    }

    pub fn previous_absent(&self, index: usize) -> Option<usize> {
        if index >= self.domain_size {
            return Some(index);
        }
        last_bit(!self.view() & mask_to(index + 1))
    }

    /// # Panics
    ///
    /// Panics if `index` is outside the domain.
    pub fn set(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        self.write(self.view() | bit(index));
    }

    pub fn clear(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        self.write(self.view() & !bit(index));
    }

    pub fn flip(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        self.write(self.view() ^ bit(index));
    }

    pub fn insert(&mut self, index: usize) -> bool {
        let missing = !self.contains(index);
        self.set(index);
        missing
    }

    pub fn remove(&mut self, index: usize) -> bool {
        let present = self.contains(index);
        self.clear(index);
        present
    }

    pub fn set_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        self.write(self.view() | mask(range.start, range.end));
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        self.write(self.view() & !mask(range.start, range.end));
    }

    pub fn flip_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        self.write(self.view() ^ mask(range.start, range.end));
    }

    /// Clears every element in `[from, domain_size)`. Unlike the indexed
    /// mutators, `from == domain_size` is accepted and clears nothing.
    pub fn clear_from(&mut self, from: usize) {
        assert!(
            from <= self.domain_size,
            "index {from} too large for domain [0, {})",
            self.domain_size
        );
        self.write(self.view() & mask_to(from));
    }

    pub fn clear_all(&mut self) {
        self.write(0);
    }

    pub fn and(&mut self, other: &BoundedWordSet) {
        self.write(self.view() & other.view());
    }

    pub fn and_not(&mut self, other: &BoundedWordSet) {
        self.write(self.view() & !other.view());
    }

    /// # Panics
    ///
    /// Panics if the operand holds an element outside this domain.
    pub fn or(&mut self, other: &BoundedWordSet) {
        let operand = other.view();
        if let Some(last) = last_bit(operand) {
            check_in_domain(last, self.domain_size);
        }
        self.write(self.view() | operand);
    }

    /// # Panics
    ///
    /// Panics if the operand domain is larger than this domain.
    pub fn xor(&mut self, other: &BoundedWordSet) {
        assert!(
            other.domain_size <= self.domain_size,
            "operand domain [0, {}) too large for domain [0, {})",
            other.domain_size,
            self.domain_size
        );
        self.write(self.view() ^ other.view());
    }

    /// Adds every element of this domain that is not in the operand.
    pub fn or_not(&mut self, other: &BoundedWordSet) {
        self.write(self.view() | (mask_to(self.domain_size) & !other.view()));
    }

    pub fn intersects(&self, other: &BoundedWordSet) -> bool {
        self.view() & other.view() != 0
    }

    pub fn is_superset(&self, other: &BoundedWordSet) -> bool {
        other.view() & !self.view() == 0
    }
}

impl Clone for BoundedWordSet {
    /// Deep copy: the clone gets its own store.
    fn clone(&self) -> Self {
        Self {
            store: Rc::new(Cell::new(self.store.get())),
            domain_size: self.domain_size,
            complement: self.complement,
        }
    }
}

impl fmt::Debug for BoundedWordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries((0..self.domain_size).filter(|&i| self.contains(i)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_set_basics() {
        let mut set = WordSet::new();
        set.set(0);
        set.set(63);
        assert_eq!(set.len(), 2);
        assert_eq!(set.first(), Some(0));
        assert_eq!(set.last(), Some(63));
        assert_eq!(set.next_present(1), Some(63));
        assert_eq!(set.next_absent(0), 1);
        assert_eq!(set.previous_present(62), Some(0));
        assert_eq!(set.previous_absent(63), Some(62));
        assert!(!set.contains(64));
    }

    #[test]
    fn test_word_set_full_range() {
        let mut set = WordSet::new();
        set.set_range(0..64);
        assert_eq!(set.len(), 64);
        assert_eq!(set.next_absent(0), 64);
        set.flip_range(0..64);
        assert!(set.is_empty());
    }

    #[test]
    #[should_panic(expected = "single-word range")]
    fn test_word_set_overflow_panics() {
        let mut set = WordSet::new();
        set.set(64);
    }

    #[test]
    fn test_word_set_algebra() {
        let mut a = WordSet::new();
        a.extend([1, 2, 3]);
        let mut b = WordSet::new();
        b.extend([2, 3, 4]);
        a.xor(&b);
        assert_eq!(a.store(), bit(1) | bit(4));
        assert!(!a.intersects(&b) || a.contains(4));
        assert!(b.is_superset(&b.clone()));
    }

    #[test]
    fn test_bounded_word_complement() {
        let mut set = BoundedWordSet::new(10);
        set.set(2);
        set.set(4);
        let mut complement = set.complement();
        assert!(set.shares_store_with(&complement));
        assert_eq!(complement.len(), 8);
        assert!(complement.contains(0));
        assert!(!complement.contains(2));
        assert!(!complement.contains(10));

        complement.clear_all();
        assert_eq!(set.len(), 10);
        assert_eq!(set.next_absent(0), 10);
    }

    #[test]
    fn test_bounded_word_polarity_ops() {
        let mut a = BoundedWordSet::new(8);
        a.extend_view([1, 2, 5]);
        let b = {
            let mut b = BoundedWordSet::new(8);
            b.extend_view([2, 3]);
            b.complement() // {0, 1, 4, 5, 6, 7}
        };
        a.and(&b);
        assert_eq!((0..8).filter(|&i| a.contains(i)).collect::<Vec<_>>(), vec![1, 5]);

        let mut c = BoundedWordSet::new(8);
        c.extend_view([0, 7]);
        c.or_not(&b); // adds {2, 3}
        assert_eq!(
            (0..8).filter(|&i| c.contains(i)).collect::<Vec<_>>(),
            vec![0, 2, 3, 7]
        );
    }

    #[test]
    #[should_panic(expected = "too large for domain")]
    fn test_bounded_word_or_domain_check() {
        let mut a = BoundedWordSet::new(4);
        let mut b = BoundedWordSet::new(8);
        b.set(6);
        a.or(&b);
    }

    impl BoundedWordSet {
        fn extend_view(&mut self, indices: impl IntoIterator<Item = usize>) {
            for index in indices {
                self.set(index);
            }
        }
    }
}
