//! The fixed full-range representation.
//!
//! A `RangeSet` is either all of `[0, domain_size)` or, through its
//! complement view, the empty set over that domain. It carries no
//! storage, so it is the cheapest bounded representation when a
//! computation starts from "everything" or "nothing". Mutations that
//! would change the content panic.

use std::fmt;
use std::ops::Range;

use super::{check_in_domain, check_range_in_domain};

/// An immutable bounded set holding exactly `[0, domain_size)`, or
/// nothing when viewed through its complement.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RangeSet {
    domain_size: usize,
    complement: bool,
}

impl RangeSet {
    pub fn full(domain_size: usize) -> Self {
        Self {
            domain_size,
            complement: false,
        }
    }

    pub fn empty(domain_size: usize) -> Self {
        Self {
            domain_size,
            complement: true,
        }
    }

    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    pub(crate) fn is_complement(&self) -> bool {
        self.complement
    }

    /// The complement of an empty domain is still empty, so the flag is
    /// kept in that case.
    pub fn complement(&self) -> RangeSet {
        if self.domain_size == 0 {
            return *self;
        }
        Self {
            domain_size: self.domain_size,
            complement: !self.complement,
        }
    }

    /// There is no backing storage, so two views share state exactly
    /// when they describe the same domain.
    pub fn shares_store_with(&self, other: &RangeSet) -> bool {
        self.domain_size == other.domain_size
    }

    pub fn contains(&self, index: usize) -> bool {
        !self.complement && index < self.domain_size
    }

    pub fn len(&self) -> usize {
        if self.complement {
            0
        } else {
            self.domain_size
        }
    }

    pub fn is_empty(&self) -> bool {
        self.complement || self.domain_size == 0
    }

    pub fn first(&self) -> Option<usize> {
        (!self.is_empty()).then_some(0)
    }

    pub fn last(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.domain_size - 1)
    }

    pub fn next_present(&self, from: usize) -> Option<usize> {
        (!self.complement && from < self.domain_size).then_some(from)
    }

    pub fn next_absent(&self, from: usize) -> usize {
        if self.complement {
            from
        } else {
            from.max(self.domain_size)
        }
    }

    pub fn previous_present(&self, index: usize) -> Option<usize> {
        (!self.is_empty()).then(|| index.min(self.domain_size - 1))
    }

    pub fn previous_absent(&self, index: usize) -> Option<usize> {
        if self.complement || index >= self.domain_size {
            Some(index)
        } else {
            None
        }
    }

    fn frozen() -> ! {
        panic!("fixed range set is immutable")
    }

    /// No-op mutations are permitted, anything else panics.
    pub fn set(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        if !self.contains(index) {
            Self::frozen();
        }
    }

    pub fn clear(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        if self.contains(index) {
            Self::frozen();
        }
    }

    pub fn flip(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        Self::frozen();
    }

    pub fn insert(&mut self, index: usize) -> bool {
        self.set(index);
        false
    }

    pub fn remove(&mut self, index: usize) -> bool {
        self.clear(index);
        false
    }

    pub fn set_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        if self.complement && !range.is_empty() {
            Self::frozen();
        }
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        if !self.complement && !range.is_empty() {
            Self::frozen();
        }
    }

    pub fn flip_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        if !range.is_empty() {
            Self::frozen();
        }
    }

    /// Clears every element in `[from, domain_size)`. Unlike the indexed
    /// mutators, `from == domain_size` is accepted and clears nothing.
    pub fn clear_from(&mut self, from: usize) {
        assert!(
            from <= self.domain_size,
            "index {from} too large for domain [0, {})",
            self.domain_size
        );
        self.clear_range(from..self.domain_size);
    }

    pub fn clear_all(&mut self) {
        if !self.is_empty() {
            Self::frozen();
        }
    }
}

impl fmt::Debug for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.complement {
            f.debug_set().finish()
        } else {
            f.debug_set().entries(0..self.domain_size).finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_range() {
        let set = RangeSet::full(5);
        assert_eq!(set.len(), 5);
        assert!(set.contains(0));
        assert!(set.contains(4));
        assert!(!set.contains(5));
        assert_eq!(set.first(), Some(0));
        assert_eq!(set.last(), Some(4));
        assert_eq!(set.next_present(3), Some(3));
        assert_eq!(set.next_absent(3), 5);
        assert_eq!(set.previous_present(10), Some(4));
        assert_eq!(set.previous_absent(3), None);
    }

    #[test]
    fn test_complement_is_empty() {
        let set = RangeSet::full(5).complement();
        assert!(set.is_empty());
        assert_eq!(set.next_present(0), None);
        assert_eq!(set.next_absent(2), 2);
        assert_eq!(set.previous_absent(2), Some(2));
        assert_eq!(set.complement().len(), 5);
    }

    #[test]
    fn test_empty_domain_complement_is_self() {
        let set = RangeSet::empty(0);
        assert!(set.is_empty());
        assert!(set.complement().is_empty());
    }

    #[test]
    fn test_noop_mutations_pass() {
        let mut set = RangeSet::full(5);
        set.set(3);
        set.set_range(1..4);
        set.clear_range(2..2);
        assert!(!set.insert(3));

        let mut empty = RangeSet::empty(5);
        empty.clear(3);
        empty.clear_all();
        assert!(!empty.remove(3));
    }

    #[test]
    #[should_panic(expected = "immutable")]
    fn test_clear_panics() {
        let mut set = RangeSet::full(5);
        set.clear(3);
    }

    #[test]
    #[should_panic(expected = "too large for domain")]
    fn test_domain_check_precedes_frozen_check() {
        let mut set = RangeSet::full(5);
        set.set(5);
    }
}
