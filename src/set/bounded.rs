//! The bounded set enum.
//!
//! Every bounded representation lives behind one enum so callers can hold
//! "some bounded set over `[0, domain_size)`" without caring how it is
//! stored. Bulk operations between matching representations use the
//! native word or bitmap algebra; mixed pairs fall back to element-wise
//! loops driven by the navigation queries.

use std::fmt;
use std::ops::Range;

use super::bitmap::BoundedBitmapSet;
use super::dense::BoundedDenseSet;
use super::fixed::RangeSet;
use super::singleton::BoundedSingletonSet;
use super::sparse::BoundedSparseSet;
use super::word::BoundedWordSet;
use super::wrapper::BoundedWrapper;

#[derive(Clone)]
pub enum BoundedNatSet {
    Singleton(BoundedSingletonSet),
    Word(BoundedWordSet),
    Dense(BoundedDenseSet),
    Sparse(BoundedSparseSet),
    Bitmap(BoundedBitmapSet),
    Range(RangeSet),
    Wrapper(BoundedWrapper),
}

macro_rules! dispatch {
    ($value:expr, $set:ident => $body:expr) => {
        match $value {
            BoundedNatSet::Singleton($set) => $body,
            BoundedNatSet::Word($set) => $body,
            BoundedNatSet::Dense($set) => $body,
            BoundedNatSet::Sparse($set) => $body,
            BoundedNatSet::Bitmap($set) => $body,
            BoundedNatSet::Range($set) => $body,
            BoundedNatSet::Wrapper($set) => $body,
        }
    };
}

impl BoundedNatSet {
    pub fn domain_size(&self) -> usize {
        dispatch!(self, set => set.domain_size())
    }

    pub(crate) fn is_complement(&self) -> bool {
        dispatch!(self, set => set.is_complement())
    }

    /// The O(1) complement view over the same store.
    pub fn complement(&self) -> BoundedNatSet {
        match self {
            Self::Singleton(set) => Self::Singleton(set.complement()),
            Self::Word(set) => Self::Word(set.complement()),
            Self::Dense(set) => Self::Dense(set.complement()),
            Self::Sparse(set) => Self::Sparse(set.complement()),
            Self::Bitmap(set) => Self::Bitmap(set.complement()),
            Self::Range(set) => Self::Range(set.complement()),
            Self::Wrapper(set) => Self::Wrapper(set.complement()),
        }
    }

    /// Whether both views read and write the same backing store.
    pub fn shares_store_with(&self, other: &BoundedNatSet) -> bool {
        match (self, other) {
            (Self::Singleton(a), Self::Singleton(b)) => a.shares_store_with(b),
            (Self::Word(a), Self::Word(b)) => a.shares_store_with(b),
            (Self::Dense(a), Self::Dense(b)) => a.shares_store_with(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.shares_store_with(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.shares_store_with(b),
            (Self::Range(a), Self::Range(b)) => a.shares_store_with(b),
            (Self::Wrapper(a), Self::Wrapper(b)) => a.shares_store_with(b),
            _ => false,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        dispatch!(self, set => set.contains(index))
    }

    pub fn len(&self) -> usize {
        dispatch!(self, set => set.len())
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, set => set.is_empty())
    }

    pub fn first(&self) -> Option<usize> {
        dispatch!(self, set => set.first())
    }

    pub fn last(&self) -> Option<usize> {
        dispatch!(self, set => set.last())
    }

    pub fn next_present(&self, from: usize) -> Option<usize> {
        dispatch!(self, set => set.next_present(from))
    }

    pub fn next_absent(&self, from: usize) -> usize {
        dispatch!(self, set => set.next_absent(from))
    }

    pub fn previous_present(&self, index: usize) -> Option<usize> {
        dispatch!(self, set => set.previous_present(index))
    }

    pub fn previous_absent(&self, index: usize) -> Option<usize> {
        dispatch!(self, set => set.previous_absent(index))
    }

    pub fn set(&mut self, index: usize) {
        dispatch!(self, set => set.set(index));
    }

    pub fn clear(&mut self, index: usize) {
        dispatch!(self, set => set.clear(index));
    }

    pub fn flip(&mut self, index: usize) {
        dispatch!(self, set => set.flip(index));
    }

    pub fn insert(&mut self, index: usize) -> bool {
        dispatch!(self, set => set.insert(index))
    }

    pub fn remove(&mut self, index: usize) -> bool {
        dispatch!(self, set => set.remove(index))
    }

    pub fn set_range(&mut self, range: Range<usize>) {
        dispatch!(self, set => set.set_range(range));
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        dispatch!(self, set => set.clear_range(range));
    }

    pub fn flip_range(&mut self, range: Range<usize>) {
        dispatch!(self, set => set.flip_range(range));
    }

    /// Clears every element in `[from, domain_size)`. Unlike the indexed
    /// mutators, `from == domain_size` is accepted and clears nothing.
    pub fn clear_from(&mut self, from: usize) {
        dispatch!(self, set => set.clear_from(from));
    }

    pub fn clear_all(&mut self) {
        dispatch!(self, set => set.clear_all());
    }

    fn elements(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut next = self.next_present(0);
        while let Some(index) = next {
            out.push(index);
            next = self.next_present(index + 1);
        }
        out
    }

    pub fn and(&mut self, other: &BoundedNatSet) {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.and(b),
            (Self::Dense(a), Self::Dense(b)) => a.and(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.and(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.and(b),
            (this, other) => {
                let dropped: Vec<usize> = this
                    .elements()
                    .into_iter()
                    .filter(|&index| !other.contains(index))
                    .collect();
                for index in dropped {
                    this.clear(index);
                }
            }
        }
    }

    pub fn and_not(&mut self, other: &BoundedNatSet) {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.and_not(b),
            (Self::Dense(a), Self::Dense(b)) => a.and_not(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.and_not(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.and_not(b),
            (this, other) => {
                let dropped: Vec<usize> = this
                    .elements()
                    .into_iter()
                    .filter(|&index| other.contains(index))
                    .collect();
                for index in dropped {
                    this.clear(index);
                }
            }
        }
    }

    /// # Panics
    ///
    /// Panics if the operand holds an element outside this domain.
    pub fn or(&mut self, other: &BoundedNatSet) {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.or(b),
            (Self::Dense(a), Self::Dense(b)) => a.or(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.or(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.or(b),
            (this, other) => {
                for index in other.elements() {
                    this.set(index);
                }
            }
        }
    }

    /// # Panics
    ///
    /// Panics if the operand domain is larger than this domain.
    pub fn xor(&mut self, other: &BoundedNatSet) {
        assert!(
            other.domain_size() <= self.domain_size(),
            "operand domain [0, {}) too large for domain [0, {})",
            other.domain_size(),
            self.domain_size()
        );
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.xor(b),
            (Self::Dense(a), Self::Dense(b)) => a.xor(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.xor(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.xor(b),
            (this, other) => {
                for index in other.elements() {
                    this.flip(index);
                }
            }
        }
    }

    /// Adds every element of this domain that is not in the operand.
    pub fn or_not(&mut self, other: &BoundedNatSet) {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.or_not(b),
            (Self::Dense(a), Self::Dense(b)) => a.or_not(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.or_not(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.or_not(b),
            (this, other) => {
                let missing: Vec<usize> = (0..this.domain_size())
                    .filter(|&index| !other.contains(index))
                    .collect();
                for index in missing {
                    this.set(index);
                }
            }
        }
    }

    pub fn intersects(&self, other: &BoundedNatSet) -> bool {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.intersects(b),
            (Self::Dense(a), Self::Dense(b)) => a.intersects(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.intersects(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.intersects(b),
            _ => {
                let mut next = self.next_present(0);
                while let Some(index) = next {
                    if other.contains(index) {
                        return true;
                    }
                    next = self.next_present(index + 1);
                }
                false
            }
        }
    }

    pub fn is_superset(&self, other: &BoundedNatSet) -> bool {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.is_superset(b),
            (Self::Dense(a), Self::Dense(b)) => a.is_superset(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.is_superset(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.is_superset(b),
            _ => {
                let mut next = other.next_present(0);
                while let Some(index) = next {
                    if !self.contains(index) {
                        return false;
                    }
                    next = other.next_present(index + 1);
                }
                true
            }
        }
    }
}

/// Content equality, independent of representation and domain size.
impl PartialEq for BoundedNatSet {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut next = self.next_present(0);
        while let Some(index) = next {
            if !other.contains(index) {
                return false;
            }
            next = self.next_present(index + 1);
        }
        true
    }
}

impl Eq for BoundedNatSet {}

impl Extend<usize> for BoundedNatSet {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for index in iter {
            self.set(index);
        }
    }
}

impl fmt::Debug for BoundedNatSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, set => fmt::Debug::fmt(set, f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(domain: usize, elements: &[usize]) -> BoundedNatSet {
        let mut set = BoundedNatSet::Dense(BoundedDenseSet::new(domain));
        set.extend(elements.iter().copied());
        set
    }

    fn word(domain: usize, elements: &[usize]) -> BoundedNatSet {
        let mut set = BoundedNatSet::Word(BoundedWordSet::new(domain));
        set.extend(elements.iter().copied());
        set
    }

    #[test]
    fn test_complement_views_stay_in_sync() {
        let set = dense(10, &[2, 4, 6]);
        let mut complement = set.complement();
        assert!(set.shares_store_with(&complement));
        assert_eq!(complement.elements(), vec![0, 1, 3, 5, 7, 8, 9]);

        // Emptying the complement view fills the original.
        complement.clear_all();
        assert_eq!(set.len(), 10);

        // Filling the complement view through extend empties the original.
        complement.extend(0..10);
        assert!(set.is_empty());
        assert!(complement.complement().is_empty());
    }

    #[test]
    fn test_mixed_representation_ops() {
        let mut a = dense(100, &[1, 5, 64, 99]);
        let b = word(64, &[5, 7]);
        a.and(&b);
        assert_eq!(a.elements(), vec![5]);

        let mut c = word(64, &[0]);
        c.or(&dense(32, &[3, 4]));
        assert_eq!(c.elements(), vec![0, 3, 4]);

        let mut d = dense(20, &[0, 1]);
        d.xor(&word(20, &[1, 2]));
        assert_eq!(d.elements(), vec![0, 2]);

        let mut e = word(8, &[0]);
        e.or_not(&dense(8, &[1, 2]));
        assert_eq!(e.elements(), vec![0, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_mixed_or_not_against_complement_view() {
        let base = dense(8, &[1, 2]);
        let mut set = word(8, &[]);
        set.or_not(&base.complement()); // everything not in {0, 3..7}
        assert_eq!(set.elements(), vec![1, 2]);
    }

    #[test]
    #[should_panic(expected = "too large for domain")]
    fn test_mixed_or_rejects_foreign_elements() {
        let mut a = word(4, &[]);
        a.or(&dense(10, &[7]));
    }

    #[test]
    #[should_panic(expected = "too large for domain")]
    fn test_xor_rejects_larger_operand_domain() {
        let mut a = word(4, &[]);
        a.xor(&dense(10, &[]));
    }

    #[test]
    fn test_range_variant_participates_readonly() {
        let full = BoundedNatSet::Range(RangeSet::full(6));
        let mut set = dense(10, &[0, 7]);
        set.and(&full);
        assert_eq!(set.elements(), vec![0]);
        assert!(full.is_superset(&dense(10, &[2, 3])));
        assert!(!full.is_superset(&dense(10, &[6])));
    }

    #[test]
    fn test_content_equality_across_representations() {
        assert_eq!(dense(100, &[1, 2]), word(10, &[1, 2]));
        assert_ne!(dense(100, &[1, 2]), word(10, &[1, 3]));
        assert_eq!(
            dense(10, &[0, 1]).complement(),
            dense(12, &[0, 1, 10, 11]).complement()
        );
    }

    #[test]
    fn test_clear_from_accepts_domain_boundary() {
        for mut set in [
            dense(8, &[1, 7]),
            word(8, &[1, 7]),
            dense(8, &[1, 7]).complement(),
        ] {
            let before = set.elements();
            set.clear_from(8);
            assert_eq!(set.elements(), before);
            set.clear_from(2);
            assert!(set.last().is_none_or(|last| last < 2));
        }
    }

    #[test]
    #[should_panic(expected = "too large for domain")]
    fn test_clear_from_rejects_past_domain() {
        let mut set = dense(8, &[1]);
        set.clear_from(9);
    }

    #[test]
    fn test_singleton_variant() {
        let mut set = BoundedNatSet::Singleton(BoundedSingletonSet::new(5));
        set.set(3);
        assert_eq!(set.elements(), vec![3]);
        let complement = set.complement();
        assert_eq!(complement.elements(), vec![0, 1, 2, 4]);
        assert!(set.shares_store_with(&complement));
    }
}
