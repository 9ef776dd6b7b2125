//! Set representations over the natural numbers.
//!
//! The unbounded representations grow on demand; the bounded ones carry a
//! fixed domain `[0, domain_size)` and support O(1) complement views that
//! share the backing store. [`NatSet`] and [`BoundedNatSet`] are the enums
//! tying them together; the factory picks a representation from size
//! hints.

mod bitmap;
mod bounded;
mod dense;
mod fixed;
mod singleton;
mod sparse;
mod word;
mod wrapper;

pub use bitmap::{BitmapSet, BoundedBitmapSet};
pub use bounded::BoundedNatSet;
pub use dense::{BoundedDenseSet, DenseSet};
pub use fixed::RangeSet;
pub use singleton::{BoundedSingletonSet, SingletonSet};
pub use sparse::{BoundedSparseSet, SparseSet};
pub use word::{BoundedWordSet, WordSet};
pub use wrapper::BoundedWrapper;

use std::fmt;
use std::ops::Range;

pub(crate) fn check_range(from: usize, to: usize) {
    assert!(from <= to, "invalid range {from}..{to}");
}

pub(crate) fn check_in_domain(index: usize, domain_size: usize) {
    assert!(
        index < domain_size,
        "index {index} too large for domain [0, {domain_size})"
    );
}

pub(crate) fn check_range_in_domain(from: usize, to: usize, domain_size: usize) {
    check_range(from, to);
    assert!(
        to <= domain_size,
        "end {to} too large for domain [0, {domain_size})"
    );
}

/// A mutable set of natural numbers.
///
/// All representations answer the same queries; they differ in memory
/// profile and in which mutations they accept (a singleton panics on a
/// second element, a word set on indices past 63).
#[derive(Clone)]
pub enum NatSet {
    Singleton(SingletonSet),
    Word(WordSet),
    Dense(DenseSet),
    Sparse(SparseSet),
    Bitmap(BitmapSet),
    Bounded(BoundedNatSet),
}

macro_rules! dispatch {
    ($value:expr, $set:ident => $body:expr) => {
        match $value {
            NatSet::Singleton($set) => $body,
            NatSet::Word($set) => $body,
            NatSet::Dense($set) => $body,
            NatSet::Sparse($set) => $body,
            NatSet::Bitmap($set) => $body,
            NatSet::Bounded($set) => $body,
        }
    };
}

impl NatSet {
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

    /// The smallest present index at or above `from`.
    pub fn next_present(&self, from: usize) -> Option<usize> {
        dispatch!(self, set => set.next_present(from))
    }

    /// The smallest absent index at or above `from`.
    pub fn next_absent(&self, from: usize) -> usize {
        dispatch!(self, set => set.next_absent(from))
    }

    /// The largest present index at or below `index`.
    pub fn previous_present(&self, index: usize) -> Option<usize> {
        dispatch!(self, set => set.previous_present(index))
    }

    /// The largest absent index at or below `index`.
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

    pub fn and(&mut self, other: &NatSet) {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.and(b),
            (Self::Dense(a), Self::Dense(b)) => a.and(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.and(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.and(b),
            (Self::Bounded(a), Self::Bounded(b)) => a.and(b),
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

    pub fn and_not(&mut self, other: &NatSet) {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.and_not(b),
            (Self::Dense(a), Self::Dense(b)) => a.and_not(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.and_not(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.and_not(b),
            (Self::Bounded(a), Self::Bounded(b)) => a.and_not(b),
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
    /// Panics if the receiving representation cannot hold an operand
    /// element.
    pub fn or(&mut self, other: &NatSet) {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.or(b),
            (Self::Dense(a), Self::Dense(b)) => a.or(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.or(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.or(b),
            (Self::Bounded(a), Self::Bounded(b)) => a.or(b),
            (this, other) => {
                for index in other.elements() {
                    this.set(index);
                }
            }
        }
    }

    pub fn xor(&mut self, other: &NatSet) {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.xor(b),
            (Self::Dense(a), Self::Dense(b)) => a.xor(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.xor(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.xor(b),
            (Self::Bounded(a), Self::Bounded(b)) => a.xor(b),
            (this, other) => {
                for index in other.elements() {
                    this.flip(index);
                }
            }
        }
    }

    pub fn intersects(&self, other: &NatSet) -> bool {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.intersects(b),
            (Self::Dense(a), Self::Dense(b)) => a.intersects(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.intersects(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.intersects(b),
            (Self::Bounded(a), Self::Bounded(b)) => a.intersects(b),
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

    pub fn is_superset(&self, other: &NatSet) -> bool {
        match (self, other) {
            (Self::Word(a), Self::Word(b)) => a.is_superset(b),
            (Self::Dense(a), Self::Dense(b)) => a.is_superset(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.is_superset(b),
            (Self::Bitmap(a), Self::Bitmap(b)) => a.is_superset(b),
            (Self::Bounded(a), Self::Bounded(b)) => a.is_superset(b),
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

impl Default for NatSet {
    fn default() -> Self {
        Self::Sparse(SparseSet::new())
    }
}

/// Content equality, independent of representation.
impl PartialEq for NatSet {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Singleton(a), Self::Singleton(b)) => a == b,
            (Self::Word(a), Self::Word(b)) => a == b,
            (Self::Dense(a), Self::Dense(b)) => a == b,
            (Self::Sparse(a), Self::Sparse(b)) => a == b,
            (Self::Bitmap(a), Self::Bitmap(b)) => a == b,
            _ => {
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
    }
}

impl Eq for NatSet {}

impl Extend<usize> for NatSet {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for index in iter {
            self.set(index);
        }
    }
}

impl FromIterator<usize> for NatSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self::Sparse(iter.into_iter().collect())
    }
}

impl fmt::Debug for NatSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, set => fmt::Debug::fmt(set, f))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use test_log::test;

    use super::*;

    fn sparse(elements: &[usize]) -> NatSet {
        NatSet::Sparse(elements.iter().copied().collect())
    }

    fn bitmap(elements: &[usize]) -> NatSet {
        NatSet::Bitmap(elements.iter().copied().collect())
    }

    #[test]
    fn test_cross_representation_equality() {
        let elements = [0, 63, 64, 1_000];
        let mut dense = NatSet::Dense(DenseSet::new());
        dense.extend(elements);
        assert_eq!(dense, sparse(&elements));
        assert_eq!(sparse(&elements), bitmap(&elements));
        assert_ne!(sparse(&elements), sparse(&[0, 63, 64]));
    }

    #[test]
    fn test_mixed_bulk_ops() {
        let mut a = sparse(&[1, 2, 3, 100]);
        a.and(&bitmap(&[2, 3, 4]));
        assert_eq!(a, sparse(&[2, 3]));

        a.or(&bitmap(&[10, 11]));
        assert_eq!(a, sparse(&[2, 3, 10, 11]));

        a.xor(&bitmap(&[11, 12]));
        assert_eq!(a, sparse(&[2, 3, 10, 12]));

        a.and_not(&bitmap(&[2, 12]));
        assert_eq!(a, sparse(&[3, 10]));

        assert!(a.intersects(&bitmap(&[10])));
        assert!(!a.intersects(&bitmap(&[11])));
        assert!(a.is_superset(&bitmap(&[3])));
        assert!(!a.is_superset(&bitmap(&[3, 4])));
    }

    #[test]
    fn test_bounded_variant_round_trip() {
        let mut bounded = NatSet::Bounded(BoundedNatSet::Dense(BoundedDenseSet::new(10)));
        bounded.extend([2, 4, 6]);
        assert_eq!(bounded.len(), 3);
        assert_eq!(bounded, sparse(&[2, 4, 6]));
        assert_eq!(bounded.next_absent(2), 3);
        bounded.clear_from(4);
        assert_eq!(bounded, sparse(&[2]));
    }

    #[test]
    fn test_randomized_against_reference() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for round in 0..20 {
            let mut set = match round % 3 {
                0 => NatSet::Dense(DenseSet::new()),
                1 => NatSet::Sparse(SparseSet::new()),
                _ => NatSet::Bitmap(BitmapSet::new()),
            };
            let mut reference = BTreeSet::new();

            for _ in 0..500 {
                let index = rng.gen_range(0..2_000);
                match rng.gen_range(0..4) {
                    0 => {
                        set.set(index);
                        reference.insert(index);
                    }
                    1 => {
                        set.clear(index);
                        reference.remove(&index);
                    }
                    2 => {
                        assert_eq!(set.insert(index), reference.insert(index));
                    }
                    _ => {
                        if set.contains(index) {
                            set.flip(index);
                            reference.remove(&index);
                        } else {
                            set.flip(index);
                            reference.insert(index);
                        }
                    }
                }
            }

            assert_eq!(set.len(), reference.len());
            assert_eq!(set.elements(), reference.iter().copied().collect::<Vec<_>>());
            assert_eq!(set.first(), reference.first().copied());
            assert_eq!(set.last(), reference.last().copied());
            for probe in [0, 1, 63, 64, 999, 1_999] {
                assert_eq!(
                    set.next_present(probe),
                    reference.range(probe..).next().copied()
                );
                assert_eq!(
                    set.previous_present(probe),
                    reference.range(..=probe).next_back().copied()
                );
            }
        }
    }

    /// One representation per kind index; bounded kinds share `domain`
    /// so every bulk pairing is legal.
    fn build(kind: usize, domain: usize, elements: &[usize]) -> NatSet {
        let mut set = match kind {
            0 => NatSet::Word(WordSet::new()),
            1 => NatSet::Dense(DenseSet::new()),
            2 => NatSet::Sparse(SparseSet::new()),
            3 => NatSet::Bitmap(BitmapSet::new()),
            4 => NatSet::Bounded(BoundedNatSet::Dense(BoundedDenseSet::new(domain))),
            _ => {
                let mut view = NatSet::Bounded(BoundedNatSet::Sparse(
                    BoundedSparseSet::new(domain).complement(),
                ));
                view.clear_all();
                view
            }
        };
        set.extend(elements.iter().copied());
        set
    }

    #[test]
    fn test_randomized_bulk_ops_against_reference() {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        for _ in 0..80 {
            // The single-word representation only joins rounds whose
            // universe fits in one word.
            let domain = if rng.gen_bool(0.3) { 64 } else { 256 };
            let kinds = if domain == 64 { 0..6 } else { 1..6 };
            let kind_a = rng.gen_range(kinds.clone());
            let kind_b = rng.gen_range(kinds);

            let a_elems: Vec<usize> = (0..rng.gen_range(0..40))
                .map(|_| rng.gen_range(0..domain))
                .collect();
            let b_elems: Vec<usize> = (0..rng.gen_range(0..40))
                .map(|_| rng.gen_range(0..domain))
                .collect();
            let a_ref: BTreeSet<usize> = a_elems.iter().copied().collect();
            let b_ref: BTreeSet<usize> = b_elems.iter().copied().collect();

            let mut a = build(kind_a, domain, &a_elems);
            let b = build(kind_b, domain, &b_elems);
            assert_eq!(a.intersects(&b), !a_ref.is_disjoint(&b_ref));
            assert_eq!(a.is_superset(&b), a_ref.is_superset(&b_ref));

            let both_bounded = kind_a >= 4 && kind_b >= 4;
            let op = rng.gen_range(0..if both_bounded { 5 } else { 4 });
            let expected: BTreeSet<usize> = match op {
                0 => a_ref.intersection(&b_ref).copied().collect(),
                1 => a_ref.union(&b_ref).copied().collect(),
                2 => a_ref.symmetric_difference(&b_ref).copied().collect(),
                3 => a_ref.difference(&b_ref).copied().collect(),
                _ => (0..domain)
                    .filter(|index| a_ref.contains(index) || !b_ref.contains(index))
                    .collect(),
            };

            match op {
                0 => a.and(&b),
                1 => a.or(&b),
                2 => a.xor(&b),
                3 => a.and_not(&b),
                _ => {
                    let (NatSet::Bounded(lhs), NatSet::Bounded(rhs)) = (&mut a, &b) else {
                        unreachable!();
                    };
                    lhs.or_not(rhs);
                }
            }

            assert_eq!(a.len(), expected.len(), "kinds {kind_a}/{kind_b} op {op}");
            assert_eq!(
                a.elements(),
                expected.iter().copied().collect::<Vec<_>>(),
                "kinds {kind_a}/{kind_b} op {op}"
            );
        }
    }
}
