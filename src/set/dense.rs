//! Dense representations backed by the plain bit vector.
//!
//! `DenseSet` is a thin layer over [`BitVec`]. `BoundedDenseSet` adds the
//! domain bound and the shared-store complement view; its bulk operations
//! special-case all four polarity combinations with word algebra on the
//! backing vectors, correcting the boundary range when the operand domain
//! differs.

use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use crate::bitvec::BitVec;

use super::{check_in_domain, check_range_in_domain};

/// A set of natural numbers backed by a dense growable bit vector.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DenseSet {
    bits: BitVec,
}

impl DenseSet {
    pub fn new() -> Self {
        Self {
            bits: BitVec::new(),
        }
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: BitVec::with_capacity(bits),
        }
    }

    pub(crate) fn from_bits(bits: BitVec) -> Self {
        Self { bits }
    }

    pub(crate) fn bits(&self) -> &BitVec {
        &self.bits
    }

    pub(crate) fn into_bits(self) -> BitVec {
        self.bits
    }

    pub fn contains(&self, index: usize) -> bool {
        self.bits.contains(index)
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn first(&self) -> Option<usize> {
        self.bits.next_set_bit(0)
    }

    pub fn last(&self) -> Option<usize> {
        let length = self.bits.length();
        (length > 0).then(|| length - 1)
    }

    pub fn next_present(&self, from: usize) -> Option<usize> {
        self.bits.next_set_bit(from)
    }

    pub fn next_absent(&self, from: usize) -> usize {
        self.bits.next_clear_bit(from)
    }

    pub fn previous_present(&self, index: usize) -> Option<usize> {
        self.bits.previous_set_bit(index)
    }

    pub fn previous_absent(&self, index: usize) -> Option<usize> {
        self.bits.previous_clear_bit(index)
    }

    pub fn set(&mut self, index: usize) {
        self.bits.set(index);
    }

    pub fn clear(&mut self, index: usize) {
        self.bits.clear(index);
    }

    pub fn flip(&mut self, index: usize) {
        self.bits.flip(index);
    }

    pub fn insert(&mut self, index: usize) -> bool {
        self.bits.insert(index)
    }

    pub fn remove(&mut self, index: usize) -> bool {
        self.bits.remove(index)
    }

    pub fn set_range(&mut self, range: Range<usize>) {
        self.bits.set_range(range);
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        self.bits.clear_range(range);
    }

    pub fn flip_range(&mut self, range: Range<usize>) {
        self.bits.flip_range(range);
    }

    pub fn clear_from(&mut self, from: usize) {
        self.bits.clear_range(from..usize::MAX);
    }

    pub fn clear_all(&mut self) {
        self.bits.clear_all();
    }

    pub fn and(&mut self, other: &DenseSet) {
        self.bits.and(&other.bits);
    }

    pub fn and_not(&mut self, other: &DenseSet) {
        self.bits.and_not(&other.bits);
    }

    pub fn or(&mut self, other: &DenseSet) {
        self.bits.or(&other.bits);
    }

    pub fn xor(&mut self, other: &DenseSet) {
        self.bits.xor(&other.bits);
    }

    pub fn intersects(&self, other: &DenseSet) -> bool {
        self.bits.intersects(&other.bits)
    }

    pub fn is_superset(&self, other: &DenseSet) -> bool {
        self.bits.is_superset(&other.bits)
    }
}

impl fmt::Debug for DenseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.bits, f)
    }
}

impl Extend<usize> for DenseSet {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        self.bits.extend(iter);
    }
}

impl FromIterator<usize> for DenseSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

/// A bounded set over `[0, domain_size)` backed by a shared dense bit
/// vector. The backing store never holds a bit at or beyond the domain
/// bound; the complement view reads the same store with inverted polarity.
pub struct BoundedDenseSet {
    store: Rc<RefCell<BitVec>>,
    domain_size: usize,
    complement: bool,
}

impl BoundedDenseSet {
    pub fn new(domain_size: usize) -> Self {
        Self::from_bits(BitVec::with_capacity(domain_size), domain_size)
    }

    pub(crate) fn from_bits(bits: BitVec, domain_size: usize) -> Self {
        debug_assert!(bits.length() <= domain_size);
        Self {
            store: Rc::new(RefCell::new(bits)),
            domain_size,
            complement: false,
        }
    }

    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    pub(crate) fn is_complement(&self) -> bool {
        self.complement
    }

    pub fn complement(&self) -> BoundedDenseSet {
        BoundedDenseSet {
            store: Rc::clone(&self.store),
            domain_size: self.domain_size,
            complement: !self.complement,
        }
    }

    pub fn shares_store_with(&self, other: &BoundedDenseSet) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    fn check_consistency(&self) {
        debug_assert!(self.store.borrow().length() <= self.domain_size);
    }

    /// The backing bits of the *elements* of this view (complement within
    /// the domain when this is a complement view).
    fn view_bits(&self) -> BitVec {
        let mut bits = self.store.borrow().clone();
        if self.complement {
            bits.flip_range(0..self.domain_size);
        }
        bits
    }

    /// The backing store with polarity flipped within the operand domain.
    fn complement_bits(&self) -> BitVec {
        let mut bits = self.store.borrow().clone();
        bits.flip_range(0..self.domain_size);
        bits
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.domain_size && (self.complement ^ self.store.borrow().contains(index))
    }

    pub fn len(&self) -> usize {
        let cardinality = self.store.borrow().len();
        if self.complement {
            self.domain_size - cardinality
        } else {
            cardinality
        }
    }

    pub fn is_empty(&self) -> bool {
        if self.complement {
            self.store.borrow().next_clear_bit(0) >= self.domain_size
        } else {
            self.store.borrow().is_empty()
        }
    }

    pub fn first(&self) -> Option<usize> {
        self.next_present(0)
    }

    pub fn last(&self) -> Option<usize> {
        if self.domain_size == 0 {
            return None;
        }
        self.previous_present(self.domain_size - 1)
    }

    pub fn next_present(&self, from: usize) -> Option<usize> {
        if from >= self.domain_size {
            return None;
        }
        if self.complement {
            let next = self.store.borrow().next_clear_bit(from);
            (next < self.domain_size).then_some(next)
        } else {
            self.store.borrow().next_set_bit(from)
        }
    }

    pub fn next_absent(&self, from: usize) -> usize {
        if from >= self.domain_size {
            return from;
        }
        if self.complement {
            self.store
                .borrow()
                .next_set_bit(from)
                .unwrap_or(self.domain_size)
        } else {
            self.store.borrow().next_clear_bit(from)
        }
    }

    pub fn previous_present(&self, index: usize) -> Option<usize> {
        if self.domain_size == 0 {
            return None;
        }
        let index = index.min(self.domain_size - 1);
        if self.complement {
            self.store.borrow().previous_clear_bit(index)
        } else {
            self.store.borrow().previous_set_bit(index)
        }
    }

    pub fn previous_absent(&self, index: usize) -> Option<usize> {
        if index >= self.domain_size {
            return Some(index);
        }
        if self.complement {
            self.store.borrow().previous_set_bit(index)
        } else {
            self.store.borrow().previous_clear_bit(index)
        }
    }

    /// # Panics
    ///
    /// Panics if `index` is outside the domain.
    pub fn set(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        if self.complement {
            self.store.borrow_mut().clear(index);
        } else {
            self.store.borrow_mut().set(index);
        }
        self.check_consistency();
    }

    pub fn clear(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        if self.complement {
            self.store.borrow_mut().set(index);
        } else {
            self.store.borrow_mut().clear(index);
        }
        self.check_consistency();
    }

    pub fn flip(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        self.store.borrow_mut().flip(index);
        self.check_consistency();
    }

    pub fn insert(&mut self, index: usize) -> bool {
        check_in_domain(index, self.domain_size);
        let changed = if self.complement {
            self.store.borrow_mut().remove(index)
        } else {
            self.store.borrow_mut().insert(index)
        };
        self.check_consistency();
        changed
    }

    pub fn remove(&mut self, index: usize) -> bool {
        check_in_domain(index, self.domain_size);
        let changed = if self.complement {
            self.store.borrow_mut().insert(index)
        } else {
            self.store.borrow_mut().remove(index)
        };
        self.check_consistency();
        changed
    }

    pub fn set_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        if self.complement {
            self.store.borrow_mut().clear_range(range);
        } else {
            self.store.borrow_mut().set_range(range);
        }
        self.check_consistency();
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        if self.complement {
            self.store.borrow_mut().set_range(range);
        } else {
            self.store.borrow_mut().clear_range(range);
        }
        self.check_consistency();
    }

    pub fn flip_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        self.store.borrow_mut().flip_range(range);
        self.check_consistency();
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
        if self.complement {
            self.store.borrow_mut().set_range(0..self.domain_size);
        } else {
            self.store.borrow_mut().clear_all();
        }
    }

    /// Sets every domain element in this view.
    fn fill(&mut self) {
        if self.complement {
            self.store.borrow_mut().clear_all();
        } else {
            self.store.borrow_mut().set_range(0..self.domain_size);
        }
    }

    pub fn and(&mut self, other: &BoundedDenseSet) {
        if Rc::ptr_eq(&self.store, &other.store) {
            // Intersecting with itself or with its own complement view.
            if self.complement != other.complement {
                self.clear_all();
            }
            return;
        }
        let (d, e) = (self.domain_size, other.domain_size);
        let mut store = self.store.borrow_mut();
        if self.complement {
            if other.complement {
                store.or(&other.store.borrow());
            } else {
                store.or(&other.complement_bits());
            }
            if d < e {
                store.clear_range(d..e);
            } else {
                store.set_range(e..d);
            }
        } else if other.complement {
            store.and_not(&other.store.borrow());
            if e < d {
                store.clear_range(e..d);
            }
        } else {
            store.and(&other.store.borrow());
        }
        drop(store);
        self.check_consistency();
    }

    pub fn and_not(&mut self, other: &BoundedDenseSet) {
        if Rc::ptr_eq(&self.store, &other.store) {
            if self.complement == other.complement {
                self.clear_all();
            }
            return;
        }
        let (d, e) = (self.domain_size, other.domain_size);
        let mut store = self.store.borrow_mut();
        if self.complement {
            if other.complement {
                store.or(&other.complement_bits());
            } else {
                store.or(&other.store.borrow());
            }
            if d < e {
                store.clear_range(d..e);
            }
        } else if other.complement {
            if e < d {
                let mut operand = other.store.borrow().clone();
                operand.set_range(e..d);
                store.and(&operand);
            } else {
                store.and(&other.store.borrow());
            }
        } else {
            store.and_not(&other.store.borrow());
        }
        drop(store);
        self.check_consistency();
    }

    /// # Panics
    ///
    /// Panics if the operand holds an element outside this domain.
    pub fn or(&mut self, other: &BoundedDenseSet) {
        if Rc::ptr_eq(&self.store, &other.store) {
            if self.complement != other.complement {
                self.fill();
            }
            return;
        }
        let Some(last) = other.last() else { return };
        check_in_domain(last, self.domain_size);
        let (d, e) = (self.domain_size, other.domain_size);
        let mut store = self.store.borrow_mut();
        if self.complement {
            if other.complement {
                if e < d {
                    let mut operand = other.store.borrow().clone();
                    operand.set_range(e..d);
                    store.and(&operand);
                } else {
                    store.and(&other.store.borrow());
                }
            } else {
                store.and_not(&other.store.borrow());
            }
        } else if other.complement {
            store.or(&other.complement_bits());
        } else {
            store.or(&other.store.borrow());
        }
        drop(store);
        self.check_consistency();
    }

    /// # Panics
    ///
    /// Panics if the operand domain is larger than this domain.
    pub fn xor(&mut self, other: &BoundedDenseSet) {
        if Rc::ptr_eq(&self.store, &other.store) {
            if self.complement == other.complement {
                self.clear_all();
            } else {
                self.fill();
            }
            return;
        }
        let (d, e) = (self.domain_size, other.domain_size);
        assert!(
            e <= d,
            "operand domain [0, {e}) too large for domain [0, {d})"
        );
        if other.is_empty() {
            return;
        }
        let mut store = self.store.borrow_mut();
        store.xor(&other.store.borrow());
        if other.complement {
            store.flip_range(0..e);
        }
        drop(store);
        self.check_consistency();
    }

    /// Adds every element of this domain that is not in the operand.
    pub fn or_not(&mut self, other: &BoundedDenseSet) {
        if Rc::ptr_eq(&self.store, &other.store) {
            if self.complement == other.complement {
                self.fill();
            }
            return;
        }
        if other.is_empty() {
            self.fill();
            return;
        }
        let (d, e) = (self.domain_size, other.domain_size);
        let mut store = self.store.borrow_mut();
        if self.complement {
            if other.complement {
                store.and_not(&other.store.borrow());
                if e < d {
                    store.clear_range(e..d);
                }
            } else {
                store.and(&other.store.borrow());
            }
        } else {
            if other.complement {
                store.or(&other.store.borrow());
            } else {
                let mut operand = other.store.borrow().clone();
                operand.flip_range(0..d.min(e));
                store.or(&operand);
            }
            if e < d {
                store.set_range(e..d);
            } else {
                store.clear_range(d..e);
            }
        }
        drop(store);
        self.check_consistency();
    }

    pub fn is_superset(&self, other: &BoundedDenseSet) -> bool {
        if self.is_empty() {
            return other.is_empty();
        }
        if other.is_empty() {
            return true;
        }
        let other_last = other.last().unwrap_or(0);
        if other_last >= self.domain_size || self.last() < Some(other_last) {
            return false;
        }
        // No element of the operand may fall on an unset index of this view.
        let missing = self.complement().view_bits();
        !missing.intersects(&other.view_bits())
    }

    pub fn intersects(&self, other: &BoundedDenseSet) -> bool {
        if Rc::ptr_eq(&self.store, &other.store) {
            return if self.complement == other.complement {
                !self.is_empty()
            } else {
                false
            };
        }
        self.view_bits().intersects(&other.view_bits())
    }
}

impl Clone for BoundedDenseSet {
    /// Deep copy: the clone gets its own store.
    fn clone(&self) -> Self {
        Self {
            store: Rc::new(RefCell::new(self.store.borrow().clone())),
            domain_size: self.domain_size,
            complement: self.complement,
        }
    }
}

impl fmt::Debug for BoundedDenseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        let mut next = self.next_present(0);
        while let Some(index) = next {
            set.entry(&index);
            next = self.next_present(index + 1);
        }
        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(domain: usize, elements: &[usize]) -> BoundedDenseSet {
        let mut set = BoundedDenseSet::new(domain);
        for &element in elements {
            set.set(element);
        }
        set
    }

    fn elements(set: &BoundedDenseSet) -> Vec<usize> {
        let mut out = Vec::new();
        let mut next = set.next_present(0);
        while let Some(index) = next {
            out.push(index);
            next = set.next_present(index + 1);
        }
        out
    }

    #[test]
    fn test_complement_view_shares_store() {
        let mut set = bounded(10, &[2, 4, 6]);
        let complement = set.complement();
        assert!(set.shares_store_with(&complement));
        assert_eq!(elements(&complement), vec![0, 1, 3, 5, 7, 8, 9]);

        set.set(0);
        assert!(!complement.contains(0));
        assert_eq!(complement.len(), 6);
    }

    #[test]
    fn test_complement_round_trip_identity() {
        let set = bounded(8, &[1]);
        let back = set.complement().complement();
        assert!(set.shares_store_with(&back));
        assert_eq!(set.is_complement(), back.is_complement());
    }

    #[test]
    fn test_polarity_and() {
        // direct and complement, matching domains
        let mut a = bounded(10, &[1, 3, 5, 7]);
        let b = bounded(10, &[3, 4, 5]).complement();
        a.and(&b);
        assert_eq!(elements(&a), vec![1, 7]);

        // complement and complement
        let mut c = bounded(10, &[0, 1]).complement();
        let d = bounded(10, &[1, 2]).complement();
        c.and(&d);
        assert_eq!(elements(&c), (3..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_polarity_and_cross_domain() {
        // complement view with a larger operand domain
        let mut a = bounded(6, &[0, 1]).complement(); // {2, 3, 4, 5}
        let b = bounded(9, &[2, 3]); // direct
        a.and(&b);
        assert_eq!(elements(&a), vec![2, 3]);

        // complement view with a smaller operand domain
        let mut c = bounded(9, &[7]).complement(); // {0..7} minus nothing above
        let d = bounded(4, &[1, 2]);
        c.and(&d);
        assert_eq!(elements(&c), vec![1, 2]);
    }

    #[test]
    fn test_polarity_or_and_xor() {
        let mut a = bounded(10, &[0, 9]);
        let b = bounded(8, &[1, 2]).complement(); // {0, 3, 4, 5, 6, 7}
        a.or(&b);
        assert_eq!(elements(&a), vec![0, 3, 4, 5, 6, 7, 9]);

        let mut c = bounded(10, &[0, 1, 2]);
        let d = bounded(8, &[0]).complement(); // {1..8}
        c.xor(&d);
        assert_eq!(elements(&c), vec![0, 3, 4, 5, 6, 7]);
    }

    #[test]
    #[should_panic(expected = "too large for domain")]
    fn test_or_rejects_foreign_elements() {
        let mut a = bounded(4, &[0]);
        let b = bounded(10, &[7]);
        a.or(&b);
    }

    #[test]
    fn test_or_not() {
        let mut a = bounded(10, &[0]);
        let b = bounded(10, &[1, 2]);
        a.or_not(&b); // adds {0, 3..9}
        assert_eq!(elements(&a), vec![0, 3, 4, 5, 6, 7, 8, 9]);

        let mut c = bounded(10, &[5]);
        let d = bounded(6, &[0, 1, 2, 3, 4, 5]);
        c.or_not(&d); // domain tail [6, 10) is not in the operand
        assert_eq!(elements(&c), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_self_aliasing_resolution() {
        let mut set = bounded(10, &[2, 4]);
        let complement = set.complement();

        let mut union = set.clone();
        union.or(&set.complement()); // a ∪ ~a = domain
        assert_eq!(union.len(), 10);

        set.and(&complement); // a ∩ ~a = ∅
        assert!(set.is_empty());
        assert_eq!(complement.len(), 10);
    }

    #[test]
    fn test_domain_boundary_reads() {
        let set = bounded(5, &[1, 4]);
        assert!(!set.contains(5));
        assert_eq!(set.next_absent(7), 7);
        assert_eq!(set.next_present(5), None);
        assert_eq!(set.previous_absent(9), Some(9));
        assert_eq!(set.previous_present(100), Some(4));
    }

    #[test]
    fn test_failed_mutation_leaves_content() {
        let mut set = bounded(5, &[1]);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| set.set(5)));
        assert!(result.is_err());
        assert_eq!(elements(&set), vec![1]);
    }

    #[test]
    fn test_is_superset_and_intersects() {
        let a = bounded(10, &[1, 2]).complement(); // {0, 3..9}
        let b = bounded(10, &[3, 4]);
        assert!(a.is_superset(&b));
        assert!(!b.is_superset(&a));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&bounded(10, &[1, 2])));
    }
}
