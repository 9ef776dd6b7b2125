//! Sparse representations backed by the word trie.
//!
//! Same layering as the dense pair: `SparseSet` delegates to
//! [`SparseBitVec`], `BoundedSparseSet` adds the domain bound and the
//! shared-store complement view with the four-way polarity algebra.

use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use crate::trie::{SparseBitVec, MAX_BITS};

use super::{check_in_domain, check_range_in_domain};

/// A set of natural numbers backed by the sparse word trie.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SparseSet {
    bits: SparseBitVec,
}

impl SparseSet {
    pub fn new() -> Self {
        Self {
            bits: SparseBitVec::new(),
        }
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: SparseBitVec::with_capacity(bits),
        }
    }

    pub(crate) fn from_bits(bits: SparseBitVec) -> Self {
        Self { bits }
    }

    pub(crate) fn bits(&self) -> &SparseBitVec {
        &self.bits
    }

    pub(crate) fn into_bits(self) -> SparseBitVec {
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
        if from < MAX_BITS {
            self.bits.clear_range(from..MAX_BITS);
        }
    }

    pub fn clear_all(&mut self) {
        self.bits.clear_all();
    }

    pub fn and(&mut self, other: &SparseSet) {
        self.bits.and(&other.bits);
    }

    pub fn and_not(&mut self, other: &SparseSet) {
        self.bits.and_not(&other.bits);
    }

    pub fn or(&mut self, other: &SparseSet) {
        self.bits.or(&other.bits);
    }

    pub fn xor(&mut self, other: &SparseSet) {
        self.bits.xor(&other.bits);
    }

    pub fn intersects(&self, other: &SparseSet) -> bool {
        self.bits.intersects(&other.bits)
    }

    pub fn is_superset(&self, other: &SparseSet) -> bool {
        self.bits.is_superset(&other.bits)
    }
}

impl fmt::Debug for SparseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.bits, f)
    }
}

impl Extend<usize> for SparseSet {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        self.bits.extend(iter);
    }
}

impl FromIterator<usize> for SparseSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

/// A bounded set over `[0, domain_size)` backed by a shared sparse trie.
pub struct BoundedSparseSet {
    store: Rc<RefCell<SparseBitVec>>,
    domain_size: usize,
    complement: bool,
}

impl BoundedSparseSet {
    pub fn new(domain_size: usize) -> Self {
        Self::from_bits(SparseBitVec::with_capacity(domain_size), domain_size)
    }

    pub(crate) fn from_bits(bits: SparseBitVec, domain_size: usize) -> Self {
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

    pub fn complement(&self) -> BoundedSparseSet {
        BoundedSparseSet {
            store: Rc::clone(&self.store),
            domain_size: self.domain_size,
            complement: !self.complement,
        }
    }

    pub fn shares_store_with(&self, other: &BoundedSparseSet) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    fn check_consistency(&self) {
        debug_assert!(self.store.borrow().length() <= self.domain_size);
    }

    fn view_bits(&self) -> SparseBitVec {
        let mut bits = self.store.borrow().clone();
        if self.complement {
            bits.flip_range(0..self.domain_size);
        }
        bits
    }

    fn complement_bits(&self) -> SparseBitVec {
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

    fn fill(&mut self) {
        if self.complement {
            self.store.borrow_mut().clear_all();
        } else {
            self.store.borrow_mut().set_range(0..self.domain_size);
        }
    }

    pub fn and(&mut self, other: &BoundedSparseSet) {
        if Rc::ptr_eq(&self.store, &other.store) {
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

    pub fn and_not(&mut self, other: &BoundedSparseSet) {
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
    pub fn or(&mut self, other: &BoundedSparseSet) {
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
    pub fn xor(&mut self, other: &BoundedSparseSet) {
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
    pub fn or_not(&mut self, other: &BoundedSparseSet) {
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

    pub fn is_superset(&self, other: &BoundedSparseSet) -> bool {
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
        let missing = self.complement().view_bits();
        !missing.intersects(&other.view_bits())
    }

    pub fn intersects(&self, other: &BoundedSparseSet) -> bool {
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

impl Clone for BoundedSparseSet {
    /// Deep copy: the clone gets its own store.
    fn clone(&self) -> Self {
        Self {
            store: Rc::new(RefCell::new(self.store.borrow().clone())),
            domain_size: self.domain_size,
            complement: self.complement,
        }
    }
}

impl fmt::Debug for BoundedSparseSet {
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
