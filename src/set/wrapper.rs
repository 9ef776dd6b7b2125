//! Bounded adapter around an arbitrary unbounded set.
//!
//! Used when a set has to gain a domain bound without changing its
//! representation. The delegate is shared, so complement views stay in
//! sync the same way the native bounded representations do. The
//! delegate never holds an element at or above the domain size.

use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use super::{check_in_domain, check_range_in_domain, NatSet};

pub struct BoundedWrapper {
    delegate: Rc<RefCell<NatSet>>,
    domain_size: usize,
    complement: bool,
}

impl BoundedWrapper {
    /// # Panics
    ///
    /// Panics if the delegate holds an element outside the domain.
    pub fn new(delegate: NatSet, domain_size: usize) -> Self {
        if let Some(last) = delegate.last() {
            check_in_domain(last, domain_size);
        }
        Self {
            delegate: Rc::new(RefCell::new(delegate)),
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

    pub fn complement(&self) -> BoundedWrapper {
        BoundedWrapper {
            delegate: Rc::clone(&self.delegate),
            domain_size: self.domain_size,
            complement: !self.complement,
        }
    }

    pub fn shares_store_with(&self, other: &BoundedWrapper) -> bool {
        Rc::ptr_eq(&self.delegate, &other.delegate)
    }

    fn check_consistency(&self) {
        debug_assert!(self
            .delegate
            .borrow()
            .last()
            .is_none_or(|last| last < self.domain_size));
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.domain_size && (self.complement ^ self.delegate.borrow().contains(index))
    }

    pub fn len(&self) -> usize {
        let cardinality = self.delegate.borrow().len();
        if self.complement {
            self.domain_size - cardinality
        } else {
            cardinality
        }
    }

    pub fn is_empty(&self) -> bool {
        if self.complement {
            self.delegate.borrow().next_absent(0) >= self.domain_size
        } else {
            self.delegate.borrow().is_empty()
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
            let next = self.delegate.borrow().next_absent(from);
            (next < self.domain_size).then_some(next)
        } else {
            self.delegate.borrow().next_present(from)
        }
    }

    pub fn next_absent(&self, from: usize) -> usize {
        if from >= self.domain_size {
            return from;
        }
        if self.complement {
            self.delegate
                .borrow()
                .next_present(from)
                .unwrap_or(self.domain_size)
        } else {
            self.delegate.borrow().next_absent(from)
        }
    }

    pub fn previous_present(&self, index: usize) -> Option<usize> {
        if self.domain_size == 0 {
            return None;
        }
        let index = index.min(self.domain_size - 1);
        if self.complement {
            self.delegate.borrow().previous_absent(index)
        } else {
            self.delegate.borrow().previous_present(index)
        }
    }

    pub fn previous_absent(&self, index: usize) -> Option<usize> {
        if index >= self.domain_size {
            return Some(index);
        }
        if self.complement {
            self.delegate.borrow().previous_present(index)
        } else {
            self.delegate.borrow().previous_absent(index)
        }
    }

    /// # Panics
    ///
    /// Panics if `index` is outside the domain, or if the delegate
    /// rejects the translated mutation.
    pub fn set(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        if self.complement {
            self.delegate.borrow_mut().clear(index);
        } else {
            self.delegate.borrow_mut().set(index);
        }
        self.check_consistency();
    }

    pub fn clear(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        if self.complement {
            self.delegate.borrow_mut().set(index);
        } else {
            self.delegate.borrow_mut().clear(index);
        }
        self.check_consistency();
    }

    pub fn flip(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        self.delegate.borrow_mut().flip(index);
        self.check_consistency();
    }

    pub fn insert(&mut self, index: usize) -> bool {
        check_in_domain(index, self.domain_size);
        let changed = if self.complement {
            self.delegate.borrow_mut().remove(index)
        } else {
            self.delegate.borrow_mut().insert(index)
        };
        self.check_consistency();
        changed
    }

    pub fn remove(&mut self, index: usize) -> bool {
        check_in_domain(index, self.domain_size);
        let changed = if self.complement {
            self.delegate.borrow_mut().insert(index)
        } else {
            self.delegate.borrow_mut().remove(index)
        };
        self.check_consistency();
        changed
    }

    pub fn set_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        if self.complement {
            self.delegate.borrow_mut().clear_range(range);
        } else {
            self.delegate.borrow_mut().set_range(range);
        }
        self.check_consistency();
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        if self.complement {
            self.delegate.borrow_mut().set_range(range);
        } else {
            self.delegate.borrow_mut().clear_range(range);
        }
        self.check_consistency();
    }

    pub fn flip_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        self.delegate.borrow_mut().flip_range(range);
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
            self.delegate.borrow_mut().set_range(0..self.domain_size);
        } else {
            self.delegate.borrow_mut().clear_all();
        }
    }
}

impl Clone for BoundedWrapper {
    /// Deep copy: the clone gets its own delegate.
    fn clone(&self) -> Self {
        Self {
            delegate: Rc::new(RefCell::new(self.delegate.borrow().clone())),
            domain_size: self.domain_size,
            complement: self.complement,
        }
    }
}

impl fmt::Debug for BoundedWrapper {
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
    use super::super::word::WordSet;
    use super::*;

    fn wrapped(domain: usize, elements: &[usize]) -> BoundedWrapper {
        let mut inner = WordSet::new();
        for &element in elements {
            inner.set(element);
        }
        BoundedWrapper::new(NatSet::Word(inner), domain)
    }

    #[test]
    fn test_delegated_queries() {
        let set = wrapped(10, &[2, 4, 6]);
        assert_eq!(set.len(), 3);
        assert!(set.contains(4));
        assert!(!set.contains(5));
        assert!(!set.contains(10));
        assert_eq!(set.next_present(3), Some(4));
        assert_eq!(set.next_absent(4), 5);
        assert_eq!(set.last(), Some(6));
    }

    #[test]
    fn test_complement_shares_delegate() {
        let mut set = wrapped(10, &[2, 4, 6]);
        let complement = set.complement();
        assert_eq!(complement.len(), 7);
        assert_eq!(complement.first(), Some(0));
        assert_eq!(complement.last(), Some(9));
        assert!(set.shares_store_with(&complement));

        set.clear(4);
        assert!(complement.contains(4));

        let mut complement = complement;
        complement.clear_all();
        assert_eq!(set.len(), 10);
    }

    #[test]
    fn test_deep_clone() {
        let set = wrapped(10, &[1]);
        let mut copy = set.clone();
        copy.set(7);
        assert!(!set.contains(7));
        assert!(!set.shares_store_with(&copy));
    }

    #[test]
    #[should_panic(expected = "too large for domain")]
    fn test_oversized_delegate_rejected() {
        let mut inner = WordSet::new();
        inner.set(20);
        let _ = BoundedWrapper::new(NatSet::Word(inner), 10);
    }
}
