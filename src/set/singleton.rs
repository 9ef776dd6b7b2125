//! Singleton representations: sets holding at most one element.
//!
//! The unbounded form stores `Option<usize>`; the bounded form shares the
//! same slot between a view and its complement view. Mutations that would
//! require a second element panic.

use std::cell::Cell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use super::{check_in_domain, check_range, check_range_in_domain};

fn unsupported() -> ! {
    panic!("singleton can hold at most one value");
}

/// A set of natural numbers holding at most one element.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SingletonSet {
    element: Option<usize>,
}

impl SingletonSet {
    pub fn new() -> Self {
        Self { element: None }
    }

    pub fn of(element: usize) -> Self {
        Self {
            element: Some(element),
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.element == Some(index)
    }

    pub fn len(&self) -> usize {
        usize::from(self.element.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.element.is_none()
    }

    pub fn first(&self) -> Option<usize> {
        self.element
    }

    pub fn last(&self) -> Option<usize> {
        self.element
    }

    pub fn next_present(&self, from: usize) -> Option<usize> {
        self.element.filter(|&element| element >= from)
    }

    pub fn next_absent(&self, from: usize) -> usize {
        if self.element == Some(from) {
            from + 1
        } else {
            from
        }
    }

    pub fn previous_present(&self, index: usize) -> Option<usize> {
        self.element.filter(|&element| element <= index)
    }

    pub fn previous_absent(&self, index: usize) -> Option<usize> {
        if self.element == Some(index) {
            index.checked_sub(1)
        } else {
            Some(index)
        }
    }

    /// # Panics
    ///
    /// Panics if the set already holds a different element.
    pub fn set(&mut self, index: usize) {
        match self.element {
            None => self.element = Some(index),
            Some(element) if element != index => unsupported(),
            Some(_) => {}
        }
    }

    pub fn clear(&mut self, index: usize) {
        if self.element == Some(index) {
            self.element = None;
        }
    }

    pub fn flip(&mut self, index: usize) {
        match self.element {
            None => self.element = Some(index),
            Some(element) if element == index => self.element = None,
            Some(_) => unsupported(),
        }
    }

    pub fn insert(&mut self, index: usize) -> bool {
        if self.contains(index) {
            return false;
        }
        self.set(index);
        true
    }

    pub fn remove(&mut self, index: usize) -> bool {
        if !self.contains(index) {
            return false;
        }
        self.element = None;
        true
    }

    /// # Panics
    ///
    /// Panics if the range holds more than one index.
    pub fn set_range(&mut self, range: Range<usize>) {
        check_range(range.start, range.end);
        match range.len() {
            0 => {}
            1 => self.set(range.start),
            _ => unsupported(),
        }
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        check_range(range.start, range.end);
        if let Some(element) = self.element {
            if range.contains(&element) {
                self.element = None;
            }
        }
    }

    /// # Panics
    ///
    /// Panics if the range holds more than one index.
    pub fn flip_range(&mut self, range: Range<usize>) {
        check_range(range.start, range.end);
        match range.len() {
            0 => {}
            1 => self.flip(range.start),
            _ => unsupported(),
        }
    }

    pub fn clear_from(&mut self, from: usize) {
        if self.element.is_some_and(|element| element >= from) {
            self.element = None;
        }
    }

    pub fn clear_all(&mut self) {
        self.element = None;
    }
}

impl fmt::Debug for SingletonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.element).finish()
    }
}

/// A bounded set over `[0, domain_size)` whose backing store holds at most
/// one element. The direct view is that element; the complement view is the
/// whole domain minus it.
pub struct BoundedSingletonSet {
    store: Rc<Cell<Option<usize>>>,
    domain_size: usize,
    complement: bool,
}

impl BoundedSingletonSet {
    pub fn new(domain_size: usize) -> Self {
        Self {
            store: Rc::new(Cell::new(None)),
            domain_size,
            complement: false,
        }
    }

    pub fn with_element(element: usize, domain_size: usize) -> Self {
        check_in_domain(element, domain_size);
        Self {
            store: Rc::new(Cell::new(Some(element))),
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

    /// The O(1) complement view over the same store.
    pub fn complement(&self) -> BoundedSingletonSet {
        BoundedSingletonSet {
            store: Rc::clone(&self.store),
            domain_size: self.domain_size,
            complement: !self.complement,
        }
    }

    pub fn shares_store_with(&self, other: &BoundedSingletonSet) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    pub fn contains(&self, index: usize) -> bool {
        if index >= self.domain_size {
            return false;
        }
        if self.complement {
            self.store.get() != Some(index)
        } else {
            self.store.get() == Some(index)
        }
    }

    pub fn len(&self) -> usize {
        let held = usize::from(self.store.get().is_some());
        if self.complement {
            self.domain_size - held
        } else {
            held
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
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
            let candidate = if self.store.get() == Some(from) {
                from + 1
            } else {
                from
            };
            (candidate < self.domain_size).then_some(candidate)
        } else {
            self.store.get().filter(|&element| element >= from)
        }
    }

    pub fn next_absent(&self, from: usize) -> usize {
        if from >= self.domain_size {
            return from;
        }
        if self.complement {
            match self.store.get() {
                Some(element) if element >= from => element,
                _ => self.domain_size,
            }
        } else if self.store.get() == Some(from) {
            from + 1
        } else {
            from
        }
    }

    pub fn previous_present(&self, index: usize) -> Option<usize> {
        if self.domain_size == 0 {
            return None;
        }
        let index = index.min(self.domain_size - 1);
        if self.complement {
            if self.store.get() == Some(index) {
                index.checked_sub(1)
            } else {
                Some(index)
            }
        } else {
            self.store.get().filter(|&element| element <= index)
        }
    }

    pub fn previous_absent(&self, index: usize) -> Option<usize> {
        if index >= self.domain_size {
            return Some(index);
        }
        if self.complement {
            self.store.get().filter(|&element| element <= index)
        } else if self.store.get() == Some(index) {
            index.checked_sub(1)
        } else {
            Some(index)
        }
    }

    /// # Panics
    ///
    /// Panics if `index` is outside the domain, or if the mutation would
    /// require a second stored element.
    pub fn set(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        if self.complement {
            if self.store.get() == Some(index) {
                self.store.set(None);
            }
        } else {
            match self.store.get() {
                None => self.store.set(Some(index)),
                Some(element) if element != index => unsupported(),
                Some(_) => {}
            }
        }
    }

    pub fn clear(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        if self.complement {
            match self.store.get() {
                None => self.store.set(Some(index)),
                Some(element) if element != index => unsupported(),
                Some(_) => {}
            }
        } else if self.store.get() == Some(index) {
            self.store.set(None);
        }
    }

    pub fn flip(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        if self.contains(index) {
            self.clear(index);
        } else {
            self.set(index);
        }
    }

    pub fn insert(&mut self, index: usize) -> bool {
        if self.contains(index) {
            return false;
        }
        self.set(index);
        true
    }

    pub fn remove(&mut self, index: usize) -> bool {
        check_in_domain(index, self.domain_size);
        if !self.contains(index) {
            return false;
        }
        self.clear(index);
        true
    }

    pub fn set_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        if self.complement {
            if let Some(element) = self.store.get() {
                if range.contains(&element) {
                    self.store.set(None);
                }
            }
        } else {
            match range.len() {
                0 => {}
                1 => self.set(range.start),
                _ => unsupported(),
            }
        }
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        if self.complement {
            match range.len() {
                0 => {}
                1 => self.clear(range.start),
                _ => unsupported(),
            }
        } else if let Some(element) = self.store.get() {
            if range.contains(&element) {
                self.store.set(None);
            }
        }
    }

    pub fn flip_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        match range.len() {
            0 => {}
            1 => self.flip(range.start),
            _ => unsupported(),
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
        if self.complement {
            match self.domain_size {
                0 => {}
                1 => self.store.set(Some(0)),
                _ => unsupported(),
            }
        } else {
            self.store.set(None);
        }
    }
}

impl Clone for BoundedSingletonSet {
    /// Deep copy: the clone gets its own store.
    fn clone(&self) -> Self {
        Self {
            store: Rc::new(Cell::new(self.store.get())),
            domain_size: self.domain_size,
            complement: self.complement,
        }
    }
}

impl fmt::Debug for BoundedSingletonSet {
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

    #[test]
    fn test_singleton_basics() {
        let mut set = SingletonSet::new();
        assert!(set.is_empty());
        assert!(set.insert(5));
        assert!(!set.insert(5));
        assert!(set.contains(5));
        assert_eq!(set.first(), Some(5));
        assert_eq!(set.next_present(3), Some(5));
        assert_eq!(set.next_present(6), None);
        assert_eq!(set.next_absent(5), 6);
        assert_eq!(set.previous_absent(5), Some(4));
        assert!(set.remove(5));
        assert!(set.is_empty());
    }

    #[test]
    #[should_panic(expected = "at most one value")]
    fn test_singleton_second_element_panics() {
        let mut set = SingletonSet::of(1);
        set.set(2);
    }

    #[test]
    fn test_singleton_ranges() {
        let mut set = SingletonSet::new();
        set.set_range(7..8);
        assert!(set.contains(7));
        set.clear_range(0..7);
        assert!(set.contains(7));
        set.clear_from(7);
        assert!(set.is_empty());
    }

    #[test]
    fn test_bounded_complement_view() {
        let mut set = BoundedSingletonSet::with_element(3, 6);
        let complement = set.complement();
        assert!(set.shares_store_with(&complement));
        assert_eq!(set.len(), 1);
        assert_eq!(complement.len(), 5);
        assert!(!complement.contains(3));
        assert!(complement.contains(0));
        assert!(!complement.contains(6));
        assert_eq!(complement.first(), Some(0));
        assert_eq!(complement.next_present(3), Some(4));
        assert_eq!(complement.next_absent(0), 3);
        assert_eq!(complement.previous_present(3), Some(2));

        // Mutating through one view is visible through the other.
        set.clear(3);
        assert_eq!(complement.len(), 6);
        assert_eq!(complement.next_absent(0), 6);
    }

    #[test]
    fn test_bounded_complement_mutation() {
        let mut complement = BoundedSingletonSet::new(4).complement();
        assert_eq!(complement.len(), 4);
        complement.clear(2);
        assert_eq!(complement.len(), 3);
        assert!(!complement.contains(2));
        complement.set(2);
        assert_eq!(complement.len(), 4);
    }

    #[test]
    #[should_panic(expected = "too large for domain")]
    fn test_bounded_domain_check() {
        let mut set = BoundedSingletonSet::new(4);
        set.set(4);
    }

    #[test]
    fn test_bounded_deep_clone() {
        let set = BoundedSingletonSet::with_element(1, 3);
        let mut copy = set.clone();
        assert!(!set.shares_store_with(&copy));
        copy.clear(1);
        assert!(set.contains(1));
        assert!(!copy.contains(1));
    }
}
