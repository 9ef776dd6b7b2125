//! Compressed-bitmap representations backed by `roaring`.
//!
//! Roaring stores 32-bit values, so indices are capped at `u32::MAX`.
//! Queries above the cap answer as if the bits were absent, mutations
//! panic. The bitmap has no in-place flip, so range flips go through an
//! xor with a range mask.

use std::cell::RefCell;
use std::fmt;
use std::ops::{Range, RangeInclusive};
use std::rc::Rc;

use roaring::RoaringBitmap;

use super::{check_in_domain, check_range, check_range_in_domain};

/// One past the largest representable index.
pub(crate) const BIT_LIMIT: usize = 1 << 32;

fn check_index(index: usize) {
    assert!(index < BIT_LIMIT, "index {index} out of 32-bit range");
}

/// Converts a half-open index range to the inclusive `u32` range roaring
/// expects, or `None` when the range is empty. The caller has verified
/// `range.end <= BIT_LIMIT`.
fn as_u32_range(range: &Range<usize>) -> Option<RangeInclusive<u32>> {
    if range.is_empty() {
        None
    } else {
        Some(range.start as u32..=(range.end - 1) as u32)
    }
}

fn range_mask(range: &Range<usize>) -> RoaringBitmap {
    let mut mask = RoaringBitmap::new();
    if let Some(range) = as_u32_range(range) {
        mask.insert_range(range);
    }
    mask
}

fn flip_range_in(bitmap: &mut RoaringBitmap, range: &Range<usize>) {
    if !range.is_empty() {
        *bitmap ^= range_mask(range);
    }
}

fn next_present_in(bitmap: &RoaringBitmap, from: usize) -> Option<usize> {
    if from >= BIT_LIMIT {
        return None;
    }
    let skipped = if from == 0 {
        0
    } else {
        bitmap.rank(from as u32 - 1)
    };
    let n = u32::try_from(skipped).ok()?;
    bitmap.select(n).map(|value| value as usize)
}

fn next_absent_in(bitmap: &RoaringBitmap, from: usize) -> usize {
    let mut index = from;
    while index < BIT_LIMIT && bitmap.contains(index as u32) {
        index += 1;
    }
    index
}

fn previous_present_in(bitmap: &RoaringBitmap, index: usize) -> Option<usize> {
    let index = index.min(BIT_LIMIT - 1);
    let count = bitmap.rank(index as u32);
    if count == 0 {
        return None;
    }
    let n = u32::try_from(count - 1).ok()?;
    bitmap.select(n).map(|value| value as usize)
}

fn previous_absent_in(bitmap: &RoaringBitmap, index: usize) -> Option<usize> {
    if index >= BIT_LIMIT {
        return Some(index);
    }
    let mut index = index;
    loop {
        if !bitmap.contains(index as u32) {
            return Some(index);
        }
        index = index.checked_sub(1)?;
    }
}

/// A set of natural numbers below `2^32` backed by a Roaring bitmap.
#[derive(Clone, Default, PartialEq)]
pub struct BitmapSet {
    bitmap: RoaringBitmap,
}

impl BitmapSet {
    pub fn new() -> Self {
        Self {
            bitmap: RoaringBitmap::new(),
        }
    }

    pub(crate) fn from_bitmap(bitmap: RoaringBitmap) -> Self {
        Self { bitmap }
    }

    pub(crate) fn bitmap(&self) -> &RoaringBitmap {
        &self.bitmap
    }

    pub(crate) fn into_bitmap(self) -> RoaringBitmap {
        self.bitmap
    }

    pub fn contains(&self, index: usize) -> bool {
        index < BIT_LIMIT && self.bitmap.contains(index as u32)
    }

    pub fn len(&self) -> usize {
        self.bitmap.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bitmap.is_empty()
    }

    pub fn first(&self) -> Option<usize> {
        self.bitmap.min().map(|value| value as usize)
    }

    pub fn last(&self) -> Option<usize> {
        self.bitmap.max().map(|value| value as usize)
    }

    pub fn next_present(&self, from: usize) -> Option<usize> {
        next_present_in(&self.bitmap, from)
    }

    pub fn next_absent(&self, from: usize) -> usize {
        next_absent_in(&self.bitmap, from)
    }

    pub fn previous_present(&self, index: usize) -> Option<usize> {
        previous_present_in(&self.bitmap, index)
    }

    pub fn previous_absent(&self, index: usize) -> Option<usize> {
        previous_absent_in(&self.bitmap, index)
    }

    /// # Panics
    ///
    /// Panics if `index` does not fit in 32 bits.
    pub fn set(&mut self, index: usize) {
        check_index(index);
        self.bitmap.insert(index as u32);
    }

    pub fn clear(&mut self, index: usize) {
        check_index(index);
        self.bitmap.remove(index as u32);
    }

    pub fn flip(&mut self, index: usize) {
        check_index(index);
        if !self.bitmap.insert(index as u32) {
            self.bitmap.remove(index as u32);
        }
    }

    pub fn insert(&mut self, index: usize) -> bool {
        check_index(index);
        self.bitmap.insert(index as u32)
    }

    pub fn remove(&mut self, index: usize) -> bool {
        check_index(index);
        self.bitmap.remove(index as u32)
    }

    pub fn set_range(&mut self, range: Range<usize>) {
        check_range(range.start, range.end);
        assert!(range.end <= BIT_LIMIT, "end {} out of 32-bit range", range.end);
        if let Some(range) = as_u32_range(&range) {
            self.bitmap.insert_range(range);
        }
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        check_range(range.start, range.end);
        let range = range.start..range.end.min(BIT_LIMIT);
        if let Some(range) = as_u32_range(&range) {
            self.bitmap.remove_range(range);
        }
    }

    pub fn flip_range(&mut self, range: Range<usize>) {
        check_range(range.start, range.end);
        assert!(range.end <= BIT_LIMIT, "end {} out of 32-bit range", range.end);
        flip_range_in(&mut self.bitmap, &range);
    }

    pub fn clear_from(&mut self, from: usize) {
        self.clear_range(from..BIT_LIMIT);
    }

    pub fn clear_all(&mut self) {
        self.bitmap.clear();
    }

    pub fn and(&mut self, other: &BitmapSet) {
        self.bitmap &= &other.bitmap;
    }

    pub fn and_not(&mut self, other: &BitmapSet) {
        self.bitmap -= &other.bitmap;
    }

    pub fn or(&mut self, other: &BitmapSet) {
        self.bitmap |= &other.bitmap;
    }

    pub fn xor(&mut self, other: &BitmapSet) {
        self.bitmap ^= &other.bitmap;
    }

    pub fn intersects(&self, other: &BitmapSet) -> bool {
        !self.bitmap.is_disjoint(&other.bitmap)
    }

    pub fn is_superset(&self, other: &BitmapSet) -> bool {
        self.bitmap.is_superset(&other.bitmap)
    }
}

impl fmt::Debug for BitmapSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.bitmap.iter()).finish()
    }
}

impl Extend<usize> for BitmapSet {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for index in iter {
            self.set(index);
        }
    }
}

impl FromIterator<usize> for BitmapSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// A bounded set over `[0, domain_size)` backed by a shared Roaring bitmap.
pub struct BoundedBitmapSet {
    store: Rc<RefCell<RoaringBitmap>>,
    domain_size: usize,
    complement: bool,
}

impl BoundedBitmapSet {
    /// # Panics
    ///
    /// Panics if the domain does not fit in 32 bits.
    pub fn new(domain_size: usize) -> Self {
        Self::from_bitmap(RoaringBitmap::new(), domain_size)
    }

    pub(crate) fn from_bitmap(bitmap: RoaringBitmap, domain_size: usize) -> Self {
        assert!(
            domain_size <= BIT_LIMIT,
            "domain size {domain_size} out of 32-bit range"
        );
        debug_assert!(bitmap.max().map_or(0, |max| max as usize + 1) <= domain_size);
        Self {
            store: Rc::new(RefCell::new(bitmap)),
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

    pub fn complement(&self) -> BoundedBitmapSet {
        BoundedBitmapSet {
            store: Rc::clone(&self.store),
            domain_size: self.domain_size,
            complement: !self.complement,
        }
    }

    pub fn shares_store_with(&self, other: &BoundedBitmapSet) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    fn check_consistency(&self) {
        debug_assert!(
            self.store.borrow().max().map_or(0, |max| max as usize + 1) <= self.domain_size
        );
    }

    fn view_bits(&self) -> RoaringBitmap {
        let mut bitmap = self.store.borrow().clone();
        if self.complement {
            flip_range_in(&mut bitmap, &(0..self.domain_size));
        }
        bitmap
    }

    fn complement_bits(&self) -> RoaringBitmap {
        let mut bitmap = self.store.borrow().clone();
        flip_range_in(&mut bitmap, &(0..self.domain_size));
        bitmap
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.domain_size && (self.complement ^ self.store.borrow().contains(index as u32))
    }

    pub fn len(&self) -> usize {
        let cardinality = self.store.borrow().len() as usize;
        if self.complement {
            self.domain_size - cardinality
        } else {
            cardinality
        }
    }

    pub fn is_empty(&self) -> bool {
        if self.complement {
            next_absent_in(&self.store.borrow(), 0) >= self.domain_size
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
            let next = next_absent_in(&self.store.borrow(), from);
            (next < self.domain_size).then_some(next)
        } else {
            next_present_in(&self.store.borrow(), from)
        }
    }

    pub fn next_absent(&self, from: usize) -> usize {
        if from >= self.domain_size {
            return from;
        }
        if self.complement {
            next_present_in(&self.store.borrow(), from).unwrap_or(self.domain_size)
        } else {
            next_absent_in(&self.store.borrow(), from)
        }
    }

    pub fn previous_present(&self, index: usize) -> Option<usize> {
        if self.domain_size == 0 {
            return None;
        }
        let index = index.min(self.domain_size - 1);
        if self.complement {
            previous_absent_in(&self.store.borrow(), index)
        } else {
            previous_present_in(&self.store.borrow(), index)
        }
    }

    pub fn previous_absent(&self, index: usize) -> Option<usize> {
        if index >= self.domain_size {
            return Some(index);
        }
        if self.complement {
            previous_present_in(&self.store.borrow(), index)
        } else {
            previous_absent_in(&self.store.borrow(), index)
        }
    }

    /// # Panics
    ///
    /// Panics if `index` is outside the domain.
    pub fn set(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        if self.complement {
            self.store.borrow_mut().remove(index as u32);
        } else {
            self.store.borrow_mut().insert(index as u32);
        }
        self.check_consistency();
    }

    pub fn clear(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        if self.complement {
            self.store.borrow_mut().insert(index as u32);
        } else {
            self.store.borrow_mut().remove(index as u32);
        }
        self.check_consistency();
    }

    pub fn flip(&mut self, index: usize) {
        check_in_domain(index, self.domain_size);
        let mut store = self.store.borrow_mut();
        if !store.insert(index as u32) {
            store.remove(index as u32);
        }
        drop(store);
        self.check_consistency();
    }

    pub fn insert(&mut self, index: usize) -> bool {
        check_in_domain(index, self.domain_size);
        let changed = if self.complement {
            self.store.borrow_mut().remove(index as u32)
        } else {
            self.store.borrow_mut().insert(index as u32)
        };
        self.check_consistency();
        changed
    }

    pub fn remove(&mut self, index: usize) -> bool {
        check_in_domain(index, self.domain_size);
        let changed = if self.complement {
            self.store.borrow_mut().insert(index as u32)
        } else {
            self.store.borrow_mut().remove(index as u32)
        };
        self.check_consistency();
        changed
    }

    pub fn set_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        if let Some(range) = as_u32_range(&range) {
            let mut store = self.store.borrow_mut();
            if self.complement {
                store.remove_range(range);
            } else {
                store.insert_range(range);
            }
        }
        self.check_consistency();
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        if let Some(range) = as_u32_range(&range) {
            let mut store = self.store.borrow_mut();
            if self.complement {
                store.insert_range(range);
            } else {
                store.remove_range(range);
            }
        }
        self.check_consistency();
    }

    pub fn flip_range(&mut self, range: Range<usize>) {
        check_range_in_domain(range.start, range.end, self.domain_size);
        flip_range_in(&mut self.store.borrow_mut(), &range);
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
        let mut store = self.store.borrow_mut();
        if self.complement {
            if let Some(range) = as_u32_range(&(0..self.domain_size)) {
                store.insert_range(range);
            }
        } else {
            store.clear();
        }
    }

    fn fill(&mut self) {
        let mut store = self.store.borrow_mut();
        if self.complement {
            store.clear();
        } else if let Some(range) = as_u32_range(&(0..self.domain_size)) {
            store.insert_range(range);
        }
    }

    pub fn and(&mut self, other: &BoundedBitmapSet) {
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
                *store |= &*other.store.borrow();
            } else {
                *store |= other.complement_bits();
            }
            if d < e {
                if let Some(range) = as_u32_range(&(d..e)) {
                    store.remove_range(range);
                }
            } else if let Some(range) = as_u32_range(&(e..d)) {
                store.insert_range(range);
            }
        } else if other.complement {
            *store -= &*other.store.borrow();
            if e < d {
                if let Some(range) = as_u32_range(&(e..d)) {
                    store.remove_range(range);
                }
            }
        } else {
            *store &= &*other.store.borrow();
        }
        drop(store);
        self.check_consistency();
    }

    pub fn and_not(&mut self, other: &BoundedBitmapSet) {
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
                *store |= other.complement_bits();
            } else {
                *store |= &*other.store.borrow();
            }
            if d < e {
                if let Some(range) = as_u32_range(&(d..e)) {
                    store.remove_range(range);
                }
            }
        } else if other.complement {
            if e < d {
                let mut operand = other.store.borrow().clone();
                if let Some(range) = as_u32_range(&(e..d)) {
                    operand.insert_range(range);
                }
                *store &= operand;
            } else {
                *store &= &*other.store.borrow();
            }
        } else {
            *store -= &*other.store.borrow();
        }
        drop(store);
        self.check_consistency();
    }

    /// # Panics
    ///
    /// Panics if the operand holds an element outside this domain.
    pub fn or(&mut self, other: &BoundedBitmapSet) {
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
                    if let Some(range) = as_u32_range(&(e..d)) {
                        operand.insert_range(range);
                    }
                    *store &= operand;
                } else {
                    *store &= &*other.store.borrow();
                }
            } else {
                *store -= &*other.store.borrow();
            }
        } else if other.complement {
            *store |= other.complement_bits();
        } else {
            *store |= &*other.store.borrow();
        }
        drop(store);
        self.check_consistency();
    }

    /// # Panics
    ///
    /// Panics if the operand domain is larger than this domain.
    pub fn xor(&mut self, other: &BoundedBitmapSet) {
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
        *store ^= &*other.store.borrow();
        if other.complement {
            flip_range_in(&mut store, &(0..e));
        }
        drop(store);
        self.check_consistency();
    }

    /// Adds every element of this domain that is not in the operand.
    pub fn or_not(&mut self, other: &BoundedBitmapSet) {
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
                *store -= &*other.store.borrow();
                if e < d {
                    if let Some(range) = as_u32_range(&(e..d)) {
                        store.remove_range(range);
                    }
                }
            } else {
                *store &= &*other.store.borrow();
            }
        } else {
            if other.complement {
                *store |= &*other.store.borrow();
            } else {
                let mut operand = other.store.borrow().clone();
                flip_range_in(&mut operand, &(0..d.min(e)));
                *store |= operand;
            }
            if e < d {
                if let Some(range) = as_u32_range(&(e..d)) {
                    store.insert_range(range);
                }
            } else if let Some(range) = as_u32_range(&(d..e)) {
                store.remove_range(range);
            }
        }
        drop(store);
        self.check_consistency();
    }

    pub fn is_superset(&self, other: &BoundedBitmapSet) -> bool {
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
        missing.is_disjoint(&other.view_bits())
    }

    pub fn intersects(&self, other: &BoundedBitmapSet) -> bool {
        if Rc::ptr_eq(&self.store, &other.store) {
            return if self.complement == other.complement {
                !self.is_empty()
            } else {
                false
            };
        }
        !self.view_bits().is_disjoint(&other.view_bits())
    }
}

impl Clone for BoundedBitmapSet {
    /// Deep copy: the clone gets its own store.
    fn clone(&self) -> Self {
        Self {
            store: Rc::new(RefCell::new(self.store.borrow().clone())),
            domain_size: self.domain_size,
            complement: self.complement,
        }
    }
}

impl fmt::Debug for BoundedBitmapSet {
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
    fn test_navigation() {
        let set: BitmapSet = [3, 70_000, 1_000_000].into_iter().collect();
        assert_eq!(set.next_present(0), Some(3));
        assert_eq!(set.next_present(4), Some(70_000));
        assert_eq!(set.next_present(1_000_001), None);
        assert_eq!(set.previous_present(999_999), Some(70_000));
        assert_eq!(set.previous_present(2), None);
        assert_eq!(set.next_absent(3), 4);
        assert_eq!(set.previous_absent(3), Some(2));
        assert_eq!(set.first(), Some(3));
        assert_eq!(set.last(), Some(1_000_000));
    }

    #[test]
    fn test_flip_range_via_mask() {
        let mut set = BitmapSet::new();
        set.set_range(10..20);
        set.flip_range(15..25);
        let collected: Vec<u32> = set.bitmap().iter().collect();
        assert_eq!(collected, (10..15).chain(20..25).collect::<Vec<u32>>());
    }

    #[test]
    fn test_out_of_range_queries() {
        let set: BitmapSet = [1].into_iter().collect();
        assert!(!set.contains(BIT_LIMIT));
        assert_eq!(set.next_present(BIT_LIMIT), None);
        assert_eq!(set.previous_absent(BIT_LIMIT + 5), Some(BIT_LIMIT + 5));
    }

    #[test]
    #[should_panic(expected = "out of 32-bit range")]
    fn test_mutation_past_limit_panics() {
        let mut set = BitmapSet::new();
        set.set(BIT_LIMIT);
    }

    #[test]
    fn test_bounded_complement_view() {
        let mut set = BoundedBitmapSet::new(1_000_000);
        set.set(0);
        set.set_range(500..600);
        let complement = set.complement();
        assert_eq!(complement.len(), 1_000_000 - 101);
        assert_eq!(complement.next_present(500), Some(600));
        assert_eq!(complement.next_absent(1), 500);

        set.clear(550);
        assert!(complement.contains(550));
    }

    #[test]
    fn test_bounded_polarity_ops() {
        let mut a = BoundedBitmapSet::new(100);
        a.set_range(0..50);
        let mut b = BoundedBitmapSet::new(80);
        b.set_range(40..80);
        let b = b.complement(); // {0..40}
        a.and(&b);
        assert_eq!(a.len(), 40);
        assert!(a.contains(39));
        assert!(!a.contains(40));

        let mut c = BoundedBitmapSet::new(100).complement(); // full
        let mut d = BoundedBitmapSet::new(60);
        d.set(10);
        c.and_not(&d);
        assert_eq!(c.len(), 99);
        assert!(!c.contains(10));
    }

    #[test]
    fn test_bounded_or_not_tail() {
        let mut a = BoundedBitmapSet::new(100);
        a.set(1);
        let mut b = BoundedBitmapSet::new(50);
        b.set_range(0..49);
        a.or_not(&b); // {49} plus the tail [50, 100)
        assert_eq!(a.len(), 1 + 1 + 50);
        assert!(a.contains(49));
        assert!(a.contains(99));
        assert!(!a.contains(2));
    }

    #[test]
    fn test_aliased_xor_fills() {
        let mut set = BoundedBitmapSet::new(1_024);
        set.set(3);
        let complement = set.complement();
        set.xor(&complement);
        assert_eq!(set.len(), 1_024);
        assert!(set.is_superset(&complement));
    }
}
