//! Iterators over set elements.
//!
//! Both iterators are driven by the navigation queries instead of the
//! backing storage, so one implementation serves every representation.

use std::iter::Chain;
use std::ops::Range;

use crate::set::{BoundedNatSet, NatSet};

#[derive(Clone, Copy)]
enum SetRef<'a> {
    Plain(&'a NatSet),
    Bounded(&'a BoundedNatSet),
}

impl SetRef<'_> {
    fn next_present(&self, from: usize) -> Option<usize> {
        match self {
            SetRef::Plain(set) => set.next_present(from),
            SetRef::Bounded(set) => set.next_present(from),
        }
    }

    fn next_absent(&self, from: usize) -> usize {
        match self {
            SetRef::Plain(set) => set.next_absent(from),
            SetRef::Bounded(set) => set.next_absent(from),
        }
    }

    fn previous_present(&self, index: usize) -> Option<usize> {
        match self {
            SetRef::Plain(set) => set.previous_present(index),
            SetRef::Bounded(set) => set.previous_present(index),
        }
    }

    fn previous_absent(&self, index: usize) -> Option<usize> {
        match self {
            SetRef::Plain(set) => set.previous_absent(index),
            SetRef::Bounded(set) => set.previous_absent(index),
        }
    }

    fn first(&self) -> Option<usize> {
        match self {
            SetRef::Plain(set) => set.first(),
            SetRef::Bounded(set) => set.first(),
        }
    }

    fn last(&self) -> Option<usize> {
        match self {
            SetRef::Plain(set) => set.last(),
            SetRef::Bounded(set) => set.last(),
        }
    }

    fn len(&self) -> usize {
        match self {
            SetRef::Plain(set) => set.len(),
            SetRef::Bounded(set) => set.len(),
        }
    }
}

/// Ascending iterator over the elements of a set.
#[derive(Clone)]
pub struct SetIter<'a> {
    set: SetRef<'a>,
    front: usize,
    /// Upper cursor; `None` once exhausted.
    back: Option<usize>,
}

impl<'a> SetIter<'a> {
    fn new(set: SetRef<'a>) -> Self {
        Self {
            set,
            front: 0,
            back: set.last(),
        }
    }
}

impl Iterator for SetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let back = self.back?;
        let Some(index) = self.set.next_present(self.front) else {
            self.back = None;
            return None;
        };
        if index > back {
            self.back = None;
            return None;
        }
        self.front = index + 1;
        Some(index)
    }
}

impl DoubleEndedIterator for SetIter<'_> {
    fn next_back(&mut self) -> Option<usize> {
        let back = self.back?;
        let Some(index) = self.set.previous_present(back) else {
            self.back = None;
            return None;
        };
        if index < self.front {
            self.back = None;
            return None;
        }
        self.back = index.checked_sub(1);
        Some(index)
    }
}

impl NatSet {
    pub fn iter(&self) -> SetIter<'_> {
        SetIter::new(SetRef::Plain(self))
    }

    /// Iterates the elements of `[0, domain)` that are not in this set.
    pub fn complement_iter(&self, domain: usize) -> ComplementIter<'_> {
        ComplementIter::new(SetRef::Plain(self), domain)
    }
}

impl BoundedNatSet {
    pub fn iter(&self) -> SetIter<'_> {
        SetIter::new(SetRef::Bounded(self))
    }

    /// Iterates the elements of `[0, domain)` that are not in this set.
    pub fn complement_iter(&self, domain: usize) -> ComplementIter<'_> {
        ComplementIter::new(SetRef::Bounded(self), domain)
    }
}

impl<'a> IntoIterator for &'a NatSet {
    type Item = usize;
    type IntoIter = SetIter<'a>;

    fn into_iter(self) -> SetIter<'a> {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a BoundedNatSet {
    type Item = usize;
    type IntoIter = SetIter<'a>;

    fn into_iter(self) -> SetIter<'a> {
        self.iter()
    }
}

enum ComplementInner<'a> {
    /// The set leaves a single contiguous gap.
    Run(Range<usize>),
    /// The set is a singleton: two runs around the element.
    Split(Chain<Range<usize>, Range<usize>>),
    /// General case, driven by `next_absent`/`previous_absent`.
    Query {
        set: SetRef<'a>,
        front: usize,
        /// Upper cursor; `None` once exhausted.
        back: Option<usize>,
    },
}

/// Ascending iterator over the elements of `[0, domain)` absent from a
/// set. Degenerate shapes collapse to plain ranges.
pub struct ComplementIter<'a> {
    inner: ComplementInner<'a>,
}

impl<'a> ComplementIter<'a> {
    fn new(set: SetRef<'a>, domain: usize) -> Self {
        let query = || ComplementInner::Query {
            set,
            front: 0,
            back: domain.checked_sub(1),
        };
        let inner = match set.first() {
            None => ComplementInner::Run(0..domain),
            Some(0) => {
                // A set filling exactly [0, k) leaves the single run
                // [k, domain).
                let gap = set.next_absent(0);
                if set.len() == gap {
                    ComplementInner::Run(gap.min(domain)..domain)
                } else {
                    query()
                }
            }
            Some(element) if set.len() == 1 => {
                let after = (element + 1).min(domain);
                ComplementInner::Split((0..element.min(domain)).chain(after..domain))
            }
            Some(_) => query(),
        };
        Self { inner }
    }
}

impl Iterator for ComplementIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match &mut self.inner {
            ComplementInner::Run(range) => range.next(),
            ComplementInner::Split(chain) => chain.next(),
            ComplementInner::Query { set, front, back } => {
                let limit = (*back)?;
                if *front > limit {
                    *back = None;
                    return None;
                }
                let index = set.next_absent(*front);
                if index > limit {
                    *back = None;
                    return None;
                }
                *front = index + 1;
                Some(index)
            }
        }
    }
}

impl DoubleEndedIterator for ComplementIter<'_> {
    fn next_back(&mut self) -> Option<usize> {
        match &mut self.inner {
            ComplementInner::Run(range) => range.next_back(),
            ComplementInner::Split(chain) => chain.next_back(),
            ComplementInner::Query { set, front, back } => {
                let limit = (*back)?;
                let Some(index) = set.previous_absent(limit) else {
                    *back = None;
                    return None;
                };
                if index < *front {
                    *back = None;
                    return None;
                }
                *back = index.checked_sub(1);
                Some(index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::{BoundedDenseSet, SparseSet};

    fn sparse(elements: &[usize]) -> NatSet {
        NatSet::Sparse(elements.iter().copied().collect::<SparseSet>())
    }

    #[test]
    fn test_forward_iteration() {
        let set = sparse(&[1, 5, 64, 2_048]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 5, 64, 2_048]);
        assert_eq!(sparse(&[]).iter().next(), None);
    }

    #[test]
    fn test_reverse_iteration() {
        let set = sparse(&[1, 5, 64]);
        assert_eq!(set.iter().rev().collect::<Vec<_>>(), vec![64, 5, 1]);
    }

    #[test]
    fn test_double_ended_meeting() {
        let set = sparse(&[0, 2, 4, 6]);
        let mut iter = set.iter();
        assert_eq!(iter.next(), Some(0));
        assert_eq!(iter.next_back(), Some(6));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next_back(), Some(4));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn test_bounded_complement_view_iteration() {
        let mut set = BoundedDenseSet::new(10);
        set.set(2);
        set.set(4);
        let set = BoundedNatSet::Dense(set);
        let complement = set.complement();
        assert_eq!(
            complement.iter().collect::<Vec<_>>(),
            vec![0, 1, 3, 5, 6, 7, 8, 9]
        );
        assert_eq!(complement.iter().rev().next(), Some(9));
    }

    #[test]
    fn test_complement_iter_general() {
        let set = sparse(&[1, 3, 4]);
        assert_eq!(set.complement_iter(7).collect::<Vec<_>>(), vec![0, 2, 5, 6]);
    }

    #[test]
    fn test_complement_iter_reverse() {
        let set = sparse(&[1, 3, 4]);
        assert_eq!(
            set.complement_iter(7).rev().collect::<Vec<_>>(),
            vec![6, 5, 2, 0]
        );

        let mut iter = set.complement_iter(7);
        assert_eq!(iter.next(), Some(0));
        assert_eq!(iter.next_back(), Some(6));
        assert_eq!(iter.next_back(), Some(5));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next_back(), None);
        assert_eq!(iter.next(), None);

        assert_eq!(
            sparse(&[2]).complement_iter(5).rev().collect::<Vec<_>>(),
            vec![4, 3, 1, 0]
        );

        let mut bounded = BoundedDenseSet::new(8);
        bounded.set(1);
        bounded.set(3);
        bounded.set(4);
        let bounded = BoundedNatSet::Dense(bounded);
        assert_eq!(
            bounded.complement_iter(8).rev().collect::<Vec<_>>(),
            vec![7, 6, 5, 2, 0]
        );
    }

    #[test]
    fn test_complement_iter_fast_paths() {
        // Empty set: one full run.
        assert_eq!(
            sparse(&[]).complement_iter(4).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        // Prefix run [0, 3): one tail run.
        assert_eq!(
            sparse(&[0, 1, 2]).complement_iter(6).collect::<Vec<_>>(),
            vec![3, 4, 5]
        );
        // Singleton: two runs around the element.
        assert_eq!(
            sparse(&[2]).complement_iter(5).collect::<Vec<_>>(),
            vec![0, 1, 3, 4]
        );
        // Singleton past the domain: one run.
        assert_eq!(
            sparse(&[9]).complement_iter(5).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
    }
}
