//! Enumeration of all subsets of a set.
//!
//! The iterator walks a binary counter over the basis elements, so it
//! yields `2^n` subsets in counter order, starting with the empty set.
//! Counts are exact `BigUint`s because `2^n` overflows machine words
//! quickly.

use num_bigint::BigUint;

use crate::bitvec::BitVec;
use crate::set::{NatSet, SparseSet};

/// The number of subsets of `set`, `2^len` as an exact big integer.
pub fn subset_count(set: &NatSet) -> BigUint {
    BigUint::from(1u32) << set.len()
}

/// Iterates every subset of a basis set.
pub struct PowerSetIter {
    basis: Vec<usize>,
    counter: BitVec,
    done: bool,
}

impl PowerSetIter {
    pub fn new(set: &NatSet) -> Self {
        Self {
            basis: set.iter().collect(),
            counter: BitVec::new(),
            done: false,
        }
    }

    fn snapshot(&self) -> NatSet {
        let elements = (0..self.basis.len())
            .filter(|&position| self.counter.contains(position))
            .map(|position| self.basis[position]);
        NatSet::Sparse(elements.collect::<SparseSet>())
    }
}

impl Iterator for PowerSetIter {
    type Item = NatSet;

    fn next(&mut self) -> Option<NatSet> {
        if self.done {
            return None;
        }
        let subset = self.snapshot();
        // Binary increment: flip the lowest run of ones.
        let zero = self.counter.next_clear_bit(0);
        if zero >= self.basis.len() {
            self.done = true;
        } else {
            self.counter.set(zero);
            self.counter.clear_range(0..zero);
        }
        Some(subset)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn sparse(elements: &[usize]) -> NatSet {
        NatSet::Sparse(elements.iter().copied().collect::<SparseSet>())
    }

    #[test]
    fn test_counts() {
        assert_eq!(subset_count(&sparse(&[])), BigUint::from(1u32));
        assert_eq!(subset_count(&sparse(&[3])), BigUint::from(2u32));
        assert_eq!(subset_count(&sparse(&[1, 5, 9])), BigUint::from(8u32));

        let large: NatSet = (0..100).collect();
        assert_eq!(subset_count(&large), BigUint::from(1u32) << 100);
    }

    #[test]
    fn test_empty_basis_yields_empty_set_once() {
        let subsets: Vec<NatSet> = PowerSetIter::new(&sparse(&[])).collect();
        assert_eq!(subsets.len(), 1);
        assert!(subsets[0].is_empty());
    }

    #[test]
    fn test_enumerates_all_subsets() {
        let basis = sparse(&[1, 5, 9]);
        let subsets: Vec<NatSet> = PowerSetIter::new(&basis).collect();
        assert_eq!(subsets.len(), 8);
        assert!(subsets[0].is_empty());

        // All subsets are distinct and drawn from the basis.
        let mut seen = BTreeSet::new();
        for subset in &subsets {
            assert!(basis.is_superset(subset));
            assert!(seen.insert(subset.iter().collect::<Vec<_>>()));
        }
    }
}
