//! Representation selection.
//!
//! The factory picks a set representation from size hints: small bounded
//! domains fit in one word, large or unknown extents go to the sparse
//! trie, everything in between to the dense bit vector. The predicate
//! deciding sparse versus dense is pluggable.

use log::debug;
use roaring::RoaringBitmap;

use crate::bits::WORD_BITS;
use crate::bitvec::BitVec;
use crate::set::{
    check_in_domain, BitmapSet, BoundedBitmapSet, BoundedDenseSet, BoundedNatSet,
    BoundedSingletonSet, BoundedSparseSet, BoundedWordSet, BoundedWrapper, DenseSet, NatSet,
    RangeSet, SingletonSet, SparseSet, WordSet,
};
use crate::trie::SparseBitVec;

/// Above this many bits, the sparse trie wins over the dense vector.
pub const SPARSE_THRESHOLD: usize = WORD_BITS * 128;

/// Decides for sparse storage from `(expected_size, expected_length)`
/// hints; `None` means unknown.
pub type SparsePredicate = fn(Option<usize>, Option<usize>) -> bool;

fn default_use_sparse(expected_size: Option<usize>, expected_length: Option<usize>) -> bool {
    if expected_size.is_none() && expected_length.is_none() {
        return true;
    }
    expected_size.is_some_and(|size| size > SPARSE_THRESHOLD)
        || expected_length.is_some_and(|length| length > SPARSE_THRESHOLD)
}

pub struct NatSetFactory {
    sparse_predicate: SparsePredicate,
}

impl Default for NatSetFactory {
    fn default() -> Self {
        Self {
            sparse_predicate: default_use_sparse,
        }
    }
}

impl NatSetFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sparse_predicate(sparse_predicate: SparsePredicate) -> Self {
        Self { sparse_predicate }
    }

    /// An unbounded set with no hints (sparse by default).
    pub fn set(&self) -> NatSet {
        self.set_with(None, None)
    }

    pub fn with_expected_size(&self, expected_size: usize) -> NatSet {
        self.set_with(Some(expected_size), None)
    }

    pub fn with_expected_length(&self, expected_length: usize) -> NatSet {
        self.set_with(None, Some(expected_length))
    }

    /// An unbounded set sized from the hints.
    pub fn set_with(
        &self,
        expected_size: Option<usize>,
        expected_length: Option<usize>,
    ) -> NatSet {
        let capacity = expected_length.or(expected_size).unwrap_or(0);
        if (self.sparse_predicate)(expected_size, expected_length) {
            debug!("picked sparse set for size {expected_size:?}, length {expected_length:?}");
            NatSet::Sparse(SparseSet::with_capacity(capacity))
        } else {
            debug!("picked dense set for size {expected_size:?}, length {expected_length:?}");
            NatSet::Dense(DenseSet::with_capacity(capacity))
        }
    }

    /// An unbounded set that will never hold an index at or above
    /// `maximal_length`.
    pub fn with_maximal_length(&self, maximal_length: usize) -> NatSet {
        if maximal_length <= WORD_BITS {
            NatSet::Word(WordSet::new())
        } else {
            self.set_with(None, Some(maximal_length))
        }
    }

    /// An empty modifiable bounded set over `[0, domain_size)`.
    pub fn bounded(&self, domain_size: usize) -> BoundedNatSet {
        self.bounded_with(domain_size, None)
    }

    pub fn bounded_with(
        &self,
        domain_size: usize,
        expected_size: Option<usize>,
    ) -> BoundedNatSet {
        if domain_size <= WORD_BITS {
            BoundedNatSet::Word(BoundedWordSet::new(domain_size))
        } else if (self.sparse_predicate)(expected_size, Some(domain_size)) {
            BoundedNatSet::Sparse(BoundedSparseSet::new(domain_size))
        } else {
            BoundedNatSet::Dense(BoundedDenseSet::new(domain_size))
        }
    }

    /// A modifiable bounded set holding all of `[0, domain_size)`.
    pub fn bounded_full(&self, domain_size: usize) -> BoundedNatSet {
        self.bounded(domain_size).complement()
    }

    /// The canonical empty set.
    pub fn empty(&self) -> NatSet {
        NatSet::Singleton(SingletonSet::new())
    }

    /// The canonical set holding exactly `element`.
    pub fn singleton(&self, element: usize) -> NatSet {
        NatSet::Singleton(SingletonSet::of(element))
    }

    /// The canonical (immutable) empty set over `[0, domain_size)`.
    pub fn bounded_empty(&self, domain_size: usize) -> BoundedNatSet {
        BoundedNatSet::Range(RangeSet::empty(domain_size))
    }

    /// The canonical (immutable) set holding all of `[0, domain_size)`.
    pub fn bounded_range(&self, domain_size: usize) -> BoundedNatSet {
        BoundedNatSet::Range(RangeSet::full(domain_size))
    }

    /// A bounded set holding exactly `element`.
    ///
    /// # Panics
    ///
    /// Panics if `element` is outside the domain.
    pub fn bounded_singleton(&self, domain_size: usize, element: usize) -> BoundedNatSet {
        BoundedNatSet::Singleton(BoundedSingletonSet::with_element(element, domain_size))
    }

    /// Compacts a set into the smallest representation holding the same
    /// content. The input is consumed; representations that are already
    /// minimal pass through.
    pub fn compact(&self, set: NatSet) -> NatSet {
        if matches!(
            set,
            NatSet::Singleton(_) | NatSet::Bounded(BoundedNatSet::Range(_))
        ) {
            return set;
        }
        if set.is_empty() {
            return NatSet::Singleton(SingletonSet::new());
        }
        if set.len() == 1 {
            let element = set.first().unwrap_or(0);
            debug!("compacted to singleton {{{element}}}");
            return NatSet::Singleton(SingletonSet::of(element));
        }
        let length = set.last().unwrap_or(0) + 1;
        if set.len() == length {
            // Contiguous [0, length).
            debug!("compacted to fixed range [0, {length})");
            return NatSet::Bounded(BoundedNatSet::Range(RangeSet::full(length)));
        }
        if length <= WORD_BITS {
            let mut word = WordSet::new();
            word.extend(set.iter());
            debug!("compacted {} elements into one word", word.len());
            return NatSet::Word(word);
        }
        set
    }

    /// Wraps `set` into a bounded set over `[0, domain_size)`, reusing
    /// its storage where the representation allows.
    ///
    /// # Panics
    ///
    /// Panics if `set` holds an element outside the domain, or if it is
    /// already bounded with a different domain.
    pub fn ensure_bounded(&self, set: NatSet, domain_size: usize) -> BoundedNatSet {
        if let Some(last) = set.last() {
            check_in_domain(last, domain_size);
        }
        match set {
            NatSet::Bounded(bounded) => {
                assert!(
                    bounded.domain_size() == domain_size,
                    "bounded set domain [0, {}) does not match requested domain [0, {})",
                    bounded.domain_size(),
                    domain_size
                );
                bounded
            }
            NatSet::Singleton(set) => BoundedNatSet::Singleton(match set.first() {
                Some(element) => BoundedSingletonSet::with_element(element, domain_size),
                None => BoundedSingletonSet::new(domain_size),
            }),
            NatSet::Word(set) => {
                if domain_size <= WORD_BITS {
                    BoundedNatSet::Word(BoundedWordSet::from_word(set.store(), domain_size))
                } else {
                    BoundedNatSet::Wrapper(BoundedWrapper::new(NatSet::Word(set), domain_size))
                }
            }
            NatSet::Dense(set) => {
                BoundedNatSet::Dense(BoundedDenseSet::from_bits(set.into_bits(), domain_size))
            }
            NatSet::Sparse(set) => {
                BoundedNatSet::Sparse(BoundedSparseSet::from_bits(set.into_bits(), domain_size))
            }
            NatSet::Bitmap(set) => BoundedNatSet::Bitmap(BoundedBitmapSet::from_bitmap(
                set.into_bitmap(),
                domain_size,
            )),
        }
    }

    /// Whether every mutation of the contract is available on `set`.
    ///
    /// Only the general representations qualify: singleton, single-word
    /// (above the word capacity), fixed-range, wrapper and compressed
    /// forms report `false` even though some of their mutations succeed.
    pub fn is_modifiable(&self, set: &NatSet) -> bool {
        match set {
            NatSet::Dense(_) | NatSet::Sparse(_) => true,
            NatSet::Bounded(bounded) => matches!(
                bounded,
                BoundedNatSet::Word(_) | BoundedNatSet::Dense(_) | BoundedNatSet::Sparse(_)
            ),
            NatSet::Singleton(_) | NatSet::Word(_) | NatSet::Bitmap(_) => false,
        }
    }

    /// A modifiable set with the same content and, for bounded sets, the
    /// same domain.
    pub fn modifiable_copy(&self, set: &NatSet) -> NatSet {
        match set {
            NatSet::Bounded(bounded) => {
                let mut copy = self.bounded(bounded.domain_size());
                copy.extend(bounded.iter());
                NatSet::Bounded(copy)
            }
            _ => {
                let mut copy = self.set_with(Some(set.len()), set.last().map(|last| last + 1));
                copy.extend(set.iter());
                copy
            }
        }
    }

    pub fn ensure_modifiable(&self, set: NatSet) -> NatSet {
        if self.is_modifiable(&set) {
            set
        } else {
            self.modifiable_copy(&set)
        }
    }
}

/// Copies the elements of a set into a dense bit vector.
pub fn to_bit_vec(set: &NatSet) -> BitVec {
    set.iter().collect()
}

/// Converts a set into the sparse representation, reusing it when it
/// already is one.
pub fn to_sparse(set: NatSet) -> NatSet {
    match set {
        sparse @ NatSet::Sparse(_) => sparse,
        other => NatSet::Sparse(other.iter().collect::<SparseSet>()),
    }
}

/// Converts a set into the compressed-bitmap representation.
pub fn to_bitmap(set: NatSet) -> NatSet {
    match set {
        bitmap @ NatSet::Bitmap(_) => bitmap,
        other => NatSet::Bitmap(other.iter().collect::<BitmapSet>()),
    }
}

impl From<BitVec> for NatSet {
    fn from(bits: BitVec) -> Self {
        NatSet::Dense(DenseSet::from_bits(bits))
    }
}

impl From<SparseBitVec> for NatSet {
    fn from(bits: SparseBitVec) -> Self {
        NatSet::Sparse(SparseSet::from_bits(bits))
    }
}

impl From<RoaringBitmap> for NatSet {
    fn from(bitmap: RoaringBitmap) -> Self {
        NatSet::Bitmap(BitmapSet::from_bitmap(bitmap))
    }
}
