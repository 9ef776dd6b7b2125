//! Hierarchical sparse bit vector.
//!
//! [`SparseBitVec`] stores bits in a four-level tree of 64-bit words:
//!
//! ```text
//! level 1: growable vec of areas        (up to 1 << 15 slots)
//! level 2: area = 32 optional leaves
//! level 3: leaf = [u64; 32]
//! level 4: 64 bits per word
//! ```
//!
//! One area spans `32 * 32 * 64 = 65_536` bits; the addressable index space
//! is 31 bits. Absent subtrees are `None` and are never allocated, which is
//! what makes the structure cheap for large, sparse domains.
//!
//! All bulk range operations run through a single scanner that walks the
//! tree word-aligned and applies an [`Op`]. Each op declares four structural
//! properties ("absent op absent is absent" and friends) that let the
//! scanner skip or prune whole subtrees without allocating them. Empty
//! leaves and areas discovered during a mutating scan are pruned in place.
//!
//! Derived statistics (cardinality, bit length, word count, content hash)
//! are memoized and recomputed lazily in one full pass after any mutation.

use std::cell::Cell;
use std::fmt;
use std::ops::Range;

use log::debug;

use crate::bits::{mask_to, WORD_BITS};

/// Words per leaf block.
const LEAF_WORDS: usize = 32;
/// Leaves per area.
const AREA_LEAVES: usize = 32;
/// Bits covered by one leaf.
const LEAF_BITS: usize = LEAF_WORDS * WORD_BITS; // 2048
/// Bits covered by one area.
const AREA_BITS: usize = AREA_LEAVES * LEAF_BITS; // 65_536
/// Maximum number of level-1 slots (31-bit index space).
const MAX_AREAS: usize = 1 << 15;
/// One past the maximum representable index.
pub const MAX_BITS: usize = MAX_AREAS * AREA_BITS; // 1 << 31

/// Seed of the order-independent content hash.
const HASH_SEED: u64 = 1234;

type Leaf = [u64; LEAF_WORDS];
type Area = [Option<Box<Leaf>>; AREA_LEAVES];

static ZERO_LEAF: Leaf = [0; LEAF_WORDS];

fn new_area() -> Box<Area> {
    Box::new(std::array::from_fn(|_| None))
}

/// Bulk word operation applied by the range scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    And,
    AndNot,
    Or,
    Xor,
    Clear,
    Set,
    Flip,
    Copy,
}

/// Structural properties of an [`Op`], used to skip absent branches.
#[derive(Debug, Clone, Copy)]
struct Props {
    /// absent op absent = absent
    f_op_f_eq_f: bool,
    /// absent op x = absent
    f_op_x_eq_f: bool,
    /// x op absent = absent
    x_op_f_eq_f: bool,
    /// x op absent = x (operand absence preserves this side)
    x_op_f_eq_x: bool,
}

impl Op {
    fn props(self) -> Props {
        let (f_op_f_eq_f, f_op_x_eq_f, x_op_f_eq_f, x_op_f_eq_x) = match self {
            Op::And => (true, true, true, false),
            Op::AndNot => (true, true, false, true),
            Op::Or => (true, false, false, true),
            Op::Xor => (true, false, false, true),
            Op::Clear => (true, true, false, false),
            Op::Set => (false, false, false, false),
            Op::Flip => (false, false, false, false),
            Op::Copy => (true, false, true, false),
        };
        Props {
            f_op_f_eq_f,
            f_op_x_eq_f,
            x_op_f_eq_f,
            x_op_f_eq_x,
        }
    }

    /// Whether the op can create content past the current extent.
    fn grows(self) -> bool {
        matches!(self, Op::Or | Op::Xor | Op::Set | Op::Flip | Op::Copy)
    }

    /// Applies the op to one word; only bits inside `mask` may change
    /// (except `Copy`, which replaces the masked word). Returns whether the
    /// resulting word is zero.
    #[inline]
    fn word(self, a: &mut u64, b: u64, mask: u64) -> bool {
        *a = match self {
            Op::And => *a & (b | !mask),
            Op::AndNot => *a & !(b & mask),
            Op::Or => *a | (b & mask),
            Op::Xor => *a ^ (b & mask),
            Op::Clear => *a & !mask,
            Op::Set => *a | mask,
            Op::Flip => *a ^ mask,
            Op::Copy => b & mask,
        };
        *a == 0
    }
}

/// Memoized whole-structure statistics.
#[derive(Debug, Clone, Copy)]
struct Stats {
    cardinality: usize,
    length: usize,
    word_count: usize,
    hash: u32,
}

const EMPTY_STATS: Stats = Stats {
    cardinality: 0,
    length: 0,
    word_count: 0,
    hash: (HASH_SEED >> 32 ^ HASH_SEED) as u32,
};

/// A sparse bit vector over a four-level word trie.
pub struct SparseBitVec {
    areas: Vec<Option<Box<Area>>>,
    /// Memoized statistics, `None` while dirty.
    cache: Cell<Option<Stats>>,
    /// Scratch leaf reused by the scanner to stage absent blocks.
    spare: Option<Box<Leaf>>,
}

impl SparseBitVec {
    /// Creates an empty vector with no pre-allocated extent.
    pub fn new() -> Self {
        Self {
            areas: Vec::new(),
            cache: Cell::new(Some(EMPTY_STATS)),
            spare: None,
        }
    }

    /// Creates an empty vector with level-1 slots for at least `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        let mut vec = Self::new();
        if bits > 0 {
            vec.ensure_area(bits.min(MAX_BITS).saturating_sub(1) / AREA_BITS);
        }
        vec
    }

    /// The currently addressable extent in bits. Reads beyond it are clear.
    pub fn bit_capacity(&self) -> usize {
        self.areas.len() * AREA_BITS
    }

    // --- Single-bit operations ---

    /// Returns true if the bit at `index` is set.
    pub fn contains(&self, index: usize) -> bool {
        let w = index / WORD_BITS;
        match self.word(w) {
            Some(word) => word & (1 << (index % WORD_BITS)) != 0,
            None => false,
        }
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` exceeds the 31-bit index space.
    pub fn set(&mut self, index: usize) {
        self.mutate_word(index, |word, bit| *word |= bit);
    }

    /// Clears the bit at `index`.
    pub fn clear(&mut self, index: usize) {
        let w = index / WORD_BITS;
        let u1 = w / (LEAF_WORDS * AREA_LEAVES);
        let Some(Some(area)) = self.areas.get_mut(u1) else {
            return;
        };
        let Some(leaf) = &mut area[(w / LEAF_WORDS) % AREA_LEAVES] else {
            return;
        };
        leaf[w % LEAF_WORDS] &= !(1u64 << (index % WORD_BITS));
        self.cache.set(None);
    }

    /// Flips the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` exceeds the 31-bit index space.
    pub fn flip(&mut self, index: usize) {
        self.mutate_word(index, |word, bit| *word ^= bit);
    }

    /// Sets the bit and reports whether it was previously clear.
    pub fn insert(&mut self, index: usize) -> bool {
        let missing = !self.contains(index);
        if missing {
            self.set(index);
        }
        missing
    }

    /// Clears the bit and reports whether it was previously set.
    pub fn remove(&mut self, index: usize) -> bool {
        let present = self.contains(index);
        if present {
            self.clear(index);
        }
        present
    }

    fn mutate_word(&mut self, index: usize, apply: impl Fn(&mut u64, u64)) {
        assert!(index < MAX_BITS, "index {index} out of 31-bit range");
        let w = index / WORD_BITS;
        let u1 = w / (LEAF_WORDS * AREA_LEAVES);
        self.ensure_area(u1);
        let area = self.areas[u1].get_or_insert_with(new_area);
        let leaf = area[(w / LEAF_WORDS) % AREA_LEAVES]
            .get_or_insert_with(|| Box::new([0; LEAF_WORDS]));
        apply(&mut leaf[w % LEAF_WORDS], 1u64 << (index % WORD_BITS));
        self.cache.set(None);
    }

    fn word(&self, w: usize) -> Option<u64> {
        let area = self
            .areas
            .get(w / (LEAF_WORDS * AREA_LEAVES))?
            .as_deref()?;
        let leaf = area[(w / LEAF_WORDS) % AREA_LEAVES].as_deref()?;
        Some(leaf[w % LEAF_WORDS])
    }

    // --- Ranged operations ---

    /// Sets all bits in `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range.start > range.end` or the range leaves the 31-bit
    /// index space.
    pub fn set_range(&mut self, range: Range<usize>) {
        self.set_scanner(range.start, range.end, None, Op::Set);
    }

    /// Clears all bits in `range`.
    pub fn clear_range(&mut self, range: Range<usize>) {
        self.set_scanner(range.start, range.end, None, Op::Clear);
    }

    /// Flips all bits in `range`.
    pub fn flip_range(&mut self, range: Range<usize>) {
        self.set_scanner(range.start, range.end, None, Op::Flip);
    }

    /// Clears all bits.
    pub fn clear_all(&mut self) {
        self.areas.clear();
        self.cache.set(Some(EMPTY_STATS));
    }

    // --- Bulk boolean algebra ---

    /// Intersects with `other`.
    pub fn and(&mut self, other: &SparseBitVec) {
        self.cache.set(None);
        // Everything beyond the operand's extent drops out of the result.
        let keep = self.areas.len().min(other.areas.len());
        for slot in &mut self.areas[keep..] {
            *slot = None;
        }
        let to = self.bit_capacity().min(other.bit_capacity());
        self.set_scanner(0, to, Some(other), Op::And);
    }

    /// Removes all bits of `other`.
    pub fn and_not(&mut self, other: &SparseBitVec) {
        let to = self.bit_capacity().min(other.bit_capacity());
        self.set_scanner(0, to, Some(other), Op::AndNot);
    }

    /// Unions with `other`.
    pub fn or(&mut self, other: &SparseBitVec) {
        self.set_scanner(0, other.bit_capacity(), Some(other), Op::Or);
    }

    /// Symmetric difference with `other`.
    pub fn xor(&mut self, other: &SparseBitVec) {
        self.set_scanner(0, other.bit_capacity(), Some(other), Op::Xor);
    }

    /// Intersects `range` with the corresponding range of `other`.
    pub fn and_range(&mut self, range: Range<usize>, other: &SparseBitVec) {
        self.set_scanner(range.start, range.end, Some(other), Op::And);
    }

    /// Removes `other`'s bits within `range`.
    pub fn and_not_range(&mut self, range: Range<usize>, other: &SparseBitVec) {
        self.set_scanner(range.start, range.end, Some(other), Op::AndNot);
    }

    /// Unions `range` with the corresponding range of `other`.
    pub fn or_range(&mut self, range: Range<usize>, other: &SparseBitVec) {
        self.set_scanner(range.start, range.end, Some(other), Op::Or);
    }

    /// Symmetric difference within `range`.
    pub fn xor_range(&mut self, range: Range<usize>, other: &SparseBitVec) {
        self.set_scanner(range.start, range.end, Some(other), Op::Xor);
    }

    /// Returns a new vector holding exactly the bits of `self` in `range`,
    /// at their original positions.
    pub fn extract_range(&self, range: Range<usize>) -> SparseBitVec {
        let mut out = SparseBitVec::with_capacity(range.end.min(self.bit_capacity()));
        out.set_scanner(range.start, range.end, Some(self), Op::Copy);
        out
    }

    // --- Queries ---

    /// Returns the smallest set bit at or above `from`, if any.
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        let start_word = from / WORD_BITS;
        let first_mask = !mask_to(from % WORD_BITS);
        let mut li = start_word / LEAF_WORDS;
        let leaf_count = self.areas.len() * AREA_LEAVES;
        while li < leaf_count {
            let u1 = li / AREA_LEAVES;
            let Some(area) = &self.areas[u1] else {
                li = (u1 + 1) * AREA_LEAVES;
                continue;
            };
            let Some(leaf) = &area[li % AREA_LEAVES] else {
                li += 1;
                continue;
            };
            let w_start = if li == start_word / LEAF_WORDS {
                start_word % LEAF_WORDS
            } else {
                0
            };
            for w3 in w_start..LEAF_WORDS {
                let mut word = leaf[w3];
                if li * LEAF_WORDS + w3 == start_word {
                    word &= first_mask;
                }
                if word != 0 {
                    return Some(
                        (li * LEAF_WORDS + w3) * WORD_BITS + word.trailing_zeros() as usize,
                    );
                }
            }
            li += 1;
        }
        None
    }

    /// Returns the smallest clear bit at or above `from`. Always exists,
    /// since the vector is conceptually zero beyond its extent.
    pub fn next_clear_bit(&self, from: usize) -> usize {
        let mut pos = from;
        loop {
            let w = pos / WORD_BITS;
            match self.word(w) {
                None => return pos,
                Some(word) => {
                    let inverted = !word & !mask_to(pos % WORD_BITS);
                    if inverted != 0 {
                        return w * WORD_BITS + inverted.trailing_zeros() as usize;
                    }
                    pos = (w + 1) * WORD_BITS;
                }
            }
        }
    }

    /// Returns the largest set bit at or below `index`, if any.
    pub fn previous_set_bit(&self, index: usize) -> Option<usize> {
        let total_words = self.areas.len() * AREA_LEAVES * LEAF_WORDS;
        if total_words == 0 {
            return None;
        }
        let mut word_idx = index / WORD_BITS;
        let mut m = mask_to(index % WORD_BITS + 1);
        if word_idx >= total_words {
            word_idx = total_words - 1;
            m = !0;
        }
        loop {
            // Lowest word index covered by the absent subtree around
            // `word_idx`, or `word_idx` itself when its word exists.
            let skip_to = match &self.areas[word_idx / (LEAF_WORDS * AREA_LEAVES)] {
                None => word_idx / (LEAF_WORDS * AREA_LEAVES) * LEAF_WORDS * AREA_LEAVES,
                Some(area) => match &area[(word_idx / LEAF_WORDS) % AREA_LEAVES] {
                    None => word_idx / LEAF_WORDS * LEAF_WORDS,
                    Some(leaf) => {
                        let word = leaf[word_idx % LEAF_WORDS] & m;
                        if word != 0 {
                            return Some(
                                word_idx * WORD_BITS + WORD_BITS
                                    - 1
                                    - word.leading_zeros() as usize,
                            );
                        }
                        word_idx
                    }
                },
            };
            if skip_to == 0 {
                return None;
            }
            word_idx = skip_to - 1;
            m = !0;
        }
    }

    /// Returns the largest clear bit at or below `index`, if any.
    pub fn previous_clear_bit(&self, index: usize) -> Option<usize> {
        let mut pos = index;
        loop {
            let w = pos / WORD_BITS;
            match self.word(w) {
                None => return Some(pos),
                Some(word) => {
                    let inverted = !word & mask_to(pos % WORD_BITS + 1);
                    if inverted != 0 {
                        return Some(
                            w * WORD_BITS + WORD_BITS - 1 - inverted.leading_zeros() as usize,
                        );
                    }
                    if w == 0 {
                        return None;
                    }
                    pos = w * WORD_BITS - 1;
                }
            }
        }
    }

    /// Returns true if any bit is set in both vectors.
    pub fn intersects(&self, other: &SparseBitVec) -> bool {
        let common = self.areas.len().min(other.areas.len());
        for u1 in 0..common {
            let (Some(a), Some(b)) = (&self.areas[u1], &other.areas[u1]) else {
                continue;
            };
            for u2 in 0..AREA_LEAVES {
                let (Some(la), Some(lb)) = (&a[u2], &b[u2]) else {
                    continue;
                };
                if la.iter().zip(lb.iter()).any(|(&x, &y)| x & y != 0) {
                    return true;
                }
            }
        }
        false
    }

    /// Returns true if every set bit of `other` is also set here.
    pub fn is_superset(&self, other: &SparseBitVec) -> bool {
        for u1 in 0..other.areas.len() {
            let Some(b) = &other.areas[u1] else { continue };
            let a = self.areas.get(u1).and_then(|slot| slot.as_deref());
            for u2 in 0..AREA_LEAVES {
                let Some(lb) = &b[u2] else { continue };
                match a.and_then(|area| area[u2].as_deref()) {
                    Some(la) => {
                        if la.iter().zip(lb.iter()).any(|(&x, &y)| y & !x != 0) {
                            return false;
                        }
                    }
                    None => {
                        if lb.iter().any(|&y| y != 0) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    // --- Statistics ---

    /// Number of set bits.
    pub fn len(&self) -> usize {
        self.stats().cardinality
    }

    /// Returns true if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.stats().cardinality == 0
    }

    /// Index one past the highest set bit, or 0 if empty.
    pub fn length(&self) -> usize {
        self.stats().length
    }

    /// Number of non-zero words currently stored.
    pub fn word_count(&self) -> usize {
        self.stats().word_count
    }

    /// Order-independent content hash.
    pub fn hash_code(&self) -> u32 {
        self.stats().hash
    }

    fn stats(&self) -> Stats {
        if let Some(stats) = self.cache.get() {
            return stats;
        }
        let mut cardinality = 0;
        let mut word_count = 0;
        let mut length = 0;
        let mut hash = HASH_SEED;
        for (u1, area) in self.areas.iter().enumerate() {
            let Some(area) = area else { continue };
            for (u2, leaf) in area.iter().enumerate() {
                let Some(leaf) = leaf else { continue };
                for (w3, &word) in leaf.iter().enumerate() {
                    if word == 0 {
                        continue;
                    }
                    let w = (u1 * AREA_LEAVES + u2) * LEAF_WORDS + w3;
                    cardinality += word.count_ones() as usize;
                    word_count += 1;
                    length = w * WORD_BITS + WORD_BITS - word.leading_zeros() as usize;
                    hash ^= word.wrapping_mul(w as u64 + 1);
                }
            }
        }
        let stats = Stats {
            cardinality,
            length,
            word_count,
            hash: (hash >> 32 ^ hash) as u32,
        };
        self.cache.set(Some(stats));
        stats
    }

    /// Iterates all set bits in ascending order.
    pub fn iter(&self) -> SparseBitVecIter<'_> {
        SparseBitVecIter {
            vec: self,
            next: self.next_set_bit(0),
        }
    }

    // --- Internals ---

    fn ensure_area(&mut self, u1: usize) {
        assert!(u1 < MAX_AREAS, "index out of 31-bit range");
        if u1 >= self.areas.len() {
            let new_len = (u1 + 1).next_power_of_two().min(MAX_AREAS);
            debug!("growing level-1 vec to {new_len} areas");
            self.areas.resize_with(new_len, || None);
        }
    }

    fn take_spare(&mut self) -> Box<Leaf> {
        self.spare
            .take()
            .unwrap_or_else(|| Box::new([0; LEAF_WORDS]))
    }

    fn leaf_present(&self, u1: usize, u2: usize) -> bool {
        matches!(self.areas.get(u1), Some(Some(area)) if area[u2].is_some())
    }

    fn store_leaf(&mut self, u1: usize, u2: usize, leaf: Box<Leaf>) {
        self.ensure_area(u1);
        self.areas[u1].get_or_insert_with(new_area)[u2] = Some(leaf);
    }

    /// The range scanner: applies `op` word-aligned over `[from, to)`,
    /// reading the corresponding words of `other` (absent words read as
    /// zero). Bits outside the range are untouched; empty leaves and areas
    /// discovered on the way are pruned.
    fn set_scanner(&mut self, from: usize, to: usize, other: Option<&SparseBitVec>, op: Op) {
        assert!(from <= to, "invalid range {from}..{to}");
        assert!(to <= MAX_BITS, "range end {to} out of 31-bit range");
        self.cache.set(None);
        let to = if op.grows() {
            to
        } else {
            // Non-growing ops cannot touch anything beyond the extent.
            to.min(self.bit_capacity())
        };
        if from >= to {
            return;
        }
        let props = op.props();
        let u = from / WORD_BITS;
        let v = (to - 1) / WORD_BITS;
        let um = !mask_to(from % WORD_BITS);
        let vm = mask_to((to - 1) % WORD_BITS + 1);
        let lf = u / LEAF_WORDS;
        let ll = v / LEAF_WORDS;
        let first_leaf_whole = from % LEAF_BITS == 0;
        let last_leaf_whole = to % LEAF_BITS == 0;

        for u1 in lf / AREA_LEAVES..=ll / AREA_LEAVES {
            let area_lo = u1 * AREA_LEAVES;
            let area_hi = area_lo + AREA_LEAVES - 1;
            let area_whole = (lf < area_lo || (lf == area_lo && first_leaf_whole))
                && (ll > area_hi || (ll == area_hi && last_leaf_whole));
            let have_a_area = matches!(self.areas.get(u1), Some(Some(_)));
            let b_area = other
                .and_then(|o| o.areas.get(u1))
                .and_then(|slot| slot.as_deref());

            if area_whole
                && ((!have_a_area && b_area.is_none() && props.f_op_f_eq_f)
                    || (!have_a_area && props.f_op_x_eq_f)
                    || (b_area.is_none() && props.x_op_f_eq_f))
            {
                if have_a_area {
                    self.areas[u1] = None;
                }
                continue;
            }

            for li in area_lo.max(lf)..=area_hi.min(ll) {
                let u2 = li % AREA_LEAVES;
                let leaf_whole =
                    (li != lf || first_leaf_whole) && (li != ll || last_leaf_whole);
                let have_a = self.leaf_present(u1, u2);
                let b_leaf = b_area.and_then(|area| area[u2].as_deref());

                if leaf_whole
                    && ((!have_a && b_leaf.is_none() && props.f_op_f_eq_f)
                        || (!have_a && props.f_op_x_eq_f)
                        || (b_leaf.is_none() && props.x_op_f_eq_f))
                {
                    if have_a {
                        self.areas[u1].as_mut().unwrap()[u2] = None;
                    }
                    continue;
                }
                if leaf_whole && b_leaf.is_none() && props.x_op_f_eq_x {
                    // This side is preserved unchanged; only prune if empty.
                    if have_a {
                        let area = self.areas[u1].as_mut().unwrap();
                        if area[u2].as_ref().unwrap().iter().all(|&w| w == 0) {
                            area[u2] = None;
                        }
                    }
                    continue;
                }
                if !have_a && ((b_leaf.is_none() && props.f_op_f_eq_f) || props.f_op_x_eq_f) {
                    // Partial leaf, but absence is preserved regardless.
                    continue;
                }

                let mut leaf = if have_a {
                    self.areas[u1].as_mut().unwrap()[u2].take().unwrap()
                } else {
                    self.take_spare()
                };
                let b_words: &Leaf = b_leaf.unwrap_or(&ZERO_LEAF);

                let w_lo = (li * LEAF_WORDS).max(u);
                let w_hi = (li * LEAF_WORDS + LEAF_WORDS - 1).min(v);
                let mut touched_zero = true;
                for w in w_lo..=w_hi {
                    let mut m = !0u64;
                    if w == u {
                        m &= um;
                    }
                    if w == v {
                        m &= vm;
                    }
                    touched_zero &=
                        op.word(&mut leaf[w % LEAF_WORDS], b_words[w % LEAF_WORDS], m);
                }
                let is_zero = if leaf_whole {
                    touched_zero
                } else {
                    touched_zero && leaf.iter().all(|&w| w == 0)
                };

                if is_zero {
                    if !have_a {
                        // Leaf is all zero, recycle it as the scratch block.
                        self.spare = Some(leaf);
                    }
                    // An owned leaf was taken out above, so the slot is
                    // already absent; dropping the box prunes it.
                } else {
                    self.store_leaf(u1, u2, leaf);
                }
            }

            // Prune the area if everything below it vanished.
            if let Some(Some(area)) = self.areas.get(u1) {
                if area.iter().all(|leaf| leaf.is_none()) {
                    self.areas[u1] = None;
                }
            }
        }
    }
}

impl Default for SparseBitVec {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SparseBitVec {
    fn clone(&self) -> Self {
        Self {
            areas: self.areas.clone(),
            cache: Cell::new(self.cache.get()),
            spare: None,
        }
    }
}

impl PartialEq for SparseBitVec {
    fn eq(&self, other: &Self) -> bool {
        let max = self.areas.len().max(other.areas.len());
        for u1 in 0..max {
            let a = self.areas.get(u1).and_then(|slot| slot.as_deref());
            let b = other.areas.get(u1).and_then(|slot| slot.as_deref());
            for u2 in 0..AREA_LEAVES {
                let la = a.and_then(|area| area[u2].as_deref()).unwrap_or(&ZERO_LEAF);
                let lb = b.and_then(|area| area[u2].as_deref()).unwrap_or(&ZERO_LEAF);
                if la != lb {
                    return false;
                }
            }
        }
        true
    }
}

impl Eq for SparseBitVec {}

impl fmt::Debug for SparseBitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Extend<usize> for SparseBitVec {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for index in iter {
            self.set(index);
        }
    }
}

impl FromIterator<usize> for SparseBitVec {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut vec = SparseBitVec::new();
        vec.extend(iter);
        vec
    }
}

/// Iterator over set bits of a [`SparseBitVec`] in ascending order.
pub struct SparseBitVecIter<'a> {
    vec: &'a SparseBitVec,
    next: Option<usize>,
}

impl Iterator for SparseBitVecIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.vec.next_set_bit(current + 1);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeSet;

    fn collect(vec: &SparseBitVec) -> Vec<usize> {
        vec.iter().collect()
    }

    /// Number of allocated leaf blocks; exposes pruning behavior.
    fn allocated_leaves(vec: &SparseBitVec) -> usize {
        vec.areas
            .iter()
            .flatten()
            .map(|area| area.iter().flatten().count())
            .sum()
    }

    #[test]
    fn test_set_get_clear() {
        let mut vec = SparseBitVec::new();
        assert!(!vec.contains(7));
        vec.set(7);
        assert!(vec.contains(7));
        assert_eq!(vec.len(), 1);
        vec.clear(7);
        assert!(!vec.contains(7));
        assert!(vec.is_empty());
    }

    #[test]
    fn test_word_boundary_range() {
        let mut vec = SparseBitVec::new();
        vec.set_range(63..65);
        assert_eq!(collect(&vec), vec![63, 64]);
        vec.flip_range(64..66);
        assert_eq!(collect(&vec), vec![63, 65]);
        vec.clear_range(63..66);
        assert!(vec.is_empty());
    }

    #[test]
    fn test_leaf_and_area_boundaries() {
        let mut vec = SparseBitVec::new();
        // Leaf boundary (2048) and area boundary (65_536).
        vec.set_range(2047..2049);
        vec.set_range(65_535..65_537);
        assert_eq!(collect(&vec), vec![2047, 2048, 65_535, 65_536]);
        assert_eq!(vec.length(), 65_537);
    }

    #[test]
    fn test_large_interior_range() {
        let mut vec = SparseBitVec::new();
        vec.set_range(100..200_000);
        assert_eq!(vec.len(), 200_000 - 100);
        assert!(!vec.contains(99));
        assert!(vec.contains(100));
        assert!(vec.contains(199_999));
        assert!(!vec.contains(200_000));
        vec.clear_range(150..199_999);
        assert_eq!(vec.len(), 51);
    }

    #[test]
    fn test_sparse_growth() {
        let mut vec = SparseBitVec::new();
        vec.set(1 << 25);
        assert!(vec.contains(1 << 25));
        assert_eq!(vec.len(), 1);
        assert_eq!(allocated_leaves(&vec), 1);
        assert_eq!(vec.length(), (1 << 25) + 1);
    }

    #[test]
    #[should_panic(expected = "out of 31-bit range")]
    fn test_index_overflow_panics() {
        let mut vec = SparseBitVec::new();
        vec.set(MAX_BITS);
    }

    #[test]
    fn test_max_index_mask() {
        let mut vec = SparseBitVec::new();
        vec.set_range(MAX_BITS - 2..MAX_BITS);
        assert!(vec.contains(MAX_BITS - 1));
        assert_eq!(vec.len(), 2);
        assert_eq!(vec.length(), MAX_BITS);
    }

    #[test]
    fn test_and_prunes_disjoint() {
        let mut a = SparseBitVec::new();
        a.set_range(0..4096);
        let mut b = SparseBitVec::new();
        b.set_range(70_000..70_010);
        a.and(&b);
        assert!(a.is_empty());
        assert_eq!(allocated_leaves(&a), 0);
    }

    #[test]
    fn test_clear_range_prunes() {
        let mut vec = SparseBitVec::new();
        vec.set_range(0..65_536);
        let before = allocated_leaves(&vec);
        vec.clear_range(0..65_536);
        assert!(vec.is_empty());
        assert!(allocated_leaves(&vec) < before);
        assert_eq!(allocated_leaves(&vec), 0);
    }

    #[test]
    fn test_bulk_ops_match_reference() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let a_ref: BTreeSet<usize> =
                (0..200).map(|_| rng.gen_range(0..150_000)).collect();
            let b_ref: BTreeSet<usize> =
                (0..200).map(|_| rng.gen_range(0..150_000)).collect();
            let a: SparseBitVec = a_ref.iter().copied().collect();
            let b: SparseBitVec = b_ref.iter().copied().collect();

            let mut and = a.clone();
            and.and(&b);
            assert_eq!(collect(&and), a_ref.intersection(&b_ref).copied().collect::<Vec<_>>());

            let mut or = a.clone();
            or.or(&b);
            assert_eq!(collect(&or), a_ref.union(&b_ref).copied().collect::<Vec<_>>());

            let mut xor = a.clone();
            xor.xor(&b);
            assert_eq!(
                collect(&xor),
                a_ref.symmetric_difference(&b_ref).copied().collect::<Vec<_>>()
            );

            let mut diff = a.clone();
            diff.and_not(&b);
            assert_eq!(collect(&diff), a_ref.difference(&b_ref).copied().collect::<Vec<_>>());

            assert_eq!(a.intersects(&b), !a_ref.is_disjoint(&b_ref));
            assert!(or.is_superset(&a));
            assert_eq!(a.is_superset(&or), a_ref.is_superset(&b_ref));
        }
    }

    #[test]
    fn test_ranged_or() {
        let mut a = SparseBitVec::new();
        let b: SparseBitVec = [10, 100, 3000, 70_000].into_iter().collect();
        a.or_range(50..65_000, &b);
        assert_eq!(collect(&a), vec![100, 3000]);
    }

    #[test]
    fn test_extract_range() {
        let vec: SparseBitVec = [1, 63, 64, 2048, 70_000].into_iter().collect();
        let sub = vec.extract_range(63..2049);
        assert_eq!(collect(&sub), vec![63, 64, 2048]);
    }

    #[test]
    fn test_next_and_previous_bits() {
        let vec: SparseBitVec = [5, 2048, 100_000].into_iter().collect();
        assert_eq!(vec.next_set_bit(0), Some(5));
        assert_eq!(vec.next_set_bit(6), Some(2048));
        assert_eq!(vec.next_set_bit(100_001), None);
        assert_eq!(vec.next_clear_bit(5), 6);
        assert_eq!(vec.previous_set_bit(2047), Some(5));
        assert_eq!(vec.previous_set_bit(4), None);
        assert_eq!(vec.previous_set_bit(1 << 30), Some(100_000));
        assert_eq!(vec.previous_clear_bit(2048), Some(2047));
    }

    #[test]
    fn test_next_clear_bit_dense_prefix() {
        let mut vec = SparseBitVec::new();
        vec.set_range(0..3000);
        assert_eq!(vec.next_clear_bit(0), 3000);
        assert_eq!(vec.previous_clear_bit(2999), None);
    }

    #[test]
    fn test_stats_cache_invalidation() {
        let mut vec = SparseBitVec::new();
        vec.set_range(0..100);
        assert_eq!(vec.len(), 100);
        assert_eq!(vec.length(), 100);
        vec.set(500);
        assert_eq!(vec.len(), 101);
        assert_eq!(vec.length(), 501);
        vec.clear(500);
        assert_eq!(vec.length(), 100);
    }

    #[test]
    fn test_hash_is_content_based() {
        let a: SparseBitVec = [1, 70_000, 5].into_iter().collect();
        let mut b = SparseBitVec::new();
        b.set_range(0..70_001);
        b.clear_range(0..70_001);
        b.set(70_000);
        b.set(5);
        b.set(1);
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());
    }

    #[test]
    fn test_equality_ignores_extent() {
        let mut a = SparseBitVec::new();
        let b = SparseBitVec::with_capacity(1 << 20);
        assert_eq!(a, b);
        a.set(3);
        assert_ne!(a, b);
    }
}
