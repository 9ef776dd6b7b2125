//! # natset-rs: adaptive sets of natural numbers
//!
//! **`natset-rs`** provides mutable sets over the natural numbers with
//! interchangeable backing representations: a single machine word, a dense
//! bit vector, a sparse word trie, a compressed Roaring bitmap, and
//! degenerate forms for singletons and contiguous ranges.
//!
//! ## Why adaptive representations?
//!
//! The right storage for an index set depends on its density and extent,
//! which often is only known at runtime. Every representation here answers
//! the same queries, so call sites pick one through the
//! [`NatSetFactory`][crate::factory::NatSetFactory] from size hints and
//! swap it later with [`compact`][crate::factory::NatSetFactory::compact]
//! without touching the surrounding code.
//!
//! ## Key Features
//!
//! - **One contract**: membership, navigation (`next_present`,
//!   `previous_absent`, ...), ranged mutation, and set algebra across all
//!   representations, unified in [`NatSet`][crate::set::NatSet] and
//!   [`BoundedNatSet`][crate::set::BoundedNatSet].
//! - **O(1) complement views**: bounded sets share their backing store
//!   with their complement, so complementing is free and mutations stay
//!   visible through both views.
//! - **Sparse storage**: the [`trie`] module stores up to `2^31` bits in
//!   a four-level word trie that allocates only populated blocks.
//! - **Subset enumeration**: the [`power`] module iterates all `2^n`
//!   subsets of a set and counts them exactly.
//!
//! ## Basic Usage
//!
//! ```rust
//! use natset::factory::NatSetFactory;
//!
//! let factory = NatSetFactory::new();
//!
//! // A bounded set over the domain [0, 10).
//! let mut set = factory.bounded(10);
//! set.extend([2, 4, 6]);
//!
//! // The complement view shares the backing store.
//! let complement = set.complement();
//! assert_eq!(complement.len(), 7);
//! assert!(complement.contains(3));
//!
//! // Mutations through one view are visible through the other.
//! set.clear(4);
//! assert!(complement.contains(4));
//! ```
//!
//! ## Core Components
//!
//! - **[`set`]**: the representations and the enums tying them together.
//! - **[`factory`]**: representation selection, compaction, conversions.
//! - **[`iter`]**: element and complement iterators.
//! - **[`trie`]**, **[`bitvec`]**: the sparse and dense backing stores.

pub mod bits;
pub mod bitvec;
pub mod factory;
pub mod iter;
pub mod power;
pub mod set;
pub mod trie;

pub use factory::NatSetFactory;
pub use set::{BoundedNatSet, NatSet};
