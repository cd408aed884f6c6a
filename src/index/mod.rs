//! Catalog index subsystem
//!
//! An index maps the values of one field to the objects having them, and
//! each object back to its value. Indexes are derived state: they can be
//! rebuilt at any time from the stored objects.
//!
//! # Design Principles
//!
//! - Derived state: indexes mirror the object store, never the source of truth
//! - In-memory only: no persistence
//! - Deterministic: BTreeMap iteration order, ordered id sets
//!
//! # Invariants
//!
//! - Forward and reverse maps always describe the same entries
//! - Reindexing an unchanged value leaves the index unchanged
//! - Lookups return ids in ascending order

mod errors;
mod inverted;
mod key;
mod tree;

pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use inverted::{Index, IndexStats, IndexingFailure, RecomputeReport};
pub use key::{IndexKey, IndexValue};
pub use tree::ValueTree;
