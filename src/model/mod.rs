//! Object-layer model consumed by the catalog
//!
//! The persistence layer itself is not part of this crate. All the catalog
//! needs from it is:
//!
//! - a stable, never reused integer identifier per object (`iid`)
//! - the raw value of a field on an object
//! - a way to scan every stored object (used when recomputing an index)

mod object;
mod value;

use std::collections::BTreeSet;

pub use object::{JsonLinesScan, MemoryScan, ObjectScan, StoredObject};
pub use value::{FieldValue, ObjectRef};

/// Integer object identifier, as allocated by the object database
pub type Iid = u64;

/// Ordered set of object identifiers (a result set)
pub type IidSet = BTreeSet<Iid>;
