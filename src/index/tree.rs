//! BTreeMap-based forward index
//!
//! Maps index keys to the ordered set of object identifiers having that key.
//! Keys with no remaining object are removed, so the number of keys is the
//! number of distinct values currently indexed.

use std::collections::BTreeMap;
use std::ops::Bound;

use super::key::IndexKey;
use crate::model::{Iid, IidSet};

/// Forward index: key -> object identifiers
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValueTree {
    tree: BTreeMap<IndexKey, IidSet>,
}

impl ValueTree {
    /// Creates a new empty tree
    pub fn new() -> Self {
        Self {
            tree: BTreeMap::new(),
        }
    }

    /// Insert an object identifier for a key
    pub fn insert(&mut self, key: IndexKey, iid: Iid) {
        self.tree.entry(key).or_default().insert(iid);
    }

    /// Remove an object identifier for a key.
    ///
    /// If the key has no more identifiers, removes the key entirely.
    pub fn remove(&mut self, key: &IndexKey, iid: Iid) {
        if let Some(ids) = self.tree.get_mut(key) {
            ids.remove(&iid);
            if ids.is_empty() {
                self.tree.remove(key);
            }
        }
    }

    /// Identifiers stored for an exact key
    pub fn get(&self, key: &IndexKey) -> Option<&IidSet> {
        self.tree.get(key)
    }

    /// Entries whose key is in `[low, high]`, or `>= low` when `high` is None.
    ///
    /// An inverted range yields nothing.
    pub fn range<'a>(
        &'a self,
        low: &IndexKey,
        high: Option<&IndexKey>,
    ) -> impl Iterator<Item = (&'a IndexKey, &'a IidSet)> + 'a {
        let bounds = match high {
            Some(high) if high < low => None,
            Some(high) => Some((Bound::Included(low.clone()), Bound::Included(high.clone()))),
            None => Some((Bound::Included(low.clone()), Bound::Unbounded)),
        };
        bounds.into_iter().flat_map(move |b| self.tree.range(b))
    }

    /// All entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&IndexKey, &IidSet)> {
        self.tree.iter()
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the number of distinct keys
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }

    /// Returns the total number of (key, identifier) pairs
    pub fn entry_count(&self) -> usize {
        self.tree.values().map(|ids| ids.len()).sum()
    }
}
