//! Catalogs: the indexes of one class
//!
//! A catalog holds one index per indexed field of its class and keeps all of
//! them up to date when an object is written. Searches span several indexes:
//! each criterion narrows the result set of the previous ones, in the order
//! given by the caller.

mod registry;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::Serialize;

pub use registry::{CatalogRegistry, PopulateReport};

use crate::codec::FieldSpec;
use crate::index::{Index, IndexError, IndexResult, IndexStats, RecomputeReport};
use crate::model::{Iid, IidSet, ObjectScan, StoredObject};
use crate::query::Query;
use crate::sorter::{LazySorted, Sorter};

/// Sizes of a catalog and of its indexes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub catalog: String,
    /// Objects present in at least one index
    pub objects: usize,
    pub indexes: Vec<IndexStats>,
}

/// All indexes of one class
#[derive(Debug, Clone)]
pub struct Catalog {
    class_name: String,
    indexes: BTreeMap<String, Index>,
}

impl Catalog {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            indexes: BTreeMap::new(),
        }
    }

    /// Name of the catalog's class
    pub fn name(&self) -> &str {
        &self.class_name
    }

    /// Adds an empty index on `field`, replacing any index on the same field
    pub fn add_index(&mut self, field: FieldSpec) -> &mut Index {
        let index = Index::new(self.class_name.as_str(), field);
        match self.indexes.entry(index.name().to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(index);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(index),
        }
    }

    pub fn index(&self, name: &str) -> IndexResult<&Index> {
        self.indexes
            .get(name)
            .ok_or_else(|| IndexError::unknown_index(&self.class_name, name))
    }

    pub fn index_mut(&mut self, name: &str) -> IndexResult<&mut Index> {
        self.indexes
            .get_mut(name)
            .ok_or_else(|| IndexError::unknown_index(&self.class_name, name))
    }

    /// Index names, in alphabetical order
    pub fn index_names(&self) -> impl Iterator<Item = &str> {
        self.indexes.keys().map(String::as_str)
    }

    pub fn indexes(&self) -> impl Iterator<Item = &Index> {
        self.indexes.values()
    }

    /// Updates every index for `object`.
    ///
    /// A deleted object is removed from all indexes. When an index rejects
    /// the object's value, the other indexes are still updated and the first
    /// error is returned. Returns true if any index changed.
    pub fn index_object(&mut self, object: &StoredObject) -> IndexResult<bool> {
        if object.deleted {
            return Ok(self.unindex_object(object.iid));
        }
        let mut changed = false;
        let mut first_error = None;
        for (name, index) in self.indexes.iter_mut() {
            match index.index_object(object.iid, object.value(name)) {
                Ok(c) => changed |= c,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(changed),
        }
    }

    /// Removes object `iid` from every index. Returns true if it was in any.
    pub fn unindex_object(&mut self, iid: Iid) -> bool {
        let mut removed = false;
        for index in self.indexes.values_mut() {
            removed |= index.unindex_object(iid);
        }
        removed
    }

    /// Ids of objects present in at least one index
    pub fn all_ids(&self) -> IidSet {
        let mut ids = IidSet::new();
        for index in self.indexes.values() {
            ids.extend(index.all_ids());
        }
        ids
    }

    /// Ids matching every criterion; None when nothing matches.
    ///
    /// Without criteria, every object of the catalog matches.
    pub fn search<S: AsRef<str>>(&self, criteria: &[(S, Query)]) -> IndexResult<Option<IidSet>> {
        let mut running: Option<IidSet> = None;
        for (field, query) in criteria {
            let index = self.index(field.as_ref())?;
            match index.search(query, running.as_ref())? {
                Some(found) => running = Some(found),
                None => return Ok(None),
            }
        }
        let found = running.unwrap_or_else(|| self.all_ids());
        Ok(if found.is_empty() { None } else { Some(found) })
    }

    /// Ids matching every criterion, sorted on index `sort_by`
    pub fn search_sorted<S: AsRef<str>>(
        &self,
        criteria: &[(S, Query)],
        sort_by: &str,
        reverse: bool,
    ) -> IndexResult<LazySorted> {
        let sort_index = self.index(sort_by)?;
        Ok(match self.search(criteria)? {
            Some(rs) => Sorter::new(sort_index, &rs, reverse).run(),
            None => LazySorted::empty(),
        })
    }

    /// Rebuilds index `name` from the stored objects
    pub fn recompute<S: ObjectScan>(&mut self, name: &str, scan: &mut S) -> IndexResult<RecomputeReport> {
        self.index_mut(name)?.recompute(scan)
    }

    /// Rebuilds every index, one scan per index
    pub fn recompute_all<S: ObjectScan>(&mut self, scan: &mut S) -> IndexResult<Vec<RecomputeReport>> {
        let mut reports = Vec::with_capacity(self.indexes.len());
        for index in self.indexes.values_mut() {
            reports.push(index.recompute(scan)?);
        }
        Ok(reports)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            catalog: self.class_name.clone(),
            objects: self.all_ids().len(),
            indexes: self.indexes.values().map(Index::stats).collect(),
        }
    }
}
