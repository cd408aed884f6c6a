//! Inverted index over one field of one class
//!
//! # Maps
//!
//! - `by_value`: index key -> ids of objects having that key (ordered)
//! - `by_object`: id -> value stored for the object
//!
//! # Invariants
//!
//! - `id` is in `by_value[k]` iff `by_object[id]` is `k` or contains `k`
//! - Values are converted before any map is touched, so a conversion
//!   failure leaves both maps as they were
//! - Empty values are never stored
//!
//! # API
//!
//! - `index_object(iid, raw)` - insert, update or remove an object's entry
//! - `unindex_object(iid)` - remove an object's entry
//! - `search(query, running)` - ids matching a query, within a running set
//! - `get_by_value(value)` / `get_by_range(low, high)` - forward lookups
//! - `get_by_object(iid)` - reverse lookup, decoded
//! - `recompute(scan)` - rebuild from every stored object of the class

use std::collections::HashMap;

use serde::Serialize;

use super::errors::{IndexError, IndexResult};
use super::key::{IndexKey, IndexValue};
use super::tree::ValueTree;
use crate::codec::{Codec, CodecResult, FieldSpec};
use crate::model::{FieldValue, Iid, IidSet, ObjectScan};
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::query::Query;

/// One object that could not be indexed during a recompute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexingFailure {
    pub iid: Iid,
    pub index: String,
    pub message: String,
}

impl IndexingFailure {
    /// Fields of the `INDEXING_FAILED` line, with the iid already rendered
    pub fn log_fields<'a>(&'a self, catalog: &'a str, iid: &'a str) -> [(&'a str, &'a str); 4] {
        [
            ("catalog", catalog),
            ("index", self.index.as_str()),
            ("iid", iid),
            ("reason", self.message.as_str()),
        ]
    }

    pub fn log(&self, catalog: &str) {
        let iid = self.iid.to_string();
        log_event_with_fields(Event::IndexingFailed, &self.log_fields(catalog, &iid));
    }
}

/// Outcome of an index recompute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecomputeReport {
    pub catalog: String,
    pub index: String,
    pub values_before: usize,
    pub values_after: usize,
    pub objects_before: usize,
    pub objects_after: usize,
    pub failures: Vec<IndexingFailure>,
}

/// Index size, for administrative screens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub name: String,
    pub codec: &'static str,
    pub values: usize,
    pub objects: usize,
}

/// Inverted index on one field
#[derive(Debug, Clone)]
pub struct Index {
    catalog: String,
    field: FieldSpec,
    by_value: ValueTree,
    by_object: HashMap<Iid, IndexValue>,
}

impl Index {
    /// Creates an empty index on `field` for the catalog of class `catalog`
    pub fn new(catalog: impl Into<String>, field: FieldSpec) -> Self {
        Self {
            catalog: catalog.into(),
            field,
            by_value: ValueTree::new(),
            by_object: HashMap::new(),
        }
    }

    /// Index name (= name of the indexed field)
    pub fn name(&self) -> &str {
        &self.field.name
    }

    /// Name of the catalog (= class) this index belongs to
    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn field(&self) -> &FieldSpec {
        &self.field
    }

    pub fn codec(&self) -> Codec {
        self.field.codec
    }

    // ---------------------------------------------------------------------
    // Maintenance
    // ---------------------------------------------------------------------

    /// Indexes `raw`, the current value of the field on object `iid`.
    ///
    /// Returns true if the index changed:
    ///
    /// - empty value, no entry: nothing to do
    /// - empty value, an entry: the entry is removed
    /// - no entry: the value is added
    /// - same value as stored: nothing to do
    /// - other value: the old value is replaced
    pub fn index_object(&mut self, iid: Iid, raw: &FieldValue) -> IndexResult<bool> {
        let raw = match &self.field.empty_index_value {
            Some(fallback) if raw.is_empty() => fallback,
            _ => raw,
        };
        let value = self
            .field
            .codec
            .to_indexed(raw, &self.field)
            .map_err(|e| IndexError::indexing_failed(&self.catalog, self.name(), iid, e))?;

        let Some(value) = value else {
            return Ok(self.unindex_object(iid));
        };
        if self.by_object.get(&iid) == Some(&value) {
            return Ok(false);
        }
        self.unindex_object(iid);
        self.add(iid, value);
        Ok(true)
    }

    /// Removes the entry of object `iid`. Returns false if there was none.
    pub fn unindex_object(&mut self, iid: Iid) -> bool {
        match self.by_object.remove(&iid) {
            Some(value) => {
                for key in value.keys() {
                    self.by_value.remove(key, iid);
                }
                true
            }
            None => false,
        }
    }

    fn add(&mut self, iid: Iid, value: IndexValue) {
        for key in value.keys() {
            self.by_value.insert(key.clone(), iid);
        }
        self.by_object.insert(iid, value);
    }

    /// Empties both maps
    pub fn clear(&mut self) {
        self.by_value.clear();
        self.by_object.clear();
    }

    /// Rebuilds the index from every live object of the catalog's class.
    ///
    /// Objects failing conversion are reported and skipped. A scan failure
    /// aborts the recompute and leaves the index partially rebuilt.
    pub fn recompute<S: ObjectScan>(&mut self, scan: &mut S) -> IndexResult<RecomputeReport> {
        let catalog = self.catalog.clone();
        let name = self.name().to_string();
        let scope = ObservationScope::with_fields(
            "INDEX_RECOMPUTE",
            &[("catalog", catalog.as_str()), ("index", name.as_str())],
        );

        let values_before = self.value_count();
        let objects_before = self.object_count();
        self.clear();

        if let Err(e) = scan.reset() {
            scope.fail_fatal(e.message());
            return Err(e);
        }

        let mut failures = Vec::new();
        loop {
            let object = match scan.scan_next() {
                Ok(Some(object)) => object,
                Ok(None) => break,
                Err(e) => {
                    log_event_with_fields(
                        Event::ScanFailed,
                        &[
                            ("position", scan.position().to_string().as_str()),
                            ("reason", e.message()),
                        ],
                    );
                    scope.fail_fatal(e.message());
                    return Err(e);
                }
            };
            if object.deleted || object.class_name != catalog {
                continue;
            }
            if let Err(e) = self.index_object(object.iid, object.value(&name)) {
                let failure = IndexingFailure {
                    iid: object.iid,
                    index: name.clone(),
                    message: e.to_string(),
                };
                failure.log(&catalog);
                failures.push(failure);
            }
        }

        let report = RecomputeReport {
            catalog,
            index: name,
            values_before,
            values_after: self.value_count(),
            objects_before,
            objects_after: self.object_count(),
            failures,
        };
        scope.complete_with_fields(&[
            ("values_before", report.values_before.to_string().as_str()),
            ("values_after", report.values_after.to_string().as_str()),
            ("objects_before", report.objects_before.to_string().as_str()),
            ("objects_after", report.objects_after.to_string().as_str()),
            ("failures", report.failures.len().to_string().as_str()),
        ]);
        Ok(report)
    }

    // ---------------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------------

    /// Ids matching `query`, narrowed to `running`.
    ///
    /// `running` is the result set of the criteria applied so far, None if
    /// no criterion narrowed it yet. Returns None when nothing matches.
    pub fn search(&self, query: &Query, running: Option<&IidSet>) -> IndexResult<Option<IidSet>> {
        let (found, intersected) = query.apply(self, running).map_err(|e| {
            let term = if query.is_operator() { "operator" } else { "index value" };
            let error =
                IndexError::query_invalid(&self.catalog, self.name(), term, &query.to_string(), e);
            log_event_with_fields(Event::QueryInvalid, &[("reason", error.message())]);
            error
        })?;

        let found = match (found, running) {
            (Some(found), Some(running)) if !intersected => {
                found.intersection(running).copied().collect()
            }
            (Some(found), _) => found,
            (None, _) => return Ok(None),
        };
        Ok(if found.is_empty() { None } else { Some(found) })
    }

    /// Forward-map key of a query value
    pub fn term(&self, value: &FieldValue) -> CodecResult<IndexKey> {
        self.field.codec.to_term(value, &self.field)
    }

    /// Ids stored under an exact key
    pub fn ids(&self, key: &IndexKey) -> Option<&IidSet> {
        self.by_value.get(key)
    }

    /// Ids of objects having value `value`
    pub fn get_by_value(&self, value: &FieldValue) -> IndexResult<Option<&IidSet>> {
        let key = self.term(value).map_err(|e| {
            IndexError::query_invalid(&self.catalog, self.name(), "index value", &value.to_string(), e)
        })?;
        Ok(self.by_value.get(&key))
    }

    /// Entries whose key is `>= low`, and `<= high` when given
    pub fn get_by_range(
        &self,
        low: &FieldValue,
        high: Option<&FieldValue>,
    ) -> IndexResult<Vec<(&IndexKey, &IidSet)>> {
        let to_key = |v: &FieldValue| {
            self.term(v).map_err(|e| {
                IndexError::query_invalid(&self.catalog, self.name(), "index value", &v.to_string(), e)
            })
        };
        let low = to_key(low)?;
        let high = high.map(to_key).transpose()?;
        Ok(self.by_value.range(&low, high.as_ref()).collect())
    }

    /// Ids of every object having an entry
    pub fn all_ids(&self) -> IidSet {
        self.by_object.keys().copied().collect()
    }

    /// Value stored for object `iid`, in internal form
    pub fn stored_value(&self, iid: Iid) -> Option<&IndexValue> {
        self.by_object.get(&iid)
    }

    /// Value stored for object `iid`, converted back to a field value
    pub fn get_by_object(&self, iid: Iid) -> IndexResult<Option<FieldValue>> {
        self.by_object
            .get(&iid)
            .map(|value| self.field.codec.from_indexed(value))
            .transpose()
            .map_err(|e| IndexError::indexing_failed(&self.catalog, self.name(), iid, e))
    }

    /// Forward map, in key order
    pub fn by_value(&self) -> &ValueTree {
        &self.by_value
    }

    // ---------------------------------------------------------------------
    // Stats & display
    // ---------------------------------------------------------------------

    /// Number of distinct indexed values
    pub fn value_count(&self) -> usize {
        self.by_value.key_count()
    }

    /// Number of indexed objects
    pub fn object_count(&self) -> usize {
        self.by_object.len()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            name: self.name().to_string(),
            codec: self.codec().as_str(),
            values: self.value_count(),
            objects: self.object_count(),
        }
    }

    /// Human-readable rendering of a raw field value
    pub fn display(&self, raw: &FieldValue) -> Option<String> {
        self.field.codec.display(raw, &self.field)
    }

    /// Checks that both maps describe the same entries
    pub fn is_consistent(&self) -> bool {
        let forward_ok = self.by_value.iter().all(|(key, ids)| {
            ids.iter().all(|iid| {
                self.by_object
                    .get(iid)
                    .is_some_and(|value| value.contains(key))
            })
        });
        let reverse_ok = self.by_object.iter().all(|(iid, value)| {
            value
                .keys()
                .iter()
                .all(|key| self.by_value.get(key).is_some_and(|ids| ids.contains(iid)))
        });
        forward_ok && reverse_ok
    }
}
