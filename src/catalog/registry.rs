//! Catalog registry
//!
//! Owns one catalog per configured class. Objects are routed to the catalog
//! of their class; objects of classes without a catalog are ignored.
//!
//! Mutations (`index_object`, `populate`, `recompute`) take `&mut self`: a
//! host sharing the registry between threads wraps it in a lock, which
//! gives recompute the exclusive access it needs.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Catalog, CatalogStats};
use crate::config::CatalogConfig;
use crate::index::{IndexError, IndexResult, IndexingFailure, RecomputeReport};
use crate::model::{Iid, ObjectScan, StoredObject};
use crate::observability::{log_event_with_fields, Event, ObservationScope};

/// Outcome of indexing every stored object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulateReport {
    /// Objects read from the scan
    pub scanned: usize,
    /// Objects belonging to a catalog and indexed without error
    pub indexed: usize,
    pub failures: Vec<IndexingFailure>,
}

/// Catalogs keyed by class name
#[derive(Debug, Clone, Default)]
pub struct CatalogRegistry {
    catalogs: BTreeMap<String, Catalog>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds empty catalogs and indexes as configured
    pub fn from_config(config: &CatalogConfig) -> Self {
        let mut registry = Self::new();
        for class in &config.classes {
            let mut catalog = Catalog::new(class.name.as_str());
            for index in &class.indexes {
                catalog.add_index(index.to_field_spec());
            }
            log_event_with_fields(
                Event::CatalogLoaded,
                &[
                    ("catalog", class.name.as_str()),
                    ("indexes", class.indexes.len().to_string().as_str()),
                ],
            );
            registry.add(catalog);
        }
        registry
    }

    /// Adds a catalog, replacing any catalog of the same class
    pub fn add(&mut self, catalog: Catalog) {
        self.catalogs.insert(catalog.name().to_string(), catalog);
    }

    pub fn catalog(&self, name: &str) -> IndexResult<&Catalog> {
        self.catalogs
            .get(name)
            .ok_or_else(|| IndexError::unknown_catalog(name))
    }

    pub fn catalog_mut(&mut self, name: &str) -> IndexResult<&mut Catalog> {
        self.catalogs
            .get_mut(name)
            .ok_or_else(|| IndexError::unknown_catalog(name))
    }

    /// Class names having a catalog, in alphabetical order
    pub fn catalog_names(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }

    /// Updates the catalog of the object's class, if any
    pub fn index_object(&mut self, object: &StoredObject) -> IndexResult<bool> {
        match self.catalogs.get_mut(&object.class_name) {
            Some(catalog) => catalog.index_object(object),
            None => Ok(false),
        }
    }

    /// Removes object `iid` from the catalog of class `class_name`
    pub fn unindex_object(&mut self, class_name: &str, iid: Iid) -> IndexResult<bool> {
        Ok(self.catalog_mut(class_name)?.unindex_object(iid))
    }

    /// Indexes every object of the scan.
    ///
    /// Objects failing to index are reported; a scan failure aborts.
    pub fn populate<S: ObjectScan>(&mut self, scan: &mut S) -> IndexResult<PopulateReport> {
        let scope = ObservationScope::new("CATALOG_POPULATE");
        if let Err(e) = scan.reset() {
            scope.fail_fatal(e.message());
            return Err(e);
        }

        let mut report = PopulateReport::default();
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
            report.scanned += 1;
            if object.deleted || !self.catalogs.contains_key(&object.class_name) {
                continue;
            }
            match self.index_object(&object) {
                Ok(_) => report.indexed += 1,
                Err(e) => {
                    let failure = IndexingFailure {
                        iid: object.iid,
                        index: e.index().unwrap_or_default().to_string(),
                        message: e.to_string(),
                    };
                    failure.log(&object.class_name);
                    report.failures.push(failure);
                }
            }
        }

        scope.complete_with_fields(&[
            ("scanned", report.scanned.to_string().as_str()),
            ("indexed", report.indexed.to_string().as_str()),
            ("failures", report.failures.len().to_string().as_str()),
        ]);
        Ok(report)
    }

    /// Rebuilds index `index` of catalog `catalog` from the stored objects
    pub fn recompute<S: ObjectScan>(
        &mut self,
        catalog: &str,
        index: &str,
        scan: &mut S,
    ) -> IndexResult<RecomputeReport> {
        self.catalog_mut(catalog)?.recompute(index, scan)
    }

    /// Sizes of every catalog
    pub fn stats(&self) -> Vec<CatalogStats> {
        self.catalogs.values().map(Catalog::stats).collect()
    }
}
