//! Observable catalog events
//!
//! Events are explicit and typed. Begin/complete pairs of long operations
//! (recompute, population) are logged through `ObservationScope` instead.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Catalog configuration loaded
    ConfigLoaded,
    /// Catalogs and their indexes built from configuration
    CatalogLoaded,

    // Indexing
    /// An object value could not be converted for an index
    IndexingFailed,
    /// Object scan failed (FATAL)
    ScanFailed,

    // Queries
    /// A query value or operator was rejected by an index
    QueryInvalid,
    /// Sort strategy chosen for a result set
    SortStrategy,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::IndexingFailed => "INDEXING_FAILED",
            Event::ScanFailed => "SCAN_FAILED",
            Event::QueryInvalid => "QUERY_INVALID",
            Event::SortStrategy => "SORT_STRATEGY",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ScanFailed => Severity::Fatal,
            Event::IndexingFailed | Event::QueryInvalid => Severity::Error,
            Event::SortStrategy => Severity::Trace,
            Event::ConfigLoaded | Event::CatalogLoaded => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
