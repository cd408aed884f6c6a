//! Index error types
//!
//! Error codes:
//! - CATALOG_INDEXING_FAILED (ERROR)
//! - CATALOG_QUERY_INVALID (ERROR)
//! - CATALOG_UNKNOWN_CATALOG (ERROR)
//! - CATALOG_UNKNOWN_INDEX (ERROR)
//! - CATALOG_SCAN_FAILED (FATAL)

use std::fmt;

use crate::codec::CodecError;
use crate::model::Iid;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The failing operation is aborted; the index stays consistent
    Error,
    /// The object store could not be read; a rebuild cannot proceed
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Converting an object's value to its indexed form failed
    IndexingFailed,
    /// A search term or operator does not fit the index value domain
    QueryInvalid,
    /// No catalog for this class
    UnknownCatalog,
    /// No index with this name in the catalog
    UnknownIndex,
    /// The object store could not be scanned
    ScanFailed,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::IndexingFailed => "CATALOG_INDEXING_FAILED",
            IndexErrorCode::QueryInvalid => "CATALOG_QUERY_INVALID",
            IndexErrorCode::UnknownCatalog => "CATALOG_UNKNOWN_CATALOG",
            IndexErrorCode::UnknownIndex => "CATALOG_UNKNOWN_INDEX",
            IndexErrorCode::ScanFailed => "CATALOG_SCAN_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            IndexErrorCode::ScanFailed => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug)]
pub struct IndexError {
    /// Error code
    code: IndexErrorCode,
    /// Human-readable message
    message: String,
    /// Object the error relates to, if any
    iid: Option<Iid>,
    /// Index the error relates to, if any
    index: Option<String>,
    /// Underlying conversion error
    source: Option<CodecError>,
}

impl IndexError {
    /// Create an indexing failure for object `iid` on index `catalog::index`
    pub fn indexing_failed(catalog: &str, index: &str, iid: Iid, source: CodecError) -> Self {
        Self {
            code: IndexErrorCode::IndexingFailed,
            message: format!("Error while indexing {}::{} for object {}.", catalog, index, iid),
            iid: Some(iid),
            index: Some(index.to_string()),
            source: Some(source),
        }
    }

    /// Create a query failure.
    ///
    /// `term` is either "operator" or "index value".
    pub fn query_invalid(
        catalog: &str,
        index: &str,
        term: &str,
        value: &str,
        source: CodecError,
    ) -> Self {
        Self {
            code: IndexErrorCode::QueryInvalid,
            message: format!(
                "Index \"{}\" in catalog \"{}\": wrong {} \"{}\".",
                index, catalog, term, value
            ),
            iid: None,
            index: Some(index.to_string()),
            source: Some(source),
        }
    }

    /// Create an unknown catalog error
    pub fn unknown_catalog(catalog: &str) -> Self {
        Self {
            code: IndexErrorCode::UnknownCatalog,
            message: format!("No catalog for class \"{}\".", catalog),
            iid: None,
            index: None,
            source: None,
        }
    }

    /// Create an unknown index error
    pub fn unknown_index(catalog: &str, index: &str) -> Self {
        Self {
            code: IndexErrorCode::UnknownIndex,
            message: format!("No index \"{}\" in catalog \"{}\".", index, catalog),
            iid: None,
            index: Some(index.to_string()),
            source: None,
        }
    }

    /// Create a scan failure at `position` in the object store
    pub fn scan_failed(position: u64, reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::ScanFailed,
            message: format!("Object scan failed at position {}: {}", position, reason.into()),
            iid: None,
            index: None,
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the object identifier if applicable
    pub fn iid(&self) -> Option<Iid> {
        self.iid
    }

    /// Returns the name of the index involved, if any
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
