//! Stored objects and object-layer scans
//!
//! `ObjectScan` is the populate collaborator used when an index is
//! recomputed: it walks every stored object, deleted ones included, and the
//! catalog decides what to index.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use super::value::FieldValue;
use super::Iid;
use crate::index::{IndexError, IndexResult};

static NULL_VALUE: FieldValue = FieldValue::Null;

/// An object as seen by the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    /// Object identifier
    pub iid: Iid,
    /// Name of the object's class (= the catalog it belongs to)
    pub class_name: String,
    /// Deleted objects are skipped when populating indexes
    pub deleted: bool,
    /// Raw field values
    pub fields: HashMap<String, FieldValue>,
}

impl StoredObject {
    /// Creates a live object without field values
    pub fn new(iid: Iid, class_name: impl Into<String>) -> Self {
        Self {
            iid,
            class_name: class_name.into(),
            deleted: false,
            fields: HashMap::new(),
        }
    }

    /// Sets a field value
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Marks the object as deleted
    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    /// Raw value of `field`; a missing field reads as null
    pub fn value(&self, field: &str) -> &FieldValue {
        self.fields.get(field).unwrap_or(&NULL_VALUE)
    }
}

/// Trait for scanning the object store during index population
pub trait ObjectScan {
    /// Read the next stored object.
    /// Returns None at the end of the store.
    fn scan_next(&mut self) -> IndexResult<Option<StoredObject>>;

    /// Reset to the beginning of the store
    fn reset(&mut self) -> IndexResult<()>;

    /// Current position, for error reporting
    fn position(&self) -> u64;
}

/// Scan over objects held in memory
#[derive(Debug, Default)]
pub struct MemoryScan {
    objects: Vec<StoredObject>,
    position: usize,
}

impl MemoryScan {
    pub fn new(objects: Vec<StoredObject>) -> Self {
        Self {
            objects,
            position: 0,
        }
    }

    /// Mutable access to the underlying objects, e.g. to simulate updates
    pub fn objects_mut(&mut self) -> &mut Vec<StoredObject> {
        &mut self.objects
    }
}

impl ObjectScan for MemoryScan {
    fn scan_next(&mut self) -> IndexResult<Option<StoredObject>> {
        let object = self.objects.get(self.position).cloned();
        if object.is_some() {
            self.position += 1;
        }
        Ok(object)
    }

    fn reset(&mut self) -> IndexResult<()> {
        self.position = 0;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position as u64
    }
}

/// One line of an object dump
#[derive(Debug, Deserialize)]
struct ObjectRecord {
    iid: Iid,
    class: String,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

impl From<ObjectRecord> for StoredObject {
    fn from(record: ObjectRecord) -> Self {
        StoredObject {
            iid: record.iid,
            class_name: record.class,
            deleted: record.deleted,
            fields: record
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), FieldValue::from_json(value)))
                .collect(),
        }
    }
}

/// Scan over a JSON-lines object dump.
///
/// Each non-blank line holds one object:
/// `{"iid": 1, "class": "Person", "deleted": false, "fields": {...}}`
pub struct JsonLinesScan {
    path: PathBuf,
    reader: BufReader<File>,
    line: u64,
}

impl JsonLinesScan {
    /// Opens the dump at `path`
    pub fn open(path: impl AsRef<Path>) -> IndexResult<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = Self::open_reader(&path)?;
        Ok(Self {
            path,
            reader,
            line: 0,
        })
    }

    fn open_reader(path: &Path) -> IndexResult<BufReader<File>> {
        let file = File::open(path).map_err(|e| {
            IndexError::scan_failed(0, format!("cannot open {}: {}", path.display(), e))
        })?;
        Ok(BufReader::new(file))
    }
}

impl ObjectScan for JsonLinesScan {
    fn scan_next(&mut self) -> IndexResult<Option<StoredObject>> {
        let mut buffer = String::new();
        loop {
            buffer.clear();
            let read = self
                .reader
                .read_line(&mut buffer)
                .map_err(|e| IndexError::scan_failed(self.line, e.to_string()))?;
            if read == 0 {
                return Ok(None);
            }
            self.line += 1;
            if buffer.trim().is_empty() {
                continue;
            }
            let record: ObjectRecord = serde_json::from_str(&buffer)
                .map_err(|e| IndexError::scan_failed(self.line, format!("invalid object: {}", e)))?;
            return Ok(Some(record.into()));
        }
    }

    fn reset(&mut self) -> IndexResult<()> {
        self.reader = Self::open_reader(&self.path)?;
        self.line = 0;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.line
    }
}
