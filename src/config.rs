//! Catalog configuration
//!
//! Which classes have a catalog, which of their fields are indexed, and
//! how. Loaded from a JSON file:
//!
//! ```json
//! { "log_level": "info",
//!   "classes": [ { "name": "Person", "indexes": [
//!       { "field": "birth", "type": "date", "precision": 1 },
//!       { "field": "title", "type": "sortable" },
//!       { "field": "code", "type": "default", "empty_index_value": "-" } ] } ] }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{Codec, FieldSpec, DEFAULT_INDEX_ATTRIBUTE};
use crate::model::FieldValue;
use crate::observability::{log_event_with_fields, Event, Severity};

/// Floats cannot carry more decimals than this
const MAX_FLOAT_PRECISION: u32 = 15;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Whole catalog configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// One entry per class having a catalog
    pub classes: Vec<ClassConfig>,

    /// Minimum severity of log lines (default "info")
    #[serde(default)]
    pub log_level: Severity,
}

/// Indexed fields of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassConfig {
    pub name: String,

    #[serde(default)]
    pub indexes: Vec<IndexConfig>,
}

/// One indexed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub field: String,

    /// Index type (default "default")
    #[serde(rename = "type", default)]
    pub codec: Codec,

    /// Dates: minutes; floats: decimals. Codec default when absent.
    #[serde(default)]
    pub precision: Option<u32>,

    /// Ref fields: attribute of referenced objects to index
    #[serde(default = "default_index_attribute")]
    pub index_attribute: String,

    /// Value indexed when the field is empty
    #[serde(default)]
    pub empty_index_value: Option<serde_json::Value>,
}

fn default_index_attribute() -> String {
    DEFAULT_INDEX_ATTRIBUTE.to_string()
}

impl IndexConfig {
    /// Field description used to build the index
    pub fn to_field_spec(&self) -> FieldSpec {
        let mut field = FieldSpec::new(self.field.as_str(), self.codec)
            .with_index_attribute(self.index_attribute.as_str());
        if let Some(precision) = self.precision {
            field = field.with_precision(precision);
        }
        if let Some(value) = &self.empty_index_value {
            field = field.with_empty_index_value(FieldValue::from_json(value));
        }
        field
    }

    fn validate(&self, class: &str) -> ConfigResult<()> {
        let invalid = |msg: String| Err(ConfigError::Invalid(format!("{}.{}: {}", class, self.field, msg)));
        match (self.codec, self.precision) {
            (Codec::Date, Some(0)) => return invalid("date precision must be >= 1".to_string()),
            (Codec::Float, Some(p)) if p > MAX_FLOAT_PRECISION => {
                return invalid(format!("float precision must be <= {}", MAX_FLOAT_PRECISION))
            }
            _ => {}
        }
        if self.codec == Codec::Ref && self.index_attribute.trim().is_empty() {
            return invalid("index_attribute must not be empty".to_string());
        }
        if matches!(&self.empty_index_value, Some(v) if v.is_null()) {
            return invalid("empty_index_value must not be null".to_string());
        }
        Ok(())
    }
}

impl CatalogConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("path", path.display().to_string().as_str()),
                ("classes", config.classes.len().to_string().as_str()),
            ],
        );
        Ok(config)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: CatalogConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate names and index settings
    pub fn validate(&self) -> ConfigResult<()> {
        let mut classes = HashSet::new();
        for class in &self.classes {
            if class.name.trim().is_empty() {
                return Err(ConfigError::Invalid("class name must not be empty".to_string()));
            }
            if !classes.insert(class.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate class '{}'", class.name)));
            }

            let mut fields = HashSet::new();
            for index in &class.indexes {
                if index.field.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "{}: indexed field name must not be empty",
                        class.name
                    )));
                }
                if !fields.insert(index.field.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "{}: field '{}' indexed twice",
                        class.name, index.field
                    )));
                }
                index.validate(&class.name)?;
            }
        }
        Ok(())
    }

    /// Configuration of class `name`
    pub fn class(&self, name: &str) -> Option<&ClassConfig> {
        self.classes.iter().find(|c| c.name == name)
    }
}
