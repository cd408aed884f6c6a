//! Index value codecs
//!
//! A codec converts a field's raw value into the form stored in an index, a
//! query value into a lookup key, and a stored value back into a field value.
//! There is one codec per kind of index; the codec is chosen once, when the
//! index is built, and stored with it.
//!
//! # Conversions
//!
//! - `to_indexed` - raw object value -> stored value (None = nothing to index)
//! - `to_term` - query value -> forward-map key
//! - `from_indexed` - stored value -> field value
//! - `display` - raw value -> text for administrative screens
//!
//! `to_term` accepts values already in internal form, strings, and natural
//! typed values, and only fails on input it cannot interpret.

mod date;
mod errors;
mod normalize;
mod reference;
mod rich;
mod scalar;
mod text;

use serde::{Deserialize, Serialize};

pub use errors::{CodecError, CodecResult};
pub use normalize::Normalize;

use crate::index::{IndexKey, IndexValue};
use crate::model::FieldValue;

/// Attribute indexed by default for Ref fields: the referenced object's iid
pub const DEFAULT_INDEX_ATTRIBUTE: &str = "iid";

/// Kind of index, each one with its own value conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// Booleans; null indexes as false
    Boolean,
    /// Date-times, stored as an integer count of minutes
    Date,
    /// References to other objects
    #[serde(alias = "reference")]
    Ref,
    /// Floats rounded to the field precision
    Float,
    /// Normalized strings, for sorting
    Sortable,
    /// Words extracted from text
    Text,
    /// Words extracted from XHTML chunks
    Rich,
    /// Scalars indexed as-is
    #[default]
    #[serde(alias = "string")]
    Default,
}

impl Codec {
    /// Returns the codec name, as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::Boolean => "boolean",
            Codec::Date => "date",
            Codec::Ref => "ref",
            Codec::Float => "float",
            Codec::Sortable => "sortable",
            Codec::Text => "text",
            Codec::Rich => "rich",
            Codec::Default => "default",
        }
    }

    /// Precision used when the field defines none
    pub fn default_precision(&self) -> u32 {
        match self {
            Codec::Date => 1,
            Codec::Float => 2,
            _ => 0,
        }
    }

    /// Converts a raw object value to its stored form.
    ///
    /// Returns None when there is nothing to index.
    pub fn to_indexed(&self, raw: &FieldValue, field: &FieldSpec) -> CodecResult<Option<IndexValue>> {
        match self {
            Codec::Boolean => Ok(Some(scalar::boolean_to_indexed(raw))),
            Codec::Date => date::to_indexed(raw, field.precision()),
            Codec::Ref => reference::to_indexed(raw, &field.index_attribute),
            Codec::Float => scalar::float_to_indexed(raw, field.precision()),
            Codec::Sortable => text::sortable_to_indexed(raw),
            Codec::Text => text::words_to_indexed(raw),
            Codec::Rich => rich::to_indexed(raw),
            Codec::Default => scalar::default_to_indexed(raw),
        }
    }

    /// Converts a query value into a key usable for a forward-map lookup
    pub fn to_term(&self, value: &FieldValue, field: &FieldSpec) -> CodecResult<IndexKey> {
        match self {
            Codec::Boolean => scalar::boolean_to_term(value),
            Codec::Date => date::to_term(value, field.precision()),
            Codec::Ref => reference::to_term(value, &field.index_attribute),
            Codec::Float => scalar::float_to_term(value, field.precision()),
            Codec::Sortable => text::to_term(value, false),
            Codec::Text | Codec::Rich => text::to_term(value, true),
            Codec::Default => scalar::default_to_term(value),
        }
    }

    /// Converts a stored value back to a field value.
    ///
    /// Multi values convert element-wise into a list.
    pub fn from_indexed(&self, value: &IndexValue) -> CodecResult<FieldValue> {
        match value {
            IndexValue::Single(key) => self.key_to_value(key),
            IndexValue::Multi(keys) => keys
                .iter()
                .map(|key| self.key_to_value(key))
                .collect::<CodecResult<Vec<_>>>()
                .map(FieldValue::List),
        }
    }

    fn key_to_value(&self, key: &IndexKey) -> CodecResult<FieldValue> {
        match self {
            Codec::Date => date::from_key(key),
            Codec::Float => match key {
                IndexKey::Float(_) => Ok(FieldValue::Float(key.as_float().unwrap_or(f64::NAN))),
                IndexKey::Int(i) => Ok(FieldValue::Float(*i as f64)),
                other => Err(CodecError::value_kind("float", other.to_string())),
            },
            _ => Ok(scalar::key_to_value(key)),
        }
    }

    /// Human-readable rendering of a raw value, None for empty values
    pub fn display(&self, raw: &FieldValue, field: &FieldSpec) -> Option<String> {
        if raw.is_empty() {
            return None;
        }
        match self {
            Codec::Date => date::display(raw),
            Codec::Ref => Some(reference::display(raw)),
            Codec::Float => scalar::float_display(raw, field.precision()),
            Codec::Rich => Some(rich::display(raw)),
            _ => Some(raw.to_string()),
        }
    }

    /// Key standing for "no value" when sorting.
    ///
    /// It is the smallest value of the codec's domain, so objects without a
    /// value come first in ascending order.
    pub fn empty_key(&self) -> IndexKey {
        match self {
            // Default keys may be of any kind; Bool is the lowest
            Codec::Boolean | Codec::Default => IndexKey::Bool(false),
            Codec::Date | Codec::Ref => IndexKey::Int(i64::MIN),
            // Non-finite floats are never indexed
            Codec::Float => IndexKey::from_float(f64::NEG_INFINITY),
            Codec::Sortable | Codec::Text | Codec::Rich => IndexKey::from_string(""),
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Description of an indexed field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name (= index name)
    pub name: String,
    /// Conversions applied to the field's values
    pub codec: Codec,
    /// Date: granularity in minutes. Float: number of decimals.
    pub precision: Option<u32>,
    /// Ref fields: attribute of referenced objects used as index value
    pub index_attribute: String,
    /// Value indexed in place of an empty one, if any
    pub empty_index_value: Option<FieldValue>,
}

impl FieldSpec {
    /// Creates a field spec with default settings
    pub fn new(name: impl Into<String>, codec: Codec) -> Self {
        Self {
            name: name.into(),
            codec,
            precision: None,
            index_attribute: DEFAULT_INDEX_ATTRIBUTE.to_string(),
            empty_index_value: None,
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_index_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.index_attribute = attribute.into();
        self
    }

    pub fn with_empty_index_value(mut self, value: FieldValue) -> Self {
        self.empty_index_value = Some(value);
        self
    }

    /// Effective precision
    pub fn precision(&self) -> u32 {
        self.precision.unwrap_or_else(|| self.codec.default_precision())
    }
}

/// Converts every item of a list into a key and builds a multi value
fn multi<F>(items: &[FieldValue], convert: F) -> CodecResult<Option<IndexValue>>
where
    F: Fn(&FieldValue) -> CodecResult<IndexKey>,
{
    let keys = items.iter().map(convert).collect::<CodecResult<Vec<_>>>()?;
    Ok(IndexValue::from_keys(keys))
}
