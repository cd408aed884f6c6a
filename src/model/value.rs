//! Raw field values as read from persisted objects

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde_json::Value;

use super::Iid;

/// A reference to another persisted object.
///
/// Ref fields store these. The catalog indexes either the referenced object's
/// iid or one of its attributes (see `FieldSpec::index_attribute`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Referenced object identifier
    pub iid: Iid,
    /// Shown value, used for display only
    pub title: Option<String>,
    /// Alternate attributes usable as index values
    pub attributes: BTreeMap<String, String>,
}

impl ObjectRef {
    /// Creates a reference to object `iid`
    pub fn new(iid: Iid) -> Self {
        Self {
            iid,
            title: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Sets the shown title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds an alternate attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Returns the alternate attribute named `name`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns the title, falling back to the iid
    pub fn shown_value(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => self.iid.to_string(),
        }
    }
}

/// Raw value of a field on a persisted object.
///
/// Dates are naive date-times expressed in UTC.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDateTime),
    Ref(ObjectRef),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Builds a string value
    pub fn str(s: impl Into<String>) -> Self {
        FieldValue::Str(s.into())
    }

    /// Builds a reference value
    pub fn reference(iid: Iid) -> Self {
        FieldValue::Ref(ObjectRef::new(iid))
    }

    /// Returns true for values never stored in an index: null and empty lists.
    ///
    /// Empty strings are NOT empty in this sense; codecs decide about them.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Truthiness, as used by Boolean indexes
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Int(i) => *i != 0,
            FieldValue::Float(f) => *f != 0.0,
            FieldValue::Str(s) => !s.is_empty(),
            FieldValue::List(items) => !items.is_empty(),
            FieldValue::Date(_) | FieldValue::Ref(_) => true,
        }
    }

    /// Short name of the value kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Str(_) => "string",
            FieldValue::Date(_) => "date",
            FieldValue::Ref(_) => "ref",
            FieldValue::List(_) => "list",
        }
    }

    /// Converts a JSON value as found in an object dump.
    ///
    /// JSON objects carrying a numeric `iid` become references; their `title`
    /// and other scalar members become the reference's title and attributes.
    /// Strings stay strings: date codecs parse them when needed.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::Str(s.clone()),
            Value::Array(items) => FieldValue::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => {
                let Some(iid) = map.get("iid").and_then(Value::as_u64) else {
                    return FieldValue::Str(value.to_string());
                };
                let mut reference = ObjectRef::new(iid);
                for (name, member) in map {
                    match (name.as_str(), member) {
                        ("iid", _) => {}
                        ("title", Value::String(title)) => reference.title = Some(title.clone()),
                        (_, Value::String(s)) => {
                            reference.attributes.insert(name.clone(), s.clone());
                        }
                        (_, Value::Number(n)) => {
                            reference.attributes.insert(name.clone(), n.to_string());
                        }
                        _ => {}
                    }
                }
                FieldValue::Ref(reference)
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Str(s) => write!(f, "{}", s),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M")),
            FieldValue::Ref(r) => write!(f, "@{}", r.iid),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(d: NaiveDateTime) -> Self {
        FieldValue::Date(d)
    }
}
