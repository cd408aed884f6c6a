//! Index keys and stored index values
//!
//! An `IndexKey` is one scalar in its internal, comparable form. An
//! `IndexValue` is what the reverse map stores for an object: one key, or an
//! immutable sequence of keys for multi-valued fields.

use std::fmt;

/// Index key representing a converted field value.
///
/// Ordering is deterministic: Bool < Int < Float < String.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    /// Boolean value (false < true)
    Bool(bool),
    /// Integer value (also dates and object identifiers)
    Int(i64),
    /// Float value (stored as bits for total ordering)
    Float(u64),
    /// String value
    String(String),
}

impl IndexKey {
    /// Create a key from a float
    ///
    /// Uses bit representation for total ordering. Both zeros map to the
    /// same key.
    pub fn from_float(v: f64) -> Self {
        let v = if v == 0.0 { 0.0 } else { v };
        let bits = v.to_bits();
        // Negative: flip all bits. Positive: flip sign bit.
        let ordered = if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        IndexKey::Float(ordered)
    }

    /// Create a key from a string
    pub fn from_string(v: impl Into<String>) -> Self {
        IndexKey::String(v.into())
    }

    /// Decodes a float key
    pub fn as_float(&self) -> Option<f64> {
        match self {
            IndexKey::Float(ordered) => {
                let bits = if (ordered >> 63) == 1 {
                    ordered ^ (1 << 63)
                } else {
                    !ordered
                };
                Some(f64::from_bits(bits))
            }
            _ => None,
        }
    }

    /// Returns the integer payload
    pub fn as_int(&self) -> Option<i64> {
        match self {
            IndexKey::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            IndexKey::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Bool(b) => write!(f, "{}", b),
            IndexKey::Int(i) => write!(f, "{}", i),
            IndexKey::Float(_) => write!(f, "{}", self.as_float().unwrap_or(f64::NAN)),
            IndexKey::String(s) => write!(f, "{}", s),
        }
    }
}

/// Value stored for one object in the reverse map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexValue {
    /// A single key
    Single(IndexKey),
    /// Several keys, each one having its own forward entry
    Multi(Box<[IndexKey]>),
}

impl IndexValue {
    /// Builds a multi value from converted keys.
    ///
    /// Returns None for an empty sequence: nothing to index.
    pub fn from_keys(keys: Vec<IndexKey>) -> Option<Self> {
        if keys.is_empty() {
            None
        } else {
            Some(IndexValue::Multi(keys.into_boxed_slice()))
        }
    }

    /// All keys of this value
    pub fn keys(&self) -> &[IndexKey] {
        match self {
            IndexValue::Single(key) => std::slice::from_ref(key),
            IndexValue::Multi(keys) => keys,
        }
    }

    /// True for multi values
    pub fn is_multi(&self) -> bool {
        matches!(self, IndexValue::Multi(_))
    }

    /// Returns true if `key` is one of this value's keys
    pub fn contains(&self, key: &IndexKey) -> bool {
        self.keys().contains(key)
    }

    /// Smallest key, used when sorting on a multi-valued index
    pub fn smallest(&self) -> &IndexKey {
        match self {
            IndexValue::Single(key) => key,
            // Multi values are never empty (see from_keys)
            IndexValue::Multi(keys) => keys.iter().min().unwrap_or(&keys[0]),
        }
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Single(key) => write!(f, "{}", key),
            IndexValue::Multi(keys) => {
                write!(f, "(")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", key)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ordering() {
        let keys = vec![
            IndexKey::Bool(false),
            IndexKey::Bool(true),
            IndexKey::Int(-100),
            IndexKey::Int(0),
            IndexKey::Int(100),
            IndexKey::from_float(-2.5),
            IndexKey::from_float(0.0),
            IndexKey::from_float(3.25),
            IndexKey::from_string(""),
            IndexKey::from_string("aaa"),
            IndexKey::from_string("zzz"),
        ];

        for i in 1..keys.len() {
            assert!(keys[i - 1] < keys[i], "Keys should be ordered");
        }
    }

    #[test]
    fn test_float_decoding() {
        for v in [-1e9, -2.5, -0.0, 0.0, 1.0, 3.25, 1e12] {
            assert_eq!(IndexKey::from_float(v).as_float(), Some(v));
        }
        assert_eq!(IndexKey::Int(1).as_float(), None);
    }

    #[test]
    fn test_signed_zeros_share_a_key() {
        assert_eq!(IndexKey::from_float(-0.0), IndexKey::from_float(0.0));
        assert!(IndexKey::from_float(-1e-300) < IndexKey::from_float(-0.0));
    }

    #[test]
    fn test_empty_multi_value_is_none() {
        assert!(IndexValue::from_keys(vec![]).is_none());
    }

    #[test]
    fn test_multi_value_keys() {
        let value = IndexValue::from_keys(vec![IndexKey::Int(3), IndexKey::Int(1)]).unwrap();
        assert!(value.is_multi());
        assert_eq!(value.keys().len(), 2);
        assert!(value.contains(&IndexKey::Int(1)));
        assert_eq!(value.smallest(), &IndexKey::Int(1));
    }

    #[test]
    fn test_single_and_multi_never_equal() {
        let single = IndexValue::Single(IndexKey::Int(1));
        let multi = IndexValue::from_keys(vec![IndexKey::Int(1)]).unwrap();
        assert_ne!(single, multi);
    }
}
