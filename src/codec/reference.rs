//! Ref codec
//!
//! Referenced objects are indexed by iid, or by the alternate attribute named
//! by the field. Multiple references become a multi value.

use super::errors::{CodecError, CodecResult};
use super::{multi, DEFAULT_INDEX_ATTRIBUTE};
use crate::index::{IndexKey, IndexValue};
use crate::model::{FieldValue, Iid, ObjectRef};

fn iid_key(iid: Iid) -> CodecResult<IndexKey> {
    i64::try_from(iid)
        .map(IndexKey::Int)
        .map_err(|_| CodecError::OutOfRange(format!("iid {}", iid)))
}

/// Indexable value of a referenced object
fn object_key(object: &ObjectRef, attribute: &str) -> CodecResult<IndexKey> {
    if attribute == DEFAULT_INDEX_ATTRIBUTE {
        return iid_key(object.iid);
    }
    object
        .attribute(attribute)
        .map(IndexKey::from_string)
        .ok_or_else(|| CodecError::MissingAttribute {
            iid: object.iid,
            attribute: attribute.to_string(),
        })
}

fn key(value: &FieldValue, attribute: &str) -> CodecResult<IndexKey> {
    match value {
        // Already an iid or an alternate attribute value, e.g. a default
        // value to index when the field is empty
        FieldValue::Int(i) => Ok(IndexKey::Int(*i)),
        FieldValue::Str(s) => Ok(IndexKey::from_string(s.as_str())),
        FieldValue::Ref(object) => object_key(object, attribute),
        other => Err(CodecError::value_kind("ref", other.kind())),
    }
}

pub fn to_indexed(raw: &FieldValue, attribute: &str) -> CodecResult<Option<IndexValue>> {
    match raw {
        FieldValue::Null => Ok(None),
        FieldValue::List(items) => multi(items, |item| key(item, attribute)),
        value => key(value, attribute).map(|k| Some(IndexValue::Single(k))),
    }
}

pub fn to_term(value: &FieldValue, attribute: &str) -> CodecResult<IndexKey> {
    match value {
        // A string may be an iid in disguise
        FieldValue::Str(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => s
            .parse::<i64>()
            .map(IndexKey::Int)
            .map_err(|_| CodecError::unparseable("iid", s.as_str())),
        value => key(value, attribute),
    }
}

/// Titles of the referenced objects, separated by blanks
pub fn display(raw: &FieldValue) -> String {
    match raw {
        FieldValue::Ref(object) => object.shown_value(),
        FieldValue::List(items) => items
            .iter()
            .map(display)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_indexed_by_iid() {
        let value = to_indexed(&FieldValue::reference(12), "iid").unwrap();
        assert_eq!(value, Some(IndexValue::Single(IndexKey::Int(12))));
    }

    #[test]
    fn test_reference_indexed_by_attribute() {
        let object = ObjectRef::new(12).with_attribute("code", "BE");
        let value = to_indexed(&FieldValue::Ref(object), "code").unwrap();
        assert_eq!(value, Some(IndexValue::Single(IndexKey::from_string("BE"))));
    }

    #[test]
    fn test_missing_attribute_fails() {
        let err = to_indexed(&FieldValue::reference(12), "code").unwrap_err();
        assert_eq!(
            err,
            CodecError::MissingAttribute {
                iid: 12,
                attribute: "code".to_string()
            }
        );
    }

    #[test]
    fn test_list_keeps_order() {
        let value = to_indexed(
            &FieldValue::List(vec![FieldValue::reference(5), FieldValue::reference(2)]),
            "iid",
        )
        .unwrap()
        .unwrap();
        assert_eq!(value.keys(), &[IndexKey::Int(5), IndexKey::Int(2)]);
    }

    #[test]
    fn test_empty_list_is_empty() {
        assert_eq!(to_indexed(&FieldValue::List(vec![]), "iid").unwrap(), None);
    }

    #[test]
    fn test_terms() {
        assert_eq!(to_term(&FieldValue::Int(4), "iid").unwrap(), IndexKey::Int(4));
        assert_eq!(to_term(&FieldValue::str("4"), "iid").unwrap(), IndexKey::Int(4));
        assert_eq!(
            to_term(&FieldValue::str("BE"), "code").unwrap(),
            IndexKey::from_string("BE")
        );
        assert_eq!(to_term(&FieldValue::reference(9), "iid").unwrap(), IndexKey::Int(9));
        assert!(to_term(&FieldValue::Float(1.5), "iid").is_err());
    }

    #[test]
    fn test_display_titles() {
        let raw = FieldValue::List(vec![
            FieldValue::Ref(ObjectRef::new(1).with_title("Alice")),
            FieldValue::reference(2),
        ]);
        assert_eq!(display(&raw), "Alice 2");
    }
}
