//! # Codec Errors
//!
//! Errors raised while converting values to or from their indexed form.

use thiserror::Error;

use crate::model::Iid;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Value conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The value does not belong to the field's value domain
    #[error("expected {expected}, got {found}")]
    ValueKind { expected: &'static str, found: String },

    /// A string could not be parsed into the field's natural type
    #[error("cannot parse \"{value}\" as {expected}")]
    Unparseable { expected: &'static str, value: String },

    /// A referenced object lacks the attribute used as index value
    #[error("object {iid} has no attribute \"{attribute}\"")]
    MissingAttribute { iid: Iid, attribute: String },

    /// The value cannot be represented
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

impl CodecError {
    /// Wrong value kind for this codec
    pub fn value_kind(expected: &'static str, found: impl Into<String>) -> Self {
        CodecError::ValueKind {
            expected,
            found: found.into(),
        }
    }

    /// Unparseable string
    pub fn unparseable(expected: &'static str, value: impl Into<String>) -> Self {
        CodecError::Unparseable {
            expected,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CodecError::value_kind("date", "bool").to_string(),
            "expected date, got bool"
        );
        assert_eq!(
            CodecError::unparseable("date", "yesterday").to_string(),
            "cannot parse \"yesterday\" as date"
        );
    }
}
