//! Sortable and Text codecs
//!
//! Sortable fields index one normalized string, truncated to
//! `SORTABLE_MAX_CHARS`. Text fields index the set of normalized words found
//! in the value.

use std::collections::BTreeSet;

use super::errors::{CodecError, CodecResult};
use super::normalize::Normalize;
use crate::index::{IndexKey, IndexValue};
use crate::model::FieldValue;

/// Only the beginning of a string matters for sorting
pub const SORTABLE_MAX_CHARS: usize = 100;

/// Words shorter than this are dropped, unless made of digits
const MIN_WORD_CHARS: usize = 3;

fn as_text(value: &FieldValue, expected: &'static str) -> CodecResult<String> {
    match value {
        FieldValue::Str(s) => Ok(s.clone()),
        FieldValue::Int(_) | FieldValue::Float(_) => Ok(value.to_string()),
        other => Err(CodecError::value_kind(expected, other.kind())),
    }
}

fn sortable(s: &str) -> String {
    let head: String = s.chars().take(SORTABLE_MAX_CHARS).collect();
    Normalize::text(&head, true, false, false)
}

fn keep_word(word: &str) -> bool {
    word.chars().count() >= MIN_WORD_CHARS || word.chars().all(|c| c.is_ascii_digit())
}

/// Distinct words of `s`, in alphabetical order
fn words(s: &str) -> BTreeSet<String> {
    Normalize::text(s, true, false, true)
        .split_whitespace()
        .filter(|w| keep_word(w))
        .map(str::to_string)
        .collect()
}

pub fn sortable_to_indexed(raw: &FieldValue) -> CodecResult<Option<IndexValue>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let value = sortable(&as_text(raw, "string")?);
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(IndexValue::Single(IndexKey::from_string(value))))
}

pub fn words_to_indexed(raw: &FieldValue) -> CodecResult<Option<IndexValue>> {
    let mut found = BTreeSet::new();
    match raw {
        FieldValue::Null => return Ok(None),
        FieldValue::List(items) => {
            for item in items {
                found.extend(words(&as_text(item, "text")?));
            }
        }
        value => found = words(&as_text(value, "text")?),
    }
    Ok(IndexValue::from_keys(
        found.into_iter().map(IndexKey::from_string).collect(),
    ))
}

/// Lookup key for a search term.
///
/// A Text term is normalized keeping its blanks; a Sortable term as a sort
/// value.
pub fn to_term(value: &FieldValue, words: bool) -> CodecResult<IndexKey> {
    let text = as_text(value, if words { "text" } else { "string" })?;
    let term = if words {
        Normalize::text(&text, true, false, true)
    } else {
        sortable(&text)
    };
    Ok(IndexKey::from_string(term))
}
