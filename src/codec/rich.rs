//! Rich codec
//!
//! Rich fields hold XHTML chunks. The text found between tags is extracted
//! and then indexed word by word, like a Text field. A chunk may have
//! several top-level elements, so it is wrapped in a root element before
//! parsing.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::errors::{CodecError, CodecResult};
use super::normalize::Normalize;
use super::text;
use crate::index::IndexValue;
use crate::model::FieldValue;

/// Named entities found in XHTML chunks besides the XML ones
fn html_entity(name: &str) -> Option<&'static str> {
    match name {
        "nbsp" | "ensp" | "emsp" | "thinsp" => Some(" "),
        "laquo" => Some("«"),
        "raquo" => Some("»"),
        "hellip" => Some("…"),
        "ndash" => Some("–"),
        "mdash" => Some("—"),
        "rsquo" | "lsquo" => Some("'"),
        "rdquo" | "ldquo" => Some("\""),
        "euro" => Some("€"),
        "copy" => Some("©"),
        _ => None,
    }
}

/// Text nodes of `chunk` in document order, joined by blanks.
///
/// With `normalized`, every node is normalized for search and nodes of at
/// most one char are dropped.
fn extract(chunk: &str, normalized: bool) -> CodecResult<String> {
    let wrapped = format!("<x>{}</x>", chunk);
    let mut reader = Reader::from_str(&wrapped);
    let mut parts = Vec::new();

    loop {
        let content = match reader.read_event() {
            Ok(Event::Text(e)) => e
                .unescape_with(html_entity)
                .map_err(|_| CodecError::unparseable("xhtml", chunk))?
                .into_owned(),
            Ok(Event::CData(e)) => String::from_utf8_lossy(&e.into_inner()).into_owned(),
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(_) => return Err(CodecError::unparseable("xhtml", chunk)),
        };
        let part = if normalized {
            Normalize::text(&content, true, false, true)
        } else {
            content.replace('\n', " ")
        };
        let part = part.trim();
        if part.chars().count() > usize::from(normalized) {
            parts.push(part.to_string());
        }
    }
    Ok(parts.join(" "))
}

fn as_chunk(raw: &FieldValue) -> CodecResult<&str> {
    match raw {
        FieldValue::Str(s) => Ok(s.as_str()),
        other => Err(CodecError::value_kind("xhtml", other.kind())),
    }
}

pub fn to_indexed(raw: &FieldValue) -> CodecResult<Option<IndexValue>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let words = extract(as_chunk(raw)?, true)?;
    text::words_to_indexed(&FieldValue::Str(words))
}

/// Plain text of a chunk; malformed chunks are shown as they are
pub fn display(raw: &FieldValue) -> String {
    match raw {
        FieldValue::Str(s) => extract(s, false).unwrap_or_else(|_| s.clone()),
        other => other.to_string(),
    }
}
