//! Boolean, Float and Default codecs

use super::errors::{CodecError, CodecResult};
use super::multi;
use crate::index::{IndexKey, IndexValue};
use crate::model::FieldValue;

// ---------------------------------------------------------------------------
// Boolean
// ---------------------------------------------------------------------------

/// Boolean indexes always hold a value: null indexes as false
pub fn boolean_to_indexed(raw: &FieldValue) -> IndexValue {
    IndexValue::Single(IndexKey::Bool(raw.is_truthy()))
}

pub fn boolean_to_term(value: &FieldValue) -> CodecResult<IndexKey> {
    let b = match value {
        FieldValue::Null => false,
        FieldValue::Bool(b) => *b,
        FieldValue::Int(i) => *i != 0,
        FieldValue::Float(f) => *f != 0.0,
        FieldValue::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => true,
            "false" | "no" | "off" | "0" | "" => false,
            _ => return Err(CodecError::unparseable("boolean", s.as_str())),
        },
        other => return Err(CodecError::value_kind("boolean", other.kind())),
    };
    Ok(IndexKey::Bool(b))
}

// ---------------------------------------------------------------------------
// Float
// ---------------------------------------------------------------------------

/// Rounds to `precision` decimals; values too large to scale are already
/// integral and are returned as they are
fn round(v: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(15) as i32);
    let scaled = v * factor;
    if !scaled.is_finite() {
        return v;
    }
    scaled.round() / factor
}

fn float_key(value: &FieldValue, precision: u32) -> CodecResult<IndexKey> {
    let v = match value {
        FieldValue::Int(i) => *i as f64,
        FieldValue::Float(f) => *f,
        FieldValue::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CodecError::unparseable("float", s.as_str()))?,
        other => return Err(CodecError::value_kind("float", other.kind())),
    };
    if !v.is_finite() {
        return Err(CodecError::OutOfRange(v.to_string()));
    }
    Ok(IndexKey::from_float(round(v, precision)))
}

pub fn float_to_indexed(raw: &FieldValue, precision: u32) -> CodecResult<Option<IndexValue>> {
    match raw {
        FieldValue::Null => Ok(None),
        FieldValue::Str(s) if s.trim().is_empty() => Ok(None),
        FieldValue::List(items) => multi(items, |item| float_key(item, precision)),
        value => float_key(value, precision).map(|k| Some(IndexValue::Single(k))),
    }
}

pub fn float_to_term(value: &FieldValue, precision: u32) -> CodecResult<IndexKey> {
    float_key(value, precision)
}

/// Renders a float with exactly `precision` decimals
pub fn float_display(raw: &FieldValue, precision: u32) -> Option<String> {
    let decimals = precision as usize;
    match raw {
        FieldValue::Float(f) => Some(format!("{:.*}", decimals, f)),
        FieldValue::Int(i) => Some(format!("{:.*}", decimals, *i as f64)),
        FieldValue::List(items) => Some(
            items
                .iter()
                .filter_map(|item| float_display(item, precision))
                .collect::<Vec<_>>()
                .join(" "),
        ),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Default
// ---------------------------------------------------------------------------

fn default_key(value: &FieldValue) -> CodecResult<IndexKey> {
    match value {
        FieldValue::Bool(b) => Ok(IndexKey::Bool(*b)),
        FieldValue::Int(i) => Ok(IndexKey::Int(*i)),
        FieldValue::Float(f) => Ok(IndexKey::from_float(*f)),
        FieldValue::Str(s) => Ok(IndexKey::from_string(s.as_str())),
        FieldValue::Date(d) => Ok(IndexKey::from_string(d.format("%Y-%m-%d %H:%M").to_string())),
        FieldValue::Ref(r) => i64::try_from(r.iid)
            .map(IndexKey::Int)
            .map_err(|_| CodecError::OutOfRange(format!("iid {}", r.iid))),
        other => Err(CodecError::value_kind("scalar", other.kind())),
    }
}

pub fn default_to_indexed(raw: &FieldValue) -> CodecResult<Option<IndexValue>> {
    match raw {
        FieldValue::Null => Ok(None),
        FieldValue::List(items) => multi(items, default_key),
        value => default_key(value).map(|k| Some(IndexValue::Single(k))),
    }
}

pub fn default_to_term(value: &FieldValue) -> CodecResult<IndexKey> {
    default_key(value)
}

/// Field value of a stored key, for codecs storing keys unchanged
pub fn key_to_value(key: &IndexKey) -> FieldValue {
    match key {
        IndexKey::Bool(b) => FieldValue::Bool(*b),
        IndexKey::Int(i) => FieldValue::Int(*i),
        IndexKey::Float(_) => FieldValue::Float(key.as_float().unwrap_or(f64::NAN)),
        IndexKey::String(s) => FieldValue::Str(s.clone()),
    }
}
