//! Date codec
//!
//! A date-time is stored as the integer
//! `(((year * 12 + month) * 31 + day) * 24 + hour) * 60 + minute`,
//! flattened to the field precision (in minutes). Months and days are
//! 1-based, so decoding maps a zero remainder to 31 (day) or 12 (month) and
//! borrows from the next unit.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use super::errors::{CodecError, CodecResult};
use super::multi;
use crate::index::{IndexKey, IndexValue};
use crate::model::FieldValue;

const FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Encodes a date-time, flattened to `precision` minutes
pub fn encode(date: &NaiveDateTime, precision: u32) -> i64 {
    let year = i64::from(date.year());
    let month = i64::from(date.month());
    let day = i64::from(date.day());
    let hour = i64::from(date.hour());
    let minute = i64::from(date.minute());
    let mut r = (((year * 12 + month) * 31 + day) * 24 + hour) * 60 + minute;
    if precision > 1 {
        r -= r % i64::from(precision);
    }
    r
}

/// Decodes an encoded date-time.
///
/// A day past the end of its month (possible once the value was flattened)
/// is clamped to the month's last day.
pub fn decode(value: i64) -> CodecResult<NaiveDateTime> {
    let minute = value % 60;
    let value = (value - minute) / 60;
    let hour = value % 24;
    let value = (value - hour) / 24;
    let mut day = value % 31;
    if day == 0 {
        day = 31;
    }
    let value = (value - day) / 31;
    let mut month = value % 12;
    if month == 0 {
        month = 12;
    }
    let year = (value - month) / 12;

    let out_of_range = || CodecError::OutOfRange(format!("{} is not an encoded date", value));
    let year = i32::try_from(year).map_err(|_| out_of_range())?;
    let month = u32::try_from(month).map_err(|_| out_of_range())?;
    let day = u32::try_from(day).map_err(|_| out_of_range())?;

    let date = (28..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
        .or_else(|| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(out_of_range)?;
    let time = u32::try_from(hour)
        .ok()
        .zip(u32::try_from(minute).ok())
        .and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
        .ok_or_else(out_of_range)?;
    Ok(NaiveDateTime::new(date, time))
}

/// Parses a date or date-time string
pub fn parse(s: &str) -> CodecResult<NaiveDateTime> {
    let s = s.trim();
    for format in FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(date);
        }
    }
    for format in DATE_FORMATS {
        if let Some(date) = NaiveDate::parse_from_str(s, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(date);
        }
    }
    Err(CodecError::unparseable("date", s))
}

fn key(value: &FieldValue, precision: u32) -> CodecResult<IndexKey> {
    match value {
        // Already an internal representation
        FieldValue::Int(i) => Ok(IndexKey::Int(*i)),
        FieldValue::Date(date) => Ok(IndexKey::Int(encode(date, precision))),
        FieldValue::Str(s) => Ok(IndexKey::Int(encode(&parse(s)?, precision))),
        other => Err(CodecError::value_kind("date", other.kind())),
    }
}

pub fn to_indexed(raw: &FieldValue, precision: u32) -> CodecResult<Option<IndexValue>> {
    match raw {
        FieldValue::Null => Ok(None),
        FieldValue::Str(s) if s.trim().is_empty() => Ok(None),
        // A computed field may produce several dates
        FieldValue::List(items) => multi(items, |item| key(item, precision)),
        value => key(value, precision).map(|k| Some(IndexValue::Single(k))),
    }
}

pub fn to_term(value: &FieldValue, precision: u32) -> CodecResult<IndexKey> {
    key(value, precision)
}

pub fn from_key(key: &IndexKey) -> CodecResult<FieldValue> {
    match key {
        IndexKey::Int(i) => decode(*i).map(FieldValue::Date),
        other => Err(CodecError::value_kind("date", other.to_string())),
    }
}

pub fn display(raw: &FieldValue) -> Option<String> {
    let date = match raw {
        FieldValue::Date(date) => *date,
        FieldValue::Int(i) => decode(*i).ok()?,
        FieldValue::Str(s) => parse(s).ok()?,
        _ => return None,
    };
    Some(date.format("%A %d %B %Y").to_string())
}
