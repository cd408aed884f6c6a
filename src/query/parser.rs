//! Textual search criteria
//!
//! A criterion is `field=expression`:
//!
//! ```text
//! expression := ["!"] conjunction
//! conjunction := disjunction ("&" disjunction)*
//! disjunction := atom ("|" atom)*
//! atom := value ".." [value] | value
//! ```
//!
//! Values are read as JSON when possible (`12`, `true`, `1.5`), as plain
//! strings otherwise. Alternatives made only of values become an `In`.

use thiserror::Error;

use super::Query;
use crate::model::FieldValue;

/// Criterion syntax errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("criterion \"{0}\" has no field (expected field=expression)")]
    MissingField(String),

    #[error("criterion \"{0}\" has an empty expression")]
    EmptyExpression(String),
}

/// Parses `field=expression` into a field name and a query
pub fn parse_criterion(criterion: &str) -> Result<(String, Query), ParseError> {
    let (field, expression) = criterion
        .split_once('=')
        .ok_or_else(|| ParseError::MissingField(criterion.to_string()))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(ParseError::MissingField(criterion.to_string()));
    }
    let query = parse_expression(expression.trim())
        .ok_or_else(|| ParseError::EmptyExpression(criterion.to_string()))?;
    Ok((field.to_string(), query))
}

fn parse_expression(s: &str) -> Option<Query> {
    if let Some(rest) = s.strip_prefix('!') {
        return parse_expression(rest.trim()).map(Query::not);
    }
    let mut parts = s
        .split('&')
        .map(|part| parse_disjunction(part.trim()))
        .collect::<Option<Vec<_>>>()?;
    if parts.len() == 1 {
        parts.pop()
    } else {
        Some(Query::And(parts))
    }
}

fn parse_disjunction(s: &str) -> Option<Query> {
    let mut atoms = s
        .split('|')
        .map(|atom| parse_atom(atom.trim()))
        .collect::<Option<Vec<_>>>()?;
    if atoms.len() == 1 {
        return atoms.pop();
    }
    if atoms.iter().all(|atom| !atom.is_operator()) {
        let values = atoms
            .into_iter()
            .filter_map(|atom| match atom {
                Query::Term(value) => Some(value),
                _ => None,
            })
            .collect();
        return Some(Query::In(values));
    }
    Some(Query::Or(atoms))
}

fn parse_atom(s: &str) -> Option<Query> {
    if s.is_empty() {
        return None;
    }
    match s.split_once("..") {
        Some((low, high)) => {
            let high = high.trim();
            Some(Query::Range {
                low: parse_value(low.trim()),
                high: if high.is_empty() { None } else { Some(parse_value(high)) },
            })
        }
        None => Some(Query::Term(parse_value(s))),
    }
}

fn parse_value(s: &str) -> FieldValue {
    match serde_json::from_str::<serde_json::Value>(s) {
        Ok(value) => FieldValue::from_json(&value),
        Err(_) => FieldValue::str(s),
    }
}
