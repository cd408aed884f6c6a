//! Search queries on one index
//!
//! A query is a small expression tree. Leaves look values up in the index;
//! operators combine the ids found by their sub-queries.
//!
//! `apply(index, running)` returns the matching ids (None = no match) and
//! whether they were already intersected with the running result set, so
//! that `Index::search` does not intersect twice.

mod parser;

use std::fmt;

use crate::codec::CodecResult;
use crate::index::Index;
use crate::model::{FieldValue, IidSet};

pub use parser::{parse_criterion, ParseError};

/// Query on one index
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Objects having this value
    Term(FieldValue),
    /// Objects having any of these values
    In(Vec<FieldValue>),
    /// Objects matching every sub-query
    And(Vec<Query>),
    /// Objects matching at least one sub-query
    Or(Vec<Query>),
    /// Indexed objects not matching the sub-query
    Not(Box<Query>),
    /// Objects whose value is `>= low`, and `<= high` when given
    Range {
        low: FieldValue,
        high: Option<FieldValue>,
    },
}

impl Query {
    /// Shorthand for a term query
    pub fn term(value: impl Into<FieldValue>) -> Self {
        Query::Term(value.into())
    }

    /// Shorthand for a closed range
    pub fn between(low: impl Into<FieldValue>, high: impl Into<FieldValue>) -> Self {
        Query::Range {
            low: low.into(),
            high: Some(high.into()),
        }
    }

    /// Shorthand for an open range
    pub fn at_least(low: impl Into<FieldValue>) -> Self {
        Query::Range {
            low: low.into(),
            high: None,
        }
    }

    /// Shorthand for a negation
    pub fn not(query: Query) -> Self {
        Query::Not(Box::new(query))
    }

    /// Returns true for operators (anything but a plain term)
    pub fn is_operator(&self) -> bool {
        !matches!(self, Query::Term(_))
    }

    /// Ids matching this query, and whether `running` was already applied
    pub fn apply(
        &self,
        index: &Index,
        running: Option<&IidSet>,
    ) -> CodecResult<(Option<IidSet>, bool)> {
        match self {
            Query::Term(value) => {
                let key = index.term(value)?;
                Ok((index.ids(&key).cloned(), false))
            }
            Query::In(values) => {
                let mut found = IidSet::new();
                for value in values {
                    if let Some(ids) = index.ids(&index.term(value)?) {
                        found.extend(ids);
                    }
                }
                Ok((non_empty(found), false))
            }
            Query::Range { low, high } => {
                let low = index.term(low)?;
                let high = high.as_ref().map(|h| index.term(h)).transpose()?;
                let found: IidSet = index
                    .by_value()
                    .range(&low, high.as_ref())
                    .flat_map(|(_, ids)| ids.iter().copied())
                    .collect();
                Ok((non_empty(found), false))
            }
            Query::And(queries) => {
                let mut current = running.cloned();
                for query in queries {
                    let (found, intersected) = query.apply(index, current.as_ref())?;
                    let Some(found) = found else {
                        return Ok((None, true));
                    };
                    current = Some(if intersected {
                        found
                    } else {
                        narrow(found, current.as_ref())
                    });
                }
                let found = current.unwrap_or_else(|| index.all_ids());
                Ok((non_empty(found), true))
            }
            Query::Or(queries) => {
                let mut found = IidSet::new();
                for query in queries {
                    if let (Some(ids), intersected) = query.apply(index, running)? {
                        if intersected {
                            found.extend(ids);
                        } else {
                            found.extend(narrow(ids, running));
                        }
                    }
                }
                Ok((non_empty(found), true))
            }
            Query::Not(query) => {
                let universe = running.cloned().unwrap_or_else(|| index.all_ids());
                let (excluded, _) = query.apply(index, running)?;
                let found = match excluded {
                    Some(excluded) => universe.difference(&excluded).copied().collect(),
                    None => universe,
                };
                Ok((non_empty(found), true))
            }
        }
    }
}

fn non_empty(ids: IidSet) -> Option<IidSet> {
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

fn narrow(found: IidSet, running: Option<&IidSet>) -> IidSet {
    match running {
        Some(running) => found.intersection(running).copied().collect(),
        None => found,
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, "{}", sep)?;
                }
                write!(f, "{}", item)?;
            }
            Ok(())
        }

        match self {
            Query::Term(value) => write!(f, "{}", value),
            Query::In(values) => list(f, values, "|"),
            Query::And(queries) => {
                write!(f, "(")?;
                list(f, queries, " & ")?;
                write!(f, ")")
            }
            Query::Or(queries) => {
                write!(f, "(")?;
                list(f, queries, " | ")?;
                write!(f, ")")
            }
            Query::Not(query) => write!(f, "!{}", query),
            Query::Range { low, high: Some(high) } => write!(f, "{}..{}", low, high),
            Query::Range { low, high: None } => write!(f, "{}..", low),
        }
    }
}
