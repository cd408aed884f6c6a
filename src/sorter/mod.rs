//! Result set sorting
//!
//! Sorts a result set on one index. Two strategies produce the same order:
//!
//! - `ByIndex` walks the index in key order and keeps the ids of the result
//!   set. Cheap when the index has few distinct values.
//! - `ByResultSet` looks up the key of each id and sorts the pairs. Cheap
//!   when the result set is small.
//!
//! Ids are ordered by key, then by id. Ids without a value in the index
//! sort under the codec's empty key, which is the smallest key of its
//! domain: they come first in ascending order, last in descending order.
//! A multi-valued entry sorts under its smallest key.

mod lazy;

pub use lazy::{Iter, LazySorted};

use crate::index::{Index, IndexKey};
use crate::model::{Iid, IidSet};
use crate::observability::{log_event_with_fields, Event};

/// Walking the index pays off when `rs > values * (rs / BY_INDEX_DIVISOR + 1)`
pub const BY_INDEX_DIVISOR: f64 = 100.0;

/// Sort algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Pick by relative size of the result set and the index
    #[default]
    Auto,
    ByIndex,
    ByResultSet,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Auto => "auto",
            Strategy::ByIndex => "by_index",
            Strategy::ByResultSet => "by_result_set",
        }
    }
}

/// Returns true if walking an index of `values` distinct values is cheaper
/// than sorting a result set of `rs` ids
pub fn prefers_index(rs: usize, values: usize) -> bool {
    let rs = rs as f64;
    rs > values as f64 * (rs / BY_INDEX_DIVISOR + 1.0)
}

/// Sorts one result set on one index
pub struct Sorter<'a> {
    index: &'a Index,
    rs: &'a IidSet,
    reverse: bool,
    strategy: Strategy,
}

impl<'a> Sorter<'a> {
    pub fn new(index: &'a Index, rs: &'a IidSet, reverse: bool) -> Self {
        Self {
            index,
            rs,
            reverse,
            strategy: Strategy::Auto,
        }
    }

    /// Forces a strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Strategy `run` will use
    pub fn choose(&self) -> Strategy {
        match self.strategy {
            Strategy::Auto if prefers_index(self.rs.len(), self.index.value_count()) => {
                Strategy::ByIndex
            }
            Strategy::Auto => Strategy::ByResultSet,
            forced => forced,
        }
    }

    /// Sorts the result set
    pub fn run(&self) -> LazySorted {
        if self.rs.is_empty() {
            return LazySorted::empty();
        }
        let strategy = self.choose();
        log_event_with_fields(
            Event::SortStrategy,
            &[
                ("index", self.index.name()),
                ("strategy", strategy.as_str()),
                ("result_set", self.rs.len().to_string().as_str()),
                ("values", self.index.value_count().to_string().as_str()),
            ],
        );
        match strategy {
            Strategy::ByIndex => LazySorted::nested(self.groups_by_index(), self.reverse),
            _ => LazySorted::flat(self.pairs_by_result_set(), self.reverse),
        }
    }

    /// Groups of result set ids sharing a key, in key order
    fn groups_by_index(&self) -> Vec<(IndexKey, Vec<Iid>)> {
        let mut seen = IidSet::new();
        let mut groups: Vec<(IndexKey, Vec<Iid>)> = Vec::new();
        for (key, ids) in self.index.by_value().iter() {
            // An id with several keys stays in its first (smallest) group
            let group: Vec<Iid> = ids
                .intersection(self.rs)
                .copied()
                .filter(|iid| seen.insert(*iid))
                .collect();
            if !group.is_empty() {
                groups.push((key.clone(), group));
            }
        }

        if seen.len() < self.rs.len() {
            let remain: Vec<Iid> = self.rs.difference(&seen).copied().collect();
            let empty = self.index.codec().empty_key();
            match groups.binary_search_by(|(key, _)| key.cmp(&empty)) {
                Ok(g) => {
                    groups[g].1.extend(remain);
                    groups[g].1.sort_unstable();
                }
                Err(g) => groups.insert(g, (empty, remain)),
            }
        }
        groups
    }

    /// `(key, id)` pairs for every result set id, sorted
    fn pairs_by_result_set(&self) -> Vec<(IndexKey, Iid)> {
        let empty = self.index.codec().empty_key();
        let mut pairs: Vec<(IndexKey, Iid)> = self
            .rs
            .iter()
            .map(|iid| {
                let key = match self.index.stored_value(*iid) {
                    Some(value) => value.smallest().clone(),
                    None => empty.clone(),
                };
                (key, *iid)
            })
            .collect();
        pairs.sort_unstable();
        pairs
    }
}
