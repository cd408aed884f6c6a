//! Lazy sorted sequence of object ids
//!
//! The sorter's output is kept in the shape it was produced in (a flat list
//! of `(key, id)` pairs, or groups of ids sharing a key) and read through
//! this wrapper, which behaves like a list of ids. Nothing is flattened or
//! copied until asked for; reversing only changes how positions are read.

use crate::index::IndexKey;
use crate::model::Iid;

#[derive(Debug, Clone, PartialEq)]
enum Repr {
    Flat(Vec<(IndexKey, Iid)>),
    Nested {
        groups: Vec<(IndexKey, Vec<Iid>)>,
        /// `ends[g]` = number of ids in groups `0..=g`
        ends: Vec<usize>,
    },
}

/// Finite, restartable sequence of ids in sort order
#[derive(Debug, Clone, PartialEq)]
pub struct LazySorted {
    repr: Repr,
    reverse: bool,
}

impl LazySorted {
    /// Wraps `(key, id)` pairs already in ascending order
    pub fn flat(pairs: Vec<(IndexKey, Iid)>, reverse: bool) -> Self {
        Self {
            repr: Repr::Flat(pairs),
            reverse,
        }
    }

    /// Wraps non-empty groups of ids, groups and ids in ascending order
    pub fn nested(groups: Vec<(IndexKey, Vec<Iid>)>, reverse: bool) -> Self {
        let ends = groups
            .iter()
            .scan(0, |total, (_, ids)| {
                *total += ids.len();
                Some(*total)
            })
            .collect();
        Self {
            repr: Repr::Nested { groups, ends },
            reverse,
        }
    }

    /// The empty sequence
    pub fn empty() -> Self {
        Self::flat(Vec::new(), false)
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Flat(pairs) => pairs.len(),
            Repr::Nested { ends, .. } => ends.last().copied().unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if ids are stored grouped by key
    pub fn is_nested(&self) -> bool {
        matches!(self.repr, Repr::Nested { .. })
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    /// Position in ascending order of the `k`th element of the sequence
    fn position(&self, k: usize) -> Option<usize> {
        let len = self.len();
        if k >= len {
            None
        } else if self.reverse {
            Some(len - 1 - k)
        } else {
            Some(k)
        }
    }

    fn locate(&self, pos: usize) -> (&IndexKey, Iid) {
        match &self.repr {
            Repr::Flat(pairs) => {
                let (key, iid) = &pairs[pos];
                (key, *iid)
            }
            Repr::Nested { groups, ends } => {
                let g = ends.partition_point(|&end| end <= pos);
                let start = if g == 0 { 0 } else { ends[g - 1] };
                let (key, ids) = &groups[g];
                (key, ids[pos - start])
            }
        }
    }

    /// The `k`th id
    pub fn get(&self, k: usize) -> Option<Iid> {
        self.position(k).map(|pos| self.locate(pos).1)
    }

    /// Sort key of the `k`th id
    pub fn key_at(&self, k: usize) -> Option<&IndexKey> {
        self.position(k).map(|pos| self.locate(pos).0)
    }

    /// Ids at positions `start..end`, clipped to the sequence
    pub fn slice(&self, start: usize, end: usize) -> Vec<Iid> {
        (start..end.min(self.len())).filter_map(|k| self.get(k)).collect()
    }

    /// Page `number` (0-based) of `size` ids
    pub fn page(&self, number: usize, size: usize) -> Vec<Iid> {
        let start = number.saturating_mul(size);
        self.slice(start, start.saturating_add(size))
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            seq: self,
            front: 0,
            back: self.len(),
        }
    }

    pub fn to_vec(&self) -> Vec<Iid> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for &'a LazySorted {
    type Item = Iid;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a `LazySorted`
pub struct Iter<'a> {
    seq: &'a LazySorted,
    front: usize,
    back: usize,
}

impl Iterator for Iter<'_> {
    type Item = Iid;

    fn next(&mut self) -> Option<Iid> {
        if self.front >= self.back {
            return None;
        }
        let iid = self.seq.get(self.front);
        self.front += 1;
        iid
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Iid> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.seq.get(self.back)
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> IndexKey {
        IndexKey::from_string(s)
    }

    fn nested() -> LazySorted {
        LazySorted::nested(
            vec![
                (key("a"), vec![4, 9]),
                (key("b"), vec![1]),
                (key("c"), vec![2, 3, 8]),
            ],
            false,
        )
    }

    #[test]
    fn test_flat_get() {
        let seq = LazySorted::flat(vec![(key("a"), 7), (key("b"), 5)], false);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(0), Some(7));
        assert_eq!(seq.get(1), Some(5));
        assert_eq!(seq.get(2), None);
        assert!(!seq.is_nested());
    }

    #[test]
    fn test_nested_get_crosses_groups() {
        let seq = nested();
        assert_eq!(seq.len(), 6);
        assert_eq!(seq.to_vec(), vec![4, 9, 1, 2, 3, 8]);
        assert_eq!(seq.get(2), Some(1));
        assert_eq!(seq.key_at(3), Some(&key("c")));
        assert!(seq.is_nested());
    }

    #[test]
    fn test_reverse_is_exact() {
        let forward = nested();
        let backward = LazySorted::nested(
            vec![
                (key("a"), vec![4, 9]),
                (key("b"), vec![1]),
                (key("c"), vec![2, 3, 8]),
            ],
            true,
        );
        let mut expected = forward.to_vec();
        expected.reverse();
        assert_eq!(backward.to_vec(), expected);
        assert_eq!(backward.key_at(0), Some(&key("c")));
    }

    #[test]
    fn test_slice_and_page() {
        let seq = nested();
        assert_eq!(seq.slice(1, 4), vec![9, 1, 2]);
        assert_eq!(seq.slice(4, 100), vec![3, 8]);
        assert_eq!(seq.page(0, 4), vec![4, 9, 1, 2]);
        assert_eq!(seq.page(1, 4), vec![3, 8]);
        assert!(seq.page(5, 4).is_empty());
    }

    #[test]
    fn test_iteration_is_restartable() {
        let seq = nested();
        let first: Vec<Iid> = seq.iter().collect();
        let second: Vec<Iid> = (&seq).into_iter().collect();
        assert_eq!(first, second);

        let mut iter = seq.iter();
        assert_eq!(iter.len(), 6);
        assert_eq!(iter.next(), Some(4));
        assert_eq!(iter.next_back(), Some(8));
        assert_eq!(iter.len(), 4);
    }

    #[test]
    fn test_empty() {
        let seq = LazySorted::empty();
        assert!(seq.is_empty());
        assert_eq!(seq.iter().next(), None);
        assert!(LazySorted::nested(vec![], true).is_empty());
    }
}
