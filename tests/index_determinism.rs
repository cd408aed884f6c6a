//! Index Determinism Tests
//!
//! Tests for index invariants:
//! - Both maps of an index describe the same entries
//! - Recompute from the object store rebuilds identical maps
//! - Both sort strategies produce the same order

use appy_catalog::catalog::Catalog;
use appy_catalog::codec::{Codec, FieldSpec};
use appy_catalog::index::Index;
use appy_catalog::model::{FieldValue, Iid, IidSet, MemoryScan, ObjectRef, StoredObject};
use appy_catalog::query::Query;
use appy_catalog::sorter::{Sorter, Strategy};

// =============================================================================
// Helper Functions
// =============================================================================

fn set(ids: &[Iid]) -> IidSet {
    ids.iter().copied().collect()
}

fn dated(iid: Iid, date: &str) -> StoredObject {
    StoredObject::new(iid, "Event").with("when", date)
}

fn range_ids(index: &Index, low: &str, high: &str) -> IidSet {
    index
        .get_by_range(&FieldValue::str(low), Some(&FieldValue::str(high)))
        .unwrap()
        .into_iter()
        .flat_map(|(_, ids)| ids.iter().copied())
        .collect()
}

/// Deterministic pseudo-random sequence
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, modulo: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % modulo
    }
}

// =============================================================================
// Date Range Tests
// =============================================================================

/// Range query over dates, then recompute yields the same maps.
#[test]
fn test_date_range_and_recompute() {
    let mut scan = MemoryScan::new(vec![
        dated(1, "2024-01-10 09:00"),
        dated(2, "2024-01-10 09:00"),
        dated(3, "2024-03-01 00:00"),
    ]);
    let mut index = Index::new("Event", FieldSpec::new("when", Codec::Date));
    index.recompute(&mut scan).unwrap();

    assert_eq!(range_ids(&index, "2024-01-01", "2024-02-01"), set(&[1, 2]));
    assert_eq!(index.value_count(), 2);

    let before = index.clone();
    let report = index.recompute(&mut scan).unwrap();
    assert!(report.failures.is_empty());
    assert_eq!(index.by_value(), before.by_value());
    for iid in 1..=3 {
        assert_eq!(index.stored_value(iid), before.stored_value(iid));
    }
    assert!(index.is_consistent());
}

/// Objects indexed one by one and rebuilt from scratch end up identical.
#[test]
fn test_incremental_equals_recompute() {
    let mut rng = Lcg(7);
    let mut objects = Vec::new();
    for iid in 1..=200 {
        let mut object = StoredObject::new(iid, "Person");
        if rng.next(5) != 0 {
            object = object.with("score", rng.next(1000) as f64 / 7.0);
        }
        if rng.next(9) == 0 {
            object = object.deleted();
        }
        objects.push(object);
    }

    let field = FieldSpec::new("score", Codec::Float).with_precision(2);
    let mut incremental = Index::new("Person", field.clone());
    for object in &objects {
        if object.deleted {
            incremental.unindex_object(object.iid);
        } else {
            incremental.index_object(object.iid, object.value("score")).unwrap();
        }
    }

    let mut rebuilt = Index::new("Person", field);
    rebuilt.recompute(&mut MemoryScan::new(objects)).unwrap();

    assert_eq!(incremental.by_value(), rebuilt.by_value());
    assert_eq!(incremental.all_ids(), rebuilt.all_ids());
    assert!(rebuilt.is_consistent());
}

/// Both maps agree after every step of a random update sequence.
#[test]
fn test_maps_agree_after_every_step() {
    let mut rng = Lcg(99);
    let mut index = Index::new("Person", FieldSpec::new("tags", Codec::Default));

    for _ in 0..2000 {
        let iid = rng.next(50) + 1;
        match rng.next(4) {
            0 => {
                index.unindex_object(iid);
            }
            1 => {
                index.index_object(iid, &FieldValue::Null).unwrap();
            }
            2 => {
                let tags = (0..rng.next(4))
                    .map(|_| FieldValue::Int(rng.next(10) as i64))
                    .collect();
                index.index_object(iid, &FieldValue::List(tags)).unwrap();
            }
            _ => {
                index.index_object(iid, &FieldValue::Int(rng.next(10) as i64)).unwrap();
            }
        }
        assert!(index.is_consistent(), "maps diverged after updating {}", iid);
    }
}

/// Updating an object moves it between keys without leaving empty entries.
#[test]
fn test_update_leaves_no_empty_entries() {
    let mut index = Index::new("Person", FieldSpec::new("city", Codec::Sortable));
    index.index_object(1, &FieldValue::str("Liège")).unwrap();
    index.index_object(1, &FieldValue::str("Namur")).unwrap();

    assert_eq!(index.value_count(), 1);
    assert_eq!(index.get_by_value(&FieldValue::str("liege")).unwrap(), None);
    assert_eq!(index.get_by_value(&FieldValue::str("NAMUR")).unwrap(), Some(&set(&[1])));

    assert!(!index.unindex_object(42));
    assert_eq!(index.object_count(), 1);
}

/// Multi-valued references contribute one entry per referenced object.
#[test]
fn test_multi_valued_refs() {
    let mut index = Index::new("Person", FieldSpec::new("friends", Codec::Ref));
    let friends = |ids: &[Iid]| FieldValue::List(ids.iter().map(|i| FieldValue::Ref(ObjectRef::new(*i))).collect());

    index.index_object(1, &friends(&[10, 11])).unwrap();
    index.index_object(2, &friends(&[11])).unwrap();
    index.index_object(3, &FieldValue::List(Vec::new())).unwrap();

    assert_eq!(index.object_count(), 2);
    assert_eq!(index.get_by_value(&FieldValue::Int(11)).unwrap(), Some(&set(&[1, 2])));

    index.index_object(1, &friends(&[12])).unwrap();
    assert_eq!(index.get_by_value(&FieldValue::Int(10)).unwrap(), None);
    assert_eq!(index.get_by_value(&FieldValue::Int(11)).unwrap(), Some(&set(&[2])));
    assert!(index.is_consistent());
}

// =============================================================================
// Sort Determinism Tests
// =============================================================================

/// Sorting with missing values: they come first ascending, last descending.
#[test]
fn test_sort_with_missing_value() {
    let mut index = Index::new("Person", FieldSpec::new("title", Codec::Sortable));
    index.index_object(5, &FieldValue::str("b")).unwrap();
    index.index_object(7, &FieldValue::str("a")).unwrap();
    let rs = set(&[5, 7, 9]);

    for strategy in [Strategy::ByIndex, Strategy::ByResultSet] {
        let up = Sorter::new(&index, &rs, false).with_strategy(strategy).run();
        assert_eq!(up.to_vec(), vec![9, 7, 5]);
        let down = Sorter::new(&index, &rs, true).with_strategy(strategy).run();
        assert_eq!(down.to_vec(), vec![5, 7, 9]);
    }
}

/// Both strategies agree on random data, and pages match the full order.
#[test]
fn test_strategies_agree_on_pages() {
    let mut rng = Lcg(2024);
    let mut index = Index::new("Person", FieldSpec::new("name", Codec::Sortable));
    let names = ["ana", "Bea", "carl", "Dora", "émile", "fred", "gus"];
    for iid in 1..=500 {
        if rng.next(4) != 0 {
            let name = names[rng.next(names.len() as u64) as usize];
            index.index_object(iid, &FieldValue::str(name)).unwrap();
        }
    }
    let rs: IidSet = (1..=600).filter(|_| rng.next(3) != 0).collect();

    for reverse in [false, true] {
        let by_index = Sorter::new(&index, &rs, reverse)
            .with_strategy(Strategy::ByIndex)
            .run();
        let by_rs = Sorter::new(&index, &rs, reverse)
            .with_strategy(Strategy::ByResultSet)
            .run();
        assert!(by_index.is_nested());
        assert!(!by_rs.is_nested());

        let full = by_rs.to_vec();
        assert_eq!(by_index.to_vec(), full);
        assert_eq!(by_index.len(), rs.len());

        for page in 0..(full.len() / 30 + 1) {
            let expected: Vec<Iid> = full.iter().copied().skip(page * 30).take(30).collect();
            assert_eq!(by_index.page(page, 30), expected);
        }
        let k = full.len() / 2;
        assert_eq!(by_index.get(k), Some(full[k]));
        assert_eq!(by_index.iter().next_back(), full.last().copied());
    }
}

// =============================================================================
// Catalog Search Tests
// =============================================================================

/// Criteria narrow in order, operators combine, results sort.
#[test]
fn test_catalog_search_and_sort() {
    let mut catalog = Catalog::new("Person");
    catalog.add_index(FieldSpec::new("age", Codec::Default));
    catalog.add_index(FieldSpec::new("bio", Codec::Text));
    catalog.add_index(FieldSpec::new("name", Codec::Sortable));

    let people = [
        (1, "Zoé", 34, "Loves rock climbing and jazz"),
        (2, "adam", 28, "Jazz pianist"),
        (3, "Marc", 41, "Rock climbing instructor"),
        (4, "lea", 34, "Baker"),
    ];
    for (iid, name, age, bio) in people {
        let object = StoredObject::new(iid, "Person")
            .with("name", name)
            .with("age", age as i64)
            .with("bio", bio);
        catalog.index_object(&object).unwrap();
    }

    let criteria = [
        ("bio", Query::Or(vec![Query::term("jazz"), Query::term("climbing")])),
        ("age", Query::not(Query::term(41_i64))),
    ];
    assert_eq!(catalog.search(&criteria).unwrap(), Some(set(&[1, 2])));

    let sorted = catalog.search_sorted(&criteria, "name", false).unwrap();
    assert_eq!(sorted.to_vec(), vec![2, 1]);

    let criteria = [("age", Query::between(30_i64, 40_i64))];
    let sorted = catalog.search_sorted(&criteria, "name", true).unwrap();
    assert_eq!(sorted.to_vec(), vec![1, 4]);

    let nothing = [("bio", Query::term("opera"))];
    assert!(catalog.search_sorted(&nothing, "name", false).unwrap().is_empty());
}
