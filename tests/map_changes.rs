use spark_observables::{MapOperation, ObservableMap};
use std::collections::BTreeMap;

use MapOperation::{Add, Remove, Update};

#[test]
fn put_twice_is_add_then_update() {
    let mut map: ObservableMap<&str, i32> = ObservableMap::new();
    let mut changes = map.changes();

    map.insert("k", 1);
    map.insert("k", 2);
    assert_eq!(
        changes.drain(),
        vec![Add { key: "k", value: 1 }, Update { key: "k", old: 1, value: 2 }]
    );
}

#[test]
fn entry_mutation_matches_put() {
    let seed = [("a", 1), ("b", 2)];

    let mut via_put: ObservableMap<&str, i32> = ObservableMap::from_iter(seed);
    let mut put_changes = via_put.changes();
    via_put.insert("b", 20);

    let mut via_entry: ObservableMap<&str, i32> = ObservableMap::from_iter(seed);
    let mut entry_changes = via_entry.changes();
    {
        let mut entries = via_entry.entries_mut();
        let mut cursor = entries.cursor();
        while let Some(mut entry) = cursor.next() {
            if *entry.key() == "b" {
                entry.set_value(20);
            }
        }
    }

    assert_eq!(put_changes.drain(), entry_changes.drain());
    assert_eq!(via_put.get(&"b"), via_entry.get(&"b"));
}

#[test]
fn snapshot_precedes_live_events() {
    let mut map: ObservableMap<u8, char, BTreeMap<u8, char>> =
        ObservableMap::from_iter([(1, 'a'), (2, 'b')]);
    let mut changes = map.changes_with_snapshot();

    map.remove(&1);
    assert_eq!(
        changes.drain(),
        vec![
            Add { key: 1, value: 'a' },
            Add { key: 2, value: 'b' },
            Remove { key: 1, old: 'a' },
        ]
    );
}

#[test]
fn removing_missing_keys_is_silent() {
    let mut map: ObservableMap<u8, char> = ObservableMap::from_iter([(1, 'a')]);
    let mut changes = map.changes();

    assert_eq!(map.remove(&2), None);
    assert!(!map.keys_mut().remove(&2));
    assert!(!map.values_mut().remove(&'z'));
    assert!(!map.entries_mut().remove(&1, &'z'));
    assert!(changes.drain().is_empty());
}

#[test]
fn key_stream_ignores_other_keys() {
    let mut map: ObservableMap<&str, i32> = ObservableMap::new();
    let mut watched = map.changes_for_key("w");

    map.insert("other", 1);
    map.insert("w", 1);
    map.keys_mut().clear();
    assert_eq!(
        watched.drain(),
        vec![Add { key: "w", value: 1 }, Remove { key: "w", old: 1 }]
    );
}

#[test]
fn batch_put_uses_pre_batch_values() {
    let mut map: ObservableMap<&str, i32> = ObservableMap::from_iter([("k", 0)]);
    let mut changes = map.changes();

    map.insert_all([("k", 1), ("k", 2)]);
    assert_eq!(
        changes.drain(),
        vec![Update { key: "k", old: 0, value: 1 }, Update { key: "k", old: 0, value: 2 }]
    );
    assert_eq!(map.get(&"k"), Some(&2));
}
