//! Growable array and sorted store integration tests.

use burrow_collections::{GrowableArray, SortedStore};
use burrow_core::CollectionError;
use burrow_test_utils::{distinct_keys, shuffled};

#[test]
fn array_grows_by_doubling_from_four() {
    let mut array = GrowableArray::<u32>::with_capacity(4);
    for i in 0..5 {
        array.add(i).unwrap();
    }
    assert_eq!(array.capacity(), 8);
    assert_eq!(array.len(), 5);
}

#[test]
fn array_positional_edits_keep_order() {
    let mut array = GrowableArray::from_slice(&[1i64, 2, 3, 4, 5]);
    array.insert_at(2, 0, 3).unwrap();
    assert_eq!(array.to_vec(), vec![1, 2, 0, 0, 0, 3, 4, 5]);
    array.remove_at(2, 3).unwrap();
    assert_eq!(array.to_vec(), vec![1, 2, 3, 4, 5]);
    assert_eq!(
        array.get(5),
        Err(CollectionError::IndexOutOfBounds { index: 5, len: 5 })
    );
}

#[test]
fn array_view_sorts_and_searches() {
    let keys = distinct_keys(500, 17);
    let mut array: GrowableArray<i64> = keys.iter().copied().collect();
    array.as_view_mut().unwrap().sort_unstable();
    let view = array.as_view().unwrap();
    for &key in &keys {
        assert!(view.binary_search(&key).is_ok());
    }
    assert!(view.as_slice().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn sorted_store_orders_random_inserts() {
    let keys = distinct_keys(2000, 23);
    let mut store = SortedStore::<i64>::new();
    for &key in &keys {
        store.add(key, key / 2).unwrap();
    }
    let mut expected = keys.clone();
    expected.sort_unstable();
    assert_eq!(store.keys().collect::<Vec<_>>(), expected);
    assert_eq!(store.first_key(), expected.first().copied());
    assert_eq!(store.last_key(), expected.last().copied());
}

#[test]
fn sorted_store_batch_removal_then_compact() {
    let keys = distinct_keys(1000, 29);
    let mut store = SortedStore::<i64>::new();
    for &key in &keys {
        store.add(key, 1).unwrap();
    }

    let mut doomed = keys[..400].to_vec();
    doomed.sort_unstable();
    assert_eq!(store.remove_many(&doomed).unwrap(), 400);
    assert_eq!(store.count(), 600);
    assert_eq!(store.tombstones(), 400);

    let unsorted = shuffled(&keys[400..500], 2);
    assert_eq!(store.remove_many(&unsorted).unwrap(), 100);

    store.compact().unwrap();
    assert_eq!(store.len(), 500);
    let mut expected = keys[500..].to_vec();
    expected.sort_unstable();
    assert_eq!(store.keys().collect::<Vec<_>>(), expected);
}

#[test]
fn sorted_store_with_struct_values() {
    #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Zeroable)]
    struct Quote {
        bid: f64,
        ask: f64,
    }

    let mut store = SortedStore::<Quote>::new();
    store.add(20, Quote { bid: 1.0, ask: 1.5 }).unwrap();
    store.add(10, Quote { bid: 2.0, ask: 2.5 }).unwrap();
    assert_eq!(store.get(10).unwrap(), Quote { bid: 2.0, ask: 2.5 });
    assert_eq!(store.range(0..15).count(), 1);
}
