//! Benchmark profiles for the Burrow collections library.
//!
//! Provides pre-populated containers so every benchmark measures the
//! operation under test rather than setup:
//!
//! - [`filled_map`]: map holding `n` seeded random keys
//! - [`churned_map`]: map where half the keys were removed, leaving tombstones
//! - [`filled_store`]: sorted store holding `n` seeded random keys

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use burrow_collections::{OpenMap, SortedStore};
use burrow_test_utils::distinct_keys;

/// Seed shared by all profiles so runs compare like with like.
pub const PROFILE_SEED: u64 = 0x00B0_770E;

/// A map holding `n` distinct seeded keys, each mapped to itself.
pub fn filled_map(n: usize) -> (OpenMap<i64>, Vec<i64>) {
    let keys = distinct_keys(n, PROFILE_SEED);
    let mut map = OpenMap::with_capacity(16);
    for &key in &keys {
        map.set(key, key).unwrap();
    }
    (map, keys)
}

/// A map with `n` keys inserted and every other one removed.
///
/// Returns the map and the keys still live.
pub fn churned_map(n: usize) -> (OpenMap<i64>, Vec<i64>) {
    let (mut map, keys) = filled_map(n);
    let mut live = Vec::with_capacity(n / 2);
    for (i, &key) in keys.iter().enumerate() {
        if i % 2 == 0 {
            map.remove(key).unwrap();
        } else {
            live.push(key);
        }
    }
    (map, live)
}

/// A sorted store holding `n` distinct seeded keys.
pub fn filled_store(n: usize) -> (SortedStore<i64>, Vec<i64>) {
    let keys = distinct_keys(n, PROFILE_SEED);
    let mut store = SortedStore::with_capacity(n);
    for &key in &keys {
        store.add(key, key).unwrap();
    }
    (store, keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn churned_map_has_tombstones() {
        let (map, live) = churned_map(1000);
        assert_eq!(map.len(), live.len());
        assert!(map.tombstones() > 0);
    }

    #[test]
    fn filled_store_holds_all_keys() {
        let (store, keys) = filled_store(100);
        assert_eq!(store.count(), keys.len());
    }
}
