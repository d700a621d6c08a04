//! Synchronised key → (category, value) index.
//!
//! [`CategorizedIndex`] keeps a primary map from key to `(category, value)`
//! and a secondary map from category to the set of keys it holds. Both live
//! behind one [`RwLock`], so they always change together:
//!
//! - every key belongs to exactly one category;
//! - a category's key set is removed as soon as it becomes empty.
//!
//! Reads take the shared lock and return owned copies, never references
//! into the index.

use std::fmt;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::{IndexMap, IndexSet};

use crate::error::StoreError;

struct Inner<K, C, V> {
    entries: IndexMap<K, (C, V)>,
    by_category: IndexMap<C, IndexSet<K>>,
}

impl<K, C, V> Inner<K, C, V>
where
    K: Hash + Eq + Clone,
    C: Hash + Eq + Clone,
{
    fn link(&mut self, key: K, category: C) {
        self.by_category.entry(category).or_default().insert(key);
    }

    fn unlink(&mut self, key: &K, category: &C) {
        if let Some(keys) = self.by_category.get_mut(category) {
            keys.shift_remove(key);
            if keys.is_empty() {
                self.by_category.shift_remove(category);
            }
        }
    }
}

/// A thread-safe index of values grouped into categories.
pub struct CategorizedIndex<K, C, V> {
    inner: RwLock<Inner<K, C, V>>,
}

impl<K, C, V> CategorizedIndex<K, C, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    C: Hash + Eq + Clone,
    V: Clone,
{
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: IndexMap::new(),
                by_category: IndexMap::new(),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<K, C, V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<K, C, V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `key` under `category`.
    ///
    /// Fails with [`StoreError::DuplicateKey`] if the key is already
    /// indexed, in any category.
    pub fn add(&self, key: K, category: C, value: V) -> Result<(), StoreError> {
        let mut inner = self.write();
        if inner.entries.contains_key(&key) {
            return Err(StoreError::duplicate(&key));
        }
        inner.entries.insert(key.clone(), (category.clone(), value));
        inner.link(key, category);
        Ok(())
    }

    /// Remove `key`, returning its category and value.
    pub fn remove(&self, key: &K) -> Option<(C, V)> {
        let mut inner = self.write();
        let (category, value) = inner.entries.shift_remove(key)?;
        inner.unlink(key, &category);
        Some((category, value))
    }

    /// Move `key` to `category`, returning the category it left.
    ///
    /// Fails with [`StoreError::KeyNotFound`] if the key is not indexed.
    pub fn recategorize(&self, key: &K, category: C) -> Result<C, StoreError> {
        let mut inner = self.write();
        let previous = match inner.entries.get_mut(key) {
            Some(entry) => std::mem::replace(&mut entry.0, category.clone()),
            None => return Err(StoreError::not_found(key)),
        };
        if previous != category {
            inner.unlink(key, &previous);
            inner.link(key.clone(), category);
        }
        Ok(previous)
    }

    /// Copy of the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.read().entries.get(key).map(|(_, value)| value.clone())
    }

    /// The category `key` belongs to.
    pub fn category_of(&self, key: &K) -> Option<C> {
        self.read().entries.get(key).map(|(category, _)| category.clone())
    }

    /// Whether `key` is indexed.
    pub fn contains_key(&self, key: &K) -> bool {
        self.read().entries.contains_key(key)
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty categories, in first-use order.
    pub fn categories(&self) -> Vec<C> {
        self.read().by_category.keys().cloned().collect()
    }

    /// Keys in `category`, in insertion order. Empty for an unknown
    /// category.
    pub fn keys_in(&self, category: &C) -> Vec<K> {
        self.read()
            .by_category
            .get(category)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// `(key, value)` pairs in `category`, in insertion order.
    pub fn values_in(&self, category: &C) -> Vec<(K, V)> {
        let inner = self.read();
        let Some(keys) = inner.by_category.get(category) else {
            return Vec::new();
        };
        keys.iter()
            .filter_map(|key| {
                inner
                    .entries
                    .get(key)
                    .map(|(_, value)| (key.clone(), value.clone()))
            })
            .collect()
    }

    /// Copy of every `(key, category, value)` triple, in insertion order.
    pub fn snapshot(&self) -> Vec<(K, C, V)> {
        self.read()
            .entries
            .iter()
            .map(|(key, (category, value))| (key.clone(), category.clone(), value.clone()))
            .collect()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.entries.clear();
        inner.by_category.clear();
    }
}

impl<K, C, V> Default for CategorizedIndex<K, C, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    C: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CategorizedIndex<u32, &'static str, f64> {
        let index = CategorizedIndex::new();
        index.add(1, "fruit", 1.5).unwrap();
        index.add(2, "veg", 0.5).unwrap();
        index.add(3, "fruit", 2.0).unwrap();
        index
    }

    #[test]
    fn duplicate_add_fails_without_change() {
        let index = sample();
        assert!(matches!(
            index.add(1, "veg", 9.0),
            Err(StoreError::DuplicateKey { .. })
        ));
        assert_eq!(index.category_of(&1), Some("fruit"));
        assert_eq!(index.get(&1), Some(1.5));
    }

    #[test]
    fn category_sets_track_membership() {
        let index = sample();
        assert_eq!(index.keys_in(&"fruit"), vec![1, 3]);
        assert_eq!(index.values_in(&"veg"), vec![(2, 0.5)]);
        assert_eq!(index.categories(), vec!["fruit", "veg"]);
    }

    #[test]
    fn empty_category_is_dropped() {
        let index = sample();
        assert_eq!(index.remove(&2), Some(("veg", 0.5)));
        assert_eq!(index.categories(), vec!["fruit"]);
        assert!(index.keys_in(&"veg").is_empty());
        assert_eq!(index.remove(&2), None);
    }

    #[test]
    fn recategorize_moves_key() {
        let index = sample();
        assert_eq!(index.recategorize(&2, "fruit").unwrap(), "veg");
        assert_eq!(index.keys_in(&"fruit"), vec![1, 3, 2]);
        assert_eq!(index.categories(), vec!["fruit"]);
        assert!(matches!(
            index.recategorize(&9, "veg"),
            Err(StoreError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn recategorize_to_same_category_keeps_position() {
        let index = sample();
        index.recategorize(&1, "fruit").unwrap();
        assert_eq!(index.keys_in(&"fruit"), vec![1, 3]);
    }

    #[test]
    fn snapshot_is_independent_copy() {
        let index = sample();
        let snap = index.snapshot();
        index.clear();
        assert_eq!(snap.len(), 3);
        assert!(index.is_empty());
        assert!(index.categories().is_empty());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_key_in_exactly_one_category(
                ops in proptest::collection::vec((0u8..3, 0u32..20, 0u8..4), 1..200),
            ) {
                let index = CategorizedIndex::<u32, u8, u32>::new();
                for (op, key, category) in ops {
                    match op {
                        0 => { let _ = index.add(key, category, key); }
                        1 => { index.remove(&key); }
                        _ => { let _ = index.recategorize(&key, category); }
                    }
                }
                let mut seen = 0;
                for category in index.categories() {
                    let keys = index.keys_in(&category);
                    prop_assert!(!keys.is_empty());
                    for key in keys {
                        prop_assert_eq!(index.category_of(&key), Some(category));
                        seen += 1;
                    }
                }
                prop_assert_eq!(seen, index.len());
            }
        }
    }
}
