//! Read-only lookup maps built once from a set of pairs.

use std::fmt;

use burrow_core::{CollectionError, Element};

use crate::config::MapConfig;
use crate::map::OpenMap;

/// An immutable integer-keyed map.
///
/// Built in one pass by [`from_pairs`](Self::from_pairs), sized so the
/// build never rebuilds, and never mutated afterwards. Shares lookups with
/// [`OpenMap`] but exposes no mutation.
pub struct FrozenMap<V: Element> {
    inner: OpenMap<V>,
}

impl<V: Element> FrozenMap<V> {
    /// Build from `(key, value)` pairs.
    ///
    /// Fails with [`CollectionError::DuplicateKey`] if any key appears
    /// twice.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = (i64, V)>,
    {
        let pairs: Vec<(i64, V)> = pairs.into_iter().collect();
        let mut inner = OpenMap::with_config(MapConfig::for_entries(pairs.len()))?;
        for (key, value) in pairs {
            if !inner.try_add(key, value)? {
                return Err(CollectionError::DuplicateKey { key });
            }
        }
        Ok(Self { inner })
    }

    /// Value for `key`, or [`CollectionError::KeyNotFound`].
    pub fn get(&self, key: i64) -> Result<V, CollectionError> {
        self.inner.get(key)
    }

    /// Value for `key`, if present.
    pub fn try_get(&self, key: i64) -> Option<V> {
        self.inner.try_get(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: i64) -> bool {
        self.inner.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate `(key, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, V)> + '_ {
        self.inner.iter()
    }

    /// Iterate keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.inner.keys()
    }
}

impl<V: Element> Clone for FrozenMap<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: Element + fmt::Debug> fmt::Debug for FrozenMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_hit_every_pair() {
        let frozen = FrozenMap::from_pairs((0..500i64).map(|k| (k * 7, k as u32))).unwrap();
        assert_eq!(frozen.len(), 500);
        assert_eq!(frozen.get(7 * 42).unwrap(), 42);
        assert!(!frozen.contains_key(1));
        assert_eq!(frozen.try_get(3), None);
    }

    #[test]
    fn build_never_rebuilds() {
        let frozen = FrozenMap::from_pairs((0..1000i64).map(|k| (k, 0u8))).unwrap();
        assert_eq!(frozen.inner.stats().rebuilds, 0);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let err = FrozenMap::from_pairs([(1, 1u8), (2, 2), (1, 3)]).unwrap_err();
        assert_eq!(err, CollectionError::DuplicateKey { key: 1 });
    }

    #[test]
    fn empty_build() {
        let frozen = FrozenMap::<u8>::from_pairs(std::iter::empty()).unwrap();
        assert!(frozen.is_empty());
        assert_eq!(frozen.get(0), Err(CollectionError::KeyNotFound { key: 0 }));
    }
}
