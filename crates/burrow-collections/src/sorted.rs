//! Key-sorted store over three parallel arrays.
//!
//! [`SortedStore`] keeps `keys`, `values` and `occupied` in three
//! [`GrowableArray`]s that share positions: position `i` holds `keys[i]`,
//! `values[i]` and an occupancy byte. `keys` is strictly ascending by
//! position at all times, so lookup is a binary search.
//!
//! Removal is lazy: it clears the occupancy byte and leaves the key in
//! place as a tombstone, which a later `add` of the same key reoccupies.
//! Only [`compact`](SortedStore::compact) physically deletes positions.

use std::fmt;
use std::ops::Range;

use burrow_core::{CollectionError, Element};

use crate::array::GrowableArray;

const VACANT: u8 = 0;
const OCCUPIED: u8 = 1;

/// A sorted `i64 -> V` store with binary-search lookup and lazy deletion.
pub struct SortedStore<V: Element = i64> {
    keys: GrowableArray<i64>,
    values: GrowableArray<V>,
    occupied: GrowableArray<u8>,
    count: usize,
}

impl<V: Element> SortedStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty store with room for `capacity` positions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: GrowableArray::with_capacity(capacity),
            values: GrowableArray::with_capacity(capacity),
            occupied: GrowableArray::with_capacity(capacity),
            count: 0,
        }
    }

    /// Number of live (occupied) entries.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of physical positions, live or tombstoned.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store has no live entries.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Positions holding a removed key awaiting [`compact`](Self::compact).
    pub fn tombstones(&self) -> usize {
        self.len() - self.count
    }

    fn columns(&self) -> (&[i64], &[V], &[u8]) {
        match (self.keys.as_view(), self.values.as_view(), self.occupied.as_view()) {
            (Ok(k), Ok(v), Ok(o)) => (k.as_slice(), v.as_slice(), o.as_slice()),
            _ => (&[], &[], &[]),
        }
    }

    fn search(&self, key: i64) -> Result<Result<usize, usize>, CollectionError> {
        Ok(self.keys.as_view()?.binary_search(&key))
    }

    /// Insert `key` or overwrite its value. A tombstoned key is reoccupied
    /// in place; a new key is inserted at its sorted position.
    pub fn add(&mut self, key: i64, value: V) -> Result<(), CollectionError> {
        match self.search(key)? {
            Ok(index) => {
                self.values.set(index, value)?;
                if self.occupied.get(index)? == VACANT {
                    self.occupied.set(index, OCCUPIED)?;
                    self.count += 1;
                }
            }
            Err(index) => {
                self.keys.insert_at(index, key, 1)?;
                self.values.insert_at(index, value, 1)?;
                self.occupied.insert_at(index, OCCUPIED, 1)?;
                self.count += 1;
            }
        }
        Ok(())
    }

    fn live_index(&self, key: i64) -> Result<usize, CollectionError> {
        match self.search(key)? {
            Ok(index) if self.occupied.get(index)? == OCCUPIED => Ok(index),
            _ => Err(CollectionError::KeyNotFound { key }),
        }
    }

    /// Value for `key`, or [`CollectionError::KeyNotFound`] when the key is
    /// absent or tombstoned.
    pub fn get(&self, key: i64) -> Result<V, CollectionError> {
        let index = self.live_index(key)?;
        self.values.get(index)
    }

    /// Value for `key`, if live. Never fails.
    pub fn try_get(&self, key: i64) -> Option<V> {
        self.get(key).ok()
    }

    /// Whether `key` is live.
    pub fn contains_key(&self, key: i64) -> bool {
        self.live_index(key).is_ok()
    }

    /// Tombstone `key` and return its value.
    pub fn remove(&mut self, key: i64) -> Result<V, CollectionError> {
        let index = self.live_index(key)?;
        let value = self.values.get(index)?;
        self.occupied.set(index, VACANT)?;
        self.count -= 1;
        Ok(value)
    }

    /// Tombstone `key` if live. `None` means nothing was removed.
    pub fn try_remove(&mut self, key: i64) -> Option<V> {
        self.remove(key).ok()
    }

    /// Tombstone every live key in `batch`, returning how many were removed.
    ///
    /// A batch in non-decreasing order is applied with one linear merge
    /// over the store. The order is checked first; any other batch falls
    /// back to a binary search per key.
    pub fn remove_many(&mut self, batch: &[i64]) -> Result<usize, CollectionError> {
        if self.keys.is_released() {
            return Err(CollectionError::Released);
        }
        if !batch.windows(2).all(|w| w[0] <= w[1]) {
            return Ok(batch.iter().filter(|&&key| self.try_remove(key).is_some()).count());
        }

        let keys = self.keys.as_view()?.as_slice();
        let mut occupied = self.occupied.as_view_mut()?;
        let flags = occupied.as_mut_slice();
        let (mut i, mut j, mut removed) = (0, 0, 0);
        while i < keys.len() && j < batch.len() {
            match keys[i].cmp(&batch[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    if flags[i] == OCCUPIED {
                        flags[i] = VACANT;
                        removed += 1;
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        self.count -= removed;
        Ok(removed)
    }

    /// Physically delete every tombstoned position in one pass.
    ///
    /// Capacity is kept; only the length of the three arrays shrinks.
    pub fn compact(&mut self) -> Result<(), CollectionError> {
        let mut keys = self.keys.as_view_mut()?;
        let mut values = self.values.as_view_mut()?;
        let mut occupied = self.occupied.as_view_mut()?;
        let (keys, values, occupied) =
            (keys.as_mut_slice(), values.as_mut_slice(), occupied.as_mut_slice());

        let mut write = 0;
        for read in 0..keys.len() {
            if occupied[read] == OCCUPIED {
                keys[write] = keys[read];
                values[write] = values[read];
                occupied[write] = OCCUPIED;
                write += 1;
            }
        }
        debug_assert!(
            keys[..write].windows(2).all(|w| w[0] < w[1]),
            "sorted store keys not strictly ascending after compact"
        );
        debug_assert_eq!(write, self.count);

        self.keys.truncate(write);
        self.values.truncate(write);
        self.occupied.truncate(write);
        Ok(())
    }

    /// Remove every position, keeping allocated capacity.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
        self.occupied.clear();
        self.count = 0;
    }

    /// Iterate live `(key, value)` pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, V)> + '_ {
        let (keys, values, occupied) = self.columns();
        live(keys, values, occupied)
    }

    /// Iterate live keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Smallest live key.
    pub fn first_key(&self) -> Option<i64> {
        self.keys().next()
    }

    /// Largest live key.
    pub fn last_key(&self) -> Option<i64> {
        let (keys, _, occupied) = self.columns();
        keys.iter()
            .zip(occupied)
            .rev()
            .find(|(_, &flag)| flag == OCCUPIED)
            .map(|(&key, _)| key)
    }

    /// Live pairs with `range.start <= key < range.end`, ascending.
    pub fn range(&self, range: Range<i64>) -> impl Iterator<Item = (i64, V)> + '_ {
        let (keys, values, occupied) = self.columns();
        let start = keys.partition_point(|&k| k < range.start);
        let end = keys.partition_point(|&k| k < range.end).max(start);
        live(&keys[start..end], &values[start..end], &occupied[start..end])
    }

    /// Free all three arrays now.
    pub fn release(&mut self) -> Result<(), CollectionError> {
        self.keys.release()?;
        self.values.release()?;
        self.occupied.release()?;
        self.count = 0;
        Ok(())
    }

    /// Bytes held by the three arrays.
    pub fn memory_bytes(&self) -> usize {
        self.keys.memory_bytes() + self.values.memory_bytes() + self.occupied.memory_bytes()
    }
}

fn live<'a, V: Element>(
    keys: &'a [i64],
    values: &'a [V],
    occupied: &'a [u8],
) -> impl Iterator<Item = (i64, V)> + 'a {
    keys.iter()
        .zip(values)
        .zip(occupied)
        .filter(|(_, &flag)| flag == OCCUPIED)
        .map(|((&key, &value), _)| (key, value))
}

impl<V: Element> Default for SortedStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Element> Clone for SortedStore<V> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            values: self.values.clone(),
            occupied: self.occupied.clone(),
            count: self.count,
        }
    }
}

impl<V: Element + fmt::Debug> fmt::Debug for SortedStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
