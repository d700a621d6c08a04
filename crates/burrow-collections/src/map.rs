//! Integer-keyed open-addressing hash map.
//!
//! [`OpenMap`] stores [`Slot`]s in a power-of-two table held in one
//! [`MemoryBlock`]. Keys map to a bucket with `key & (capacity - 1)` and
//! collisions are resolved by linear probing.
//!
//! # Probe discipline
//!
//! - **Lookup** walks from the bucket and stops at the first `Empty` slot
//!   (absent) or at the matching key (hit). Tombstones never stop a lookup.
//! - **Insert** walks the same chain, remembering the first tombstone. A
//!   matching key anywhere before the first `Empty` is overwritten; if none
//!   matches, the entry goes into the remembered tombstone, or into the
//!   `Empty` slot when the chain had no tombstone.
//! - **Remove** turns the slot into a tombstone. Space is reclaimed by the
//!   next rebuild.
//!
//! # Rebuilds
//!
//! Before a new key is placed, if `occupied + tombstones + 1` would exceed
//! [`max_load_percent`](MapConfig::max_load_percent) of the capacity, the
//! table is rebuilt first: in place (same size) when tombstones dominate
//! the used slots, otherwise at double the size. Every rebuild is a full
//! rebuild: a fresh zeroed table receives each occupied entry through the
//! normal insert path, and all tombstones disappear.

use std::fmt;

use burrow_arena::MemoryBlock;
use burrow_core::{CollectionError, Element};

use crate::config::MapConfig;
use crate::slot::Slot;

/// Counters describing a map's table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapStats {
    /// Table size (always a power of two).
    pub capacity: usize,
    /// Occupied slots.
    pub count: usize,
    /// Tombstoned slots awaiting the next rebuild.
    pub tombstones: usize,
    /// Number of table rebuilds (resize or compact) so far.
    pub rebuilds: u64,
    /// Bytes held by the table block.
    pub memory_bytes: usize,
}

/// Outcome of one walk along a probe chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Probe {
    /// The key is live at this index.
    Hit(usize),
    /// The key is absent; insert at `index`, which is a reclaimed tombstone
    /// when `tombstone` is set.
    Vacant { index: usize, tombstone: bool },
    /// The key is absent and the chain covered the whole table without an
    /// `Empty` slot or a tombstone.
    Full,
}

/// At the size ceiling, tombstones must fill this fraction of the table
/// before an insert pays for a full compaction.
const CEILING_COMPACT_DIVISOR: usize = 8;

fn bucket(key: i64, capacity: usize) -> usize {
    (key as u64 & (capacity as u64 - 1)) as usize
}

/// Walk the probe chain for `key` over `slots`.
///
/// Bounded by the table length, so it terminates even on a table with no
/// `Empty` slot left.
fn probe<V: Element>(slots: &[Slot<V>], key: i64) -> Probe {
    let capacity = slots.len();
    if capacity == 0 {
        return Probe::Full;
    }
    let mask = capacity - 1;
    let mut index = bucket(key, capacity);
    let mut first_tombstone = None;
    for _ in 0..capacity {
        match slots[index] {
            Slot::Empty => {
                return match first_tombstone {
                    Some(t) => Probe::Vacant {
                        index: t,
                        tombstone: true,
                    },
                    None => Probe::Vacant {
                        index,
                        tombstone: false,
                    },
                };
            }
            Slot::Occupied { key: k, .. } if k == key => return Probe::Hit(index),
            Slot::Tombstone => {
                if first_tombstone.is_none() {
                    first_tombstone = Some(index);
                }
            }
            Slot::Occupied { .. } => {}
        }
        index = (index + 1) & mask;
    }
    match first_tombstone {
        Some(t) => Probe::Vacant {
            index: t,
            tombstone: true,
        },
        None => Probe::Full,
    }
}

/// Integer-keyed hash map with linear probing and lazy deletion.
///
/// Not internally synchronised: mutation takes `&mut self`. Wrap the map in
/// a lock to share it between threads.
pub struct OpenMap<V: Element> {
    table: MemoryBlock<Slot<V>>,
    count: usize,
    tombstones: usize,
    rebuilds: u64,
    config: MapConfig,
}

impl<V: Element> OpenMap<V> {
    /// Create a map with the default configuration (capacity 256).
    pub fn new() -> Self {
        Self::build(MapConfig::default())
    }

    /// Create a map with the given initial capacity, rounded up to a power
    /// of two within `[16, 2^20]`.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::build(MapConfig::with_capacity(initial_capacity))
    }

    /// Create a map from a validated configuration.
    pub fn with_config(config: MapConfig) -> Result<Self, CollectionError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: MapConfig) -> Self {
        Self {
            table: MemoryBlock::allocate(config.resolved_capacity()),
            count: 0,
            tombstones: 0,
            rebuilds: 0,
            config,
        }
    }

    /// Table size. Always a power of two in `[16, 2^20]` while live.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the map has no live entries.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of tombstoned slots.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// The configuration this map was built with.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Value for `key`, or [`CollectionError::KeyNotFound`].
    pub fn get(&self, key: i64) -> Result<V, CollectionError> {
        let slots = self.table.slots()?;
        match probe(slots, key) {
            Probe::Hit(index) => match slots[index] {
                Slot::Occupied { value, .. } => Ok(value),
                _ => Err(CollectionError::KeyNotFound { key }),
            },
            _ => Err(CollectionError::KeyNotFound { key }),
        }
    }

    /// Value for `key`, if present. Never fails; a released map is empty.
    pub fn try_get(&self, key: i64) -> Option<V> {
        self.get(key).ok()
    }

    /// Whether `key` has a live entry.
    pub fn contains_key(&self, key: i64) -> bool {
        self.try_get(key).is_some()
    }

    /// Insert or overwrite the value for `key`.
    ///
    /// Fails with [`CollectionError::CapacityExhausted`] only when the
    /// table is at its maximum size and has no slot left even after
    /// dropping tombstones.
    pub fn set(&mut self, key: i64, value: V) -> Result<(), CollectionError> {
        self.insert(key, value, true).map(|_| ())
    }

    /// Insert `key` only if it is absent.
    ///
    /// Returns `Ok(false)` without touching the map when the key exists.
    pub fn try_add(&mut self, key: i64, value: V) -> Result<bool, CollectionError> {
        self.insert(key, value, false)
    }

    fn insert(&mut self, key: i64, value: V, overwrite: bool) -> Result<bool, CollectionError> {
        let mut found = probe(self.table.slots()?, key);
        if let Probe::Hit(index) = found {
            if overwrite {
                self.table.set(index, Slot::Occupied { key, value })?;
            }
            return Ok(overwrite);
        }

        if self.over_load_limit() {
            self.rebuild_for_insert()?;
            found = probe(self.table.slots()?, key);
        }

        match found {
            Probe::Hit(index) => {
                self.table.set(index, Slot::Occupied { key, value })?;
                Ok(true)
            }
            Probe::Vacant { index, tombstone } => {
                self.table.set(index, Slot::Occupied { key, value })?;
                self.count += 1;
                if tombstone {
                    self.tombstones -= 1;
                }
                Ok(true)
            }
            Probe::Full => Err(CollectionError::CapacityExhausted {
                capacity: self.capacity(),
                count: self.count,
            }),
        }
    }

    /// Remove `key` and return its value, or [`CollectionError::KeyNotFound`].
    pub fn remove(&mut self, key: i64) -> Result<V, CollectionError> {
        let index = match probe(self.table.slots()?, key) {
            Probe::Hit(index) => index,
            _ => return Err(CollectionError::KeyNotFound { key }),
        };
        let value = match self.table.get(index)? {
            Slot::Occupied { value, .. } => value,
            _ => return Err(CollectionError::KeyNotFound { key }),
        };
        self.table.set(index, Slot::Tombstone)?;
        self.count -= 1;
        self.tombstones += 1;
        Ok(value)
    }

    /// Remove `key` if present. Never fails; `None` means nothing was
    /// removed.
    pub fn try_remove(&mut self, key: i64) -> Option<V> {
        self.remove(key).ok()
    }

    /// Remove every entry, keeping the current capacity.
    pub fn clear(&mut self) -> Result<(), CollectionError> {
        let capacity = self.capacity();
        self.table.clear(capacity)?;
        self.count = 0;
        self.tombstones = 0;
        Ok(())
    }

    /// Rebuild the table without tombstones, shrinking it while fewer than
    /// a quarter of the slots would be occupied (never below 16).
    ///
    /// Never runs implicitly with shrinking; inserts only compact in place.
    pub fn compact(&mut self) -> Result<(), CollectionError> {
        let mut target = self.table.slots()?.len();
        while target > MapConfig::MIN_CAPACITY && self.count * 4 < target {
            target /= 2;
        }
        self.rebuild(target)
    }

    /// Iterate live `(key, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, V)> + '_ {
        self.table
            .slots()
            .unwrap_or(&[])
            .iter()
            .filter_map(|slot| match *slot {
                Slot::Occupied { key, value } => Some((key, value)),
                _ => None,
            })
    }

    /// Iterate live keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Iterate live values in table order.
    pub fn values(&self) -> impl Iterator<Item = V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Current counters.
    pub fn stats(&self) -> MapStats {
        MapStats {
            capacity: self.capacity(),
            count: self.count,
            tombstones: self.tombstones,
            rebuilds: self.rebuilds,
            memory_bytes: self.table.memory_bytes(),
        }
    }

    /// Free the table now. Later direct operations report
    /// [`CollectionError::Released`]; `try_*` operations report absence.
    pub fn release(&mut self) -> Result<(), CollectionError> {
        self.table.release()?;
        self.count = 0;
        self.tombstones = 0;
        Ok(())
    }

    /// Whether [`release`](Self::release) has been called.
    pub fn is_released(&self) -> bool {
        self.table.is_released()
    }

    fn over_load_limit(&self) -> bool {
        let used = self.count + self.tombstones + 1;
        used * 100 > self.capacity() * self.config.max_load_percent as usize
    }

    /// Make room for one more key: compact when tombstones dominate, else
    /// double. At the size ceiling, drop tombstones once they fill at least
    /// `1 / CEILING_COMPACT_DIVISOR` of the table; below that, inserts keep
    /// reusing tombstones in place.
    fn rebuild_for_insert(&mut self) -> Result<(), CollectionError> {
        let capacity = self.capacity();
        let used = self.count + self.tombstones;
        let tombstone_heavy =
            self.tombstones * 100 > used * self.config.compact_tombstone_percent as usize;

        if tombstone_heavy {
            self.rebuild(capacity)
        } else if capacity < MapConfig::MAX_CAPACITY {
            self.rebuild(capacity * 2)
        } else if self.tombstones >= capacity / CEILING_COMPACT_DIVISOR {
            self.rebuild(capacity)
        } else {
            Ok(())
        }
    }

    /// Full rebuild into a fresh table of `new_capacity` slots.
    fn rebuild(&mut self, new_capacity: usize) -> Result<(), CollectionError> {
        debug_assert!(new_capacity.is_power_of_two());
        debug_assert!((MapConfig::MIN_CAPACITY..=MapConfig::MAX_CAPACITY).contains(&new_capacity));

        let mut fresh = MemoryBlock::<Slot<V>>::allocate(new_capacity);
        {
            let old = self.table.slots()?;
            let target = fresh.slots_mut()?;
            for slot in old {
                if let Slot::Occupied { key, value } = *slot {
                    match probe(target, key) {
                        Probe::Vacant { index, .. } => target[index] = Slot::Occupied { key, value },
                        Probe::Hit(_) | Probe::Full => {
                            return Err(CollectionError::CapacityExhausted {
                                capacity: new_capacity,
                                count: self.count,
                            })
                        }
                    }
                }
            }
        }
        self.table = fresh;
        self.tombstones = 0;
        self.rebuilds += 1;
        self.debug_check_unique_keys();
        Ok(())
    }

    #[cfg(debug_assertions)]
    fn debug_check_unique_keys(&self) {
        let mut seen = std::collections::HashSet::with_capacity(self.count);
        for key in self.keys() {
            assert!(seen.insert(key), "duplicate occupied key {key} in map table");
        }
        assert_eq!(seen.len(), self.count, "occupied slot count drifted");
    }

    #[cfg(not(debug_assertions))]
    fn debug_check_unique_keys(&self) {}
}

impl<V: Element> Default for OpenMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Element> Clone for OpenMap<V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            count: self.count,
            tombstones: self.tombstones,
            rebuilds: self.rebuilds,
            config: self.config.clone(),
        }
    }
}

impl<V: Element + fmt::Debug> fmt::Debug for OpenMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_keeps_single_entry() {
        let mut map = OpenMap::<u8>::new();
        map.set(5, b'a').unwrap();
        map.set(5, b'b').unwrap();
        assert_eq!(map.get(5).unwrap(), b'b');
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn default_map_doubles_past_seventy_percent() {
        let mut map = OpenMap::<u32>::new();
        assert_eq!(map.capacity(), 256);
        for key in 0..179 {
            map.set(key, key as u32).unwrap();
        }
        assert_eq!(map.capacity(), 256, "179 entries fit under the 70% limit");
        map.set(179, 179).unwrap();
        assert_eq!(map.capacity(), 512);
        assert_eq!(map.len(), 180);
        for key in 0..180 {
            assert_eq!(map.get(key).unwrap(), key as u32);
        }
    }

    #[test]
    fn try_remove_absent_is_noop() {
        let mut map = OpenMap::<i32>::new();
        map.set(1, 10).unwrap();
        assert_eq!(map.try_remove(99), None);
        assert_eq!(map.len(), 1);
        assert_eq!(map.tombstones(), 0);
    }

    #[test]
    fn get_missing_reports_not_found() {
        let map = OpenMap::<i32>::new();
        assert_eq!(map.get(3), Err(CollectionError::KeyNotFound { key: 3 }));
        assert_eq!(map.try_get(3), None);
    }

    #[test]
    fn lookup_skips_tombstones_in_chain() {
        let mut map = OpenMap::<u16>::with_capacity(16);
        // 1, 17 and 33 share bucket 1.
        map.set(1, 1).unwrap();
        map.set(17, 17).unwrap();
        map.set(33, 33).unwrap();
        map.remove(17).unwrap();
        assert_eq!(map.get(33).unwrap(), 33);
        assert!(!map.contains_key(17));
    }

    #[test]
    fn insert_reclaims_first_tombstone_in_chain() {
        let mut map = OpenMap::<u16>::with_capacity(16);
        map.set(1, 1).unwrap();
        map.set(17, 17).unwrap();
        map.set(33, 33).unwrap();
        map.remove(1).unwrap();
        assert_eq!(map.tombstones(), 1);
        map.set(49, 49).unwrap();
        assert_eq!(map.tombstones(), 0, "new key took the tombstone slot");
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn update_past_tombstone_does_not_duplicate() {
        let mut map = OpenMap::<u16>::with_capacity(16);
        map.set(1, 1).unwrap();
        map.set(17, 17).unwrap();
        map.remove(1).unwrap();
        // 17 lives after the tombstone: it must be overwritten, not re-added.
        map.set(17, 170).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.tombstones(), 1);
        assert_eq!(map.get(17).unwrap(), 170);
        assert_eq!(map.keys().filter(|&k| k == 17).count(), 1);
    }

    #[test]
    fn negative_keys_hash_into_table() {
        let mut map = OpenMap::<i64>::with_capacity(16);
        for key in -20..0 {
            map.set(key, key * 2).unwrap();
        }
        for key in -20..0 {
            assert_eq!(map.get(key).unwrap(), key * 2);
        }
    }

    #[test]
    fn tombstone_heavy_insert_compacts_in_place() {
        let mut map = OpenMap::<u32>::with_capacity(16);
        // 11 used slots is the limit for 16 at 70%.
        for key in 0..11 {
            map.set(key, 0).unwrap();
        }
        for key in 0..9 {
            map.remove(key).unwrap();
        }
        assert_eq!(map.tombstones(), 9);
        map.set(100, 1).unwrap();
        assert_eq!(map.capacity(), 16, "compaction, not growth");
        assert_eq!(map.tombstones(), 0);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn explicit_compact_shrinks_sparse_table() {
        let mut map = OpenMap::<u32>::with_capacity(1024);
        for key in 0..10 {
            map.set(key, key as u32).unwrap();
        }
        map.compact().unwrap();
        assert_eq!(map.capacity(), 32);
        for key in 0..10 {
            assert_eq!(map.get(key).unwrap(), key as u32);
        }
    }

    #[test]
    fn explicit_compact_never_goes_below_minimum() {
        let mut map = OpenMap::<u32>::with_capacity(64);
        map.compact().unwrap();
        assert_eq!(map.capacity(), 16);
    }

    #[test]
    fn try_add_refuses_existing_key() {
        let mut map = OpenMap::<u8>::new();
        assert!(map.try_add(4, 1).unwrap());
        assert!(!map.try_add(4, 2).unwrap());
        assert_eq!(map.get(4).unwrap(), 1);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut map = OpenMap::<u8>::with_capacity(16);
        for key in 0..30 {
            map.set(key, 1).unwrap();
        }
        let cap = map.capacity();
        map.remove(3).unwrap();
        map.clear().unwrap();
        assert_eq!(map.capacity(), cap);
        assert!(map.is_empty());
        assert_eq!(map.tombstones(), 0);
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn released_map_rejects_direct_access() {
        let mut map = OpenMap::<u8>::new();
        map.set(1, 1).unwrap();
        map.release().unwrap();
        assert_eq!(map.get(1), Err(CollectionError::Released));
        assert_eq!(map.set(1, 2), Err(CollectionError::Released));
        assert_eq!(map.try_get(1), None);
        assert_eq!(map.try_remove(1), None);
    }

    #[test]
    fn stats_count_rebuilds() {
        let mut map = OpenMap::<u8>::with_capacity(16);
        for key in 0..12 {
            map.set(key, 0).unwrap();
        }
        let stats = map.stats();
        assert_eq!(stats.capacity, 32);
        assert_eq!(stats.count, 12);
        assert_eq!(stats.rebuilds, 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MapConfig {
            max_load_percent: 0,
            ..MapConfig::default()
        };
        assert!(OpenMap::<u8>::with_config(config).is_err());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashMap;

        proptest! {
            #[test]
            fn matches_std_hashmap(
                ops in proptest::collection::vec((any::<bool>(), -200i64..200, any::<u32>()), 1..400),
            ) {
                let mut map = OpenMap::<u32>::with_capacity(16);
                let mut model = HashMap::new();
                for (insert, key, value) in ops {
                    if insert {
                        map.set(key, value).unwrap();
                        model.insert(key, value);
                    } else {
                        prop_assert_eq!(map.try_remove(key), model.remove(&key));
                    }
                    prop_assert_eq!(map.len(), model.len());
                }
                for (key, value) in &model {
                    prop_assert_eq!(map.try_get(*key), Some(*value));
                }
            }

            #[test]
            fn capacity_stays_power_of_two_in_range(
                keys in proptest::collection::vec(any::<i64>(), 0..600),
            ) {
                let mut map = OpenMap::<u8>::with_capacity(16);
                for (i, key) in keys.iter().enumerate() {
                    map.set(*key, 0).unwrap();
                    if i % 3 == 0 {
                        map.try_remove(*key);
                    }
                    let cap = map.capacity();
                    prop_assert!(cap.is_power_of_two());
                    prop_assert!((MapConfig::MIN_CAPACITY..=MapConfig::MAX_CAPACITY).contains(&cap));
                }
                map.compact().unwrap();
                prop_assert!(map.capacity().is_power_of_two());
                prop_assert!(map.capacity() >= MapConfig::MIN_CAPACITY);
            }
        }
    }
}
