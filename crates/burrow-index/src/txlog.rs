//! Append-style change log keyed by external identifier.
//!
//! A [`TransactionLog`] records [`ChangeState::Add`], [`ChangeState::Change`]
//! and [`ChangeState::Remove`] events for [`EntityId`]s, in the order they
//! happen. Besides the ordered entries it keeps one [`OpenMap`] per state
//! from identifier to the latest [`LogKey`] of that state, so
//! [`latest`](TransactionLog::latest) is O(1).
//!
//! # Collapsing
//!
//! Entries for an identifier that was added during tracking are folded:
//!
//! - `Change` after a tracked `Add` rewrites the `Add` entry's data.
//! - `Remove` after a tracked `Add` cancels that `Add`. If it was the
//!   identifier's only entry, the identifier leaves the log entirely, since
//!   a row that was added and then removed has no net effect. Otherwise
//!   the `Remove` is appended after the earlier history.
//!
//! Entries recorded with [`record_start`](TransactionLog::record_start)
//! are baselines captured before tracking began. They never collapse.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use burrow_collections::OpenMap;
use burrow_core::{EntityId, LogKey, LogKeySequence};

use crate::error::StoreError;

/// Kind of change recorded for an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeState {
    /// The identifier appeared.
    Add,
    /// The identifier's data changed.
    Change,
    /// The identifier disappeared.
    Remove,
}

impl ChangeState {
    const ALL: [ChangeState; 3] = [ChangeState::Add, ChangeState::Change, ChangeState::Remove];

    fn slot(self) -> usize {
        match self {
            ChangeState::Add => 0,
            ChangeState::Change => 1,
            ChangeState::Remove => 2,
        }
    }
}

/// One recorded change.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry<D> {
    /// Position in the log.
    pub key: LogKey,
    /// The identifier the change applies to.
    pub id: EntityId,
    /// What happened.
    pub state: ChangeState,
    /// Payload captured with the change.
    pub data: D,
    /// Whether this is a baseline entry from before tracking began.
    pub start_data: bool,
}

struct Inner<D> {
    entries: IndexMap<LogKey, LogEntry<D>>,
    /// Per-state identifier → latest log key, indexed by [`ChangeState::slot`].
    latest: [OpenMap<u64>; 3],
}

impl<D> Inner<D> {
    fn latest_key(&self, id: EntityId, state: ChangeState) -> Option<LogKey> {
        self.latest[state.slot()].try_get(id.0).map(LogKey)
    }

    fn tracked_add(&self, id: EntityId) -> Option<LogKey> {
        let key = self.latest_key(id, ChangeState::Add)?;
        match self.entries.get(&key) {
            Some(entry) if !entry.start_data => Some(key),
            _ => None,
        }
    }

    fn only_entry(&self, id: EntityId, key: LogKey) -> bool {
        self.entries
            .values()
            .all(|entry| entry.id != id || entry.key == key)
    }

    /// Drop one entry, pointing its state's latest key back at the newest
    /// remaining entry of that state for the same identifier.
    fn drop_entry(&mut self, key: LogKey) -> Result<(), StoreError> {
        let Some(entry) = self.entries.shift_remove(&key) else {
            return Ok(());
        };
        let (id, state) = (entry.id, entry.state);
        let previous = self
            .entries
            .values()
            .rev()
            .find(|e| e.id == id && e.state == state)
            .map(|e| e.key);
        let latest = &mut self.latest[state.slot()];
        match previous {
            Some(previous) => latest.set(id.0, previous.0)?,
            None => {
                latest.try_remove(id.0);
            }
        }
        Ok(())
    }

    fn forget(&mut self, id: EntityId) -> usize {
        for map in &mut self.latest {
            map.try_remove(id.0);
        }
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.id != id);
        before - self.entries.len()
    }
}

/// A thread-safe, ordered change log.
///
/// Every mutation runs under one mutex. The "changed" flag is a separate
/// atomic so pollers can check it without taking the lock.
pub struct TransactionLog<D> {
    inner: Mutex<Inner<D>>,
    sequence: LogKeySequence,
    changed: AtomicBool,
}

impl<D: Clone> TransactionLog<D> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: IndexMap::new(),
                latest: [OpenMap::new(), OpenMap::new(), OpenMap::new()],
            }),
            sequence: LogKeySequence::new(),
            changed: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<D>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a change for `id`.
    ///
    /// Returns the key of the entry that now carries the change, or `None`
    /// when a `Remove` cancelled the identifier's only entry, a tracked
    /// `Add`, and the identifier left the log.
    pub fn record(
        &self,
        id: EntityId,
        state: ChangeState,
        data: D,
    ) -> Result<Option<LogKey>, StoreError> {
        let mut inner = self.lock();
        let folded = match state {
            ChangeState::Add => None,
            ChangeState::Change => inner.tracked_add(id).map(|key| {
                if let Some(entry) = inner.entries.get_mut(&key) {
                    entry.data = data.clone();
                }
                Some(key)
            }),
            ChangeState::Remove => match inner.tracked_add(id) {
                Some(add) if inner.only_entry(id, add) => {
                    inner.forget(id);
                    Some(None)
                }
                Some(add) => {
                    inner.drop_entry(add)?;
                    None
                }
                None => None,
            },
        };
        let result = match folded {
            Some(result) => result,
            None => Some(self.append(&mut inner, id, state, data, false)?),
        };
        self.changed.store(true, Ordering::Release);
        Ok(result)
    }

    /// Record a baseline `Add` for `id`, captured before tracking began.
    ///
    /// Baselines do not raise the changed flag and are never collapsed by
    /// later entries.
    pub fn record_start(&self, id: EntityId, data: D) -> Result<LogKey, StoreError> {
        let mut inner = self.lock();
        self.append(&mut inner, id, ChangeState::Add, data, true)
    }

    fn append(
        &self,
        inner: &mut Inner<D>,
        id: EntityId,
        state: ChangeState,
        data: D,
        start_data: bool,
    ) -> Result<LogKey, StoreError> {
        let key = self.sequence.next();
        inner.latest[state.slot()].set(id.0, key.0)?;
        inner.entries.insert(
            key,
            LogEntry {
                key,
                id,
                state,
                data,
                start_data,
            },
        );
        Ok(key)
    }

    /// Latest entry of kind `state` for `id`.
    pub fn latest(&self, id: EntityId, state: ChangeState) -> Option<LogEntry<D>> {
        let inner = self.lock();
        let key = inner.latest_key(id, state)?;
        inner.entries.get(&key).cloned()
    }

    /// All entries for `id`, oldest first.
    pub fn entries_for(&self, id: EntityId) -> Vec<LogEntry<D>> {
        self.lock()
            .entries
            .values()
            .filter(|entry| entry.id == id)
            .cloned()
            .collect()
    }

    /// Copy of the whole log, oldest first.
    pub fn entries(&self) -> Vec<LogEntry<D>> {
        self.lock().entries.values().cloned().collect()
    }

    /// Drop every entry for `id`, returning how many were removed.
    pub fn remove_identifier(&self, id: EntityId) -> usize {
        let removed = self.lock().forget(id);
        if removed > 0 {
            self.changed.store(true, Ordering::Release);
        }
        removed
    }

    /// Whether anything was recorded since the flag was last taken.
    pub fn has_changes(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }

    /// Read and reset the changed flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry and reset the changed flag. Keys keep
    /// increasing across a clear.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.entries.clear();
        for state in ChangeState::ALL {
            inner.latest[state.slot()].clear()?;
        }
        self.changed.store(false, Ordering::Release);
        Ok(())
    }
}

impl<D: Clone> Default for TransactionLog<D> {
    fn default() -> Self {
        Self::new()
    }
}
