//! Time-boxed value store with a background sweep.
//!
//! An [`ExpiringStore`] maps string keys to [`StoredRecord`]s. Records
//! past their expiry are invisible to reads immediately and are physically
//! evicted by [`sweep`](ExpiringStore::sweep), which either the caller or
//! the store's own sweep thread runs.
//!
//! # Threads
//!
//! [`ExpiringStore::start`] spawns exactly one thread, `burrow-sweep`, that
//! sweeps every [`sweep_interval`](StoreConfig::sweep_interval). It is
//! stopped by [`shutdown`](ExpiringStore::shutdown) or by dropping the
//! store: the stop channel is disconnected and the thread is joined before
//! either returns.
//!
//! # Events
//!
//! [`subscribe`](ExpiringStore::subscribe) hands out a channel receiving
//! [`StoreEvent`]s. The memory event fires once per upward crossing of
//! [`memory_threshold_bytes`](StoreConfig::memory_threshold_bytes) and is
//! re-armed when the estimate falls back to the threshold or below.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;

use burrow_core::{Clock, SystemClock};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::record::{ItemOptions, StoredRecord};

// ── Events and reports ───────────────────────────────────────────

/// Notification sent to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// The aggregate size estimate rose above the configured threshold.
    MemoryThresholdExceeded {
        /// Estimate after the insert that crossed the threshold.
        estimated_bytes: usize,
        /// The configured threshold.
        threshold: usize,
    },
    /// A sweep evicted an expired item.
    Evicted {
        /// Key of the evicted item.
        key: String,
    },
}

/// Counters describing a store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Items currently held, including expired ones not yet swept.
    pub items: usize,
    /// Sum of the items' size estimates.
    pub estimated_bytes: usize,
    /// Sweeps run so far, manual and background.
    pub sweeps: u64,
    /// Items evicted by sweeps.
    pub evicted: u64,
    /// Threshold events raised.
    pub threshold_events: u64,
}

/// Outcome of stopping the sweep thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Time spent stopping and joining the thread.
    pub total_ms: u64,
    /// Whether a running thread was joined cleanly. `false` if it
    /// panicked.
    pub sweeper_joined: bool,
    /// Whether a sweep thread was running at all.
    pub was_running: bool,
}

// ── Shared state ─────────────────────────────────────────────────

struct State<T> {
    items: IndexMap<String, StoredRecord<T>>,
    estimated_bytes: usize,
    threshold_armed: bool,
    subscribers: Vec<Sender<StoreEvent>>,
    stats: StoreStats,
}

impl<T> State<T> {
    fn emit(&mut self, event: StoreEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    fn check_threshold(&mut self, threshold: usize) {
        if self.estimated_bytes > threshold {
            if self.threshold_armed {
                self.threshold_armed = false;
                self.stats.threshold_events += 1;
                let estimated_bytes = self.estimated_bytes;
                self.emit(StoreEvent::MemoryThresholdExceeded {
                    estimated_bytes,
                    threshold,
                });
            }
        } else {
            self.threshold_armed = true;
        }
    }

    fn take(&mut self, key: &str) -> Option<StoredRecord<T>> {
        let record = self.items.shift_remove(key)?;
        self.estimated_bytes = self.estimated_bytes.saturating_sub(record.estimated_bytes);
        Some(record)
    }
}

struct Shared<T> {
    state: Mutex<State<T>>,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.lock();
        let expired: SmallVec<[String; 8]> = state
            .items
            .iter()
            .filter(|(_, record)| record.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            state.take(key);
            state.emit(StoreEvent::Evicted { key: key.clone() });
        }
        state.stats.sweeps += 1;
        state.stats.evicted += expired.len() as u64;
        state.check_threshold(self.config.memory_threshold_bytes);
        expired.len()
    }
}

fn sweep_loop<T>(shared: Arc<Shared<T>>, stop: Receiver<()>) {
    loop {
        match stop.recv_timeout(shared.config.sweep_interval) {
            Err(RecvTimeoutError::Timeout) => {
                shared.sweep();
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

struct Sweeper {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

fn stop_sweeper(sweeper: Option<Sweeper>) -> ShutdownReport {
    let start = Instant::now();
    let Some(Sweeper { stop, handle }) = sweeper else {
        return ShutdownReport {
            total_ms: 0,
            sweeper_joined: true,
            was_running: false,
        };
    };
    // Disconnecting wakes the thread out of its interval wait.
    drop(stop);
    let sweeper_joined = handle.join().is_ok();
    ShutdownReport {
        total_ms: start.elapsed().as_millis() as u64,
        sweeper_joined,
        was_running: true,
    }
}

// ── ExpiringStore ────────────────────────────────────────────────

/// A string-keyed store whose items expire.
///
/// All methods take `&self`; share the store with `Arc`.
pub struct ExpiringStore<T> {
    shared: Arc<Shared<T>>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl<T> ExpiringStore<T>
where
    T: Clone + Serialize + Send + 'static,
{
    /// Create a store that only sweeps when [`sweep`](Self::sweep) is
    /// called.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a manually swept store reading time from `clock`.
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    items: IndexMap::new(),
                    estimated_bytes: 0,
                    threshold_armed: true,
                    subscribers: Vec::new(),
                    stats: StoreStats::default(),
                }),
                clock,
                config,
            }),
            sweeper: Mutex::new(None),
        })
    }

    /// Create a store and start its background sweep thread.
    pub fn start(config: StoreConfig) -> Result<Self, StoreError> {
        let store = Self::new(config)?;
        store.start_sweeper()?;
        Ok(store)
    }

    /// Start the background sweep thread. A no-op if it is already
    /// running.
    pub fn start_sweeper(&self) -> Result<(), StoreError> {
        let mut sweeper = self.sweeper_slot();
        if sweeper.is_some() {
            return Ok(());
        }
        let (stop, stop_rx) = crossbeam_channel::bounded(1);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("burrow-sweep".into())
            .spawn(move || sweep_loop(shared, stop_rx))?;
        *sweeper = Some(Sweeper { stop, handle });
        Ok(())
    }

    /// Whether the background sweep thread is running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper_slot().is_some()
    }

    /// Stop and join the sweep thread. Safe to call repeatedly; the store
    /// stays usable with manual sweeps.
    pub fn shutdown(&self) -> ShutdownReport {
        let sweeper = self.sweeper_slot().take();
        stop_sweeper(sweeper)
    }

    fn sweeper_slot(&self) -> MutexGuard<'_, Option<Sweeper>> {
        self.sweeper.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The store's configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }

    fn now(&self) -> SystemTime {
        self.shared.clock.now()
    }

    /// Insert or replace `key` with a lifetime of `ttl`.
    pub fn insert(&self, key: impl Into<String>, value: T, ttl: Duration) -> Result<(), StoreError> {
        self.insert_with(key, value, ItemOptions::with_ttl(ttl))
    }

    /// Insert or replace `key` with explicit options.
    ///
    /// Without an explicit estimate, the item's size is the length of its
    /// JSON encoding plus its key and description. The store's running
    /// total saturates at `usize::MAX`. A lifetime too large to represent
    /// as a point in time never expires.
    pub fn insert_with(
        &self,
        key: impl Into<String>,
        value: T,
        options: ItemOptions,
    ) -> Result<(), StoreError> {
        let key = key.into();
        let estimated_bytes = match options.estimated_bytes {
            Some(bytes) => bytes,
            None => serde_json::to_vec(&value)?.len() + key.len() + options.description.len(),
        };
        let created_at = self.now();
        let ttl = options.ttl.or(self.shared.config.default_ttl);
        let record = StoredRecord {
            value,
            created_at,
            expires_at: ttl.and_then(|ttl| created_at.checked_add(ttl)),
            description: options.description,
            estimated_bytes,
            metadata: options.metadata,
        };

        let mut state = self.shared.lock();
        state.take(&key);
        state.estimated_bytes = state.estimated_bytes.saturating_add(estimated_bytes);
        state.items.insert(key, record);
        state.check_threshold(self.shared.config.memory_threshold_bytes);
        Ok(())
    }

    /// The value for `key`, unless absent or expired.
    pub fn get(&self, key: &str) -> Option<T> {
        self.get_record(key).map(|record| record.value)
    }

    /// The full record for `key`, unless absent or expired.
    pub fn get_record(&self, key: &str) -> Option<StoredRecord<T>> {
        let now = self.now();
        self.shared
            .lock()
            .items
            .get(key)
            .filter(|record| !record.is_expired(now))
            .cloned()
    }

    /// Whether `key` is present and not expired.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.now();
        self.shared
            .lock()
            .items
            .get(key)
            .is_some_and(|record| !record.is_expired(now))
    }

    /// Remove `key`, returning its value if it had not expired.
    pub fn remove(&self, key: &str) -> Option<T> {
        let now = self.now();
        let mut state = self.shared.lock();
        let record = state.take(key)?;
        state.check_threshold(self.shared.config.memory_threshold_bytes);
        (!record.is_expired(now)).then_some(record.value)
    }

    /// Push the expiry of a live `key` to `ttl` from now. Returns `false`
    /// if the key is absent or already expired.
    ///
    /// A `ttl` too large to represent as a point in time never expires.
    pub fn touch(&self, key: &str, ttl: Duration) -> bool {
        let now = self.now();
        let mut state = self.shared.lock();
        match state.items.get_mut(key) {
            Some(record) if !record.is_expired(now) => {
                record.expires_at = now.checked_add(ttl);
                true
            }
            _ => false,
        }
    }

    /// Evict every expired item now, returning how many were evicted.
    pub fn sweep(&self) -> usize {
        self.shared.sweep()
    }

    /// Items held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.shared.lock().items.len()
    }

    /// Whether the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the items' size estimates.
    pub fn estimated_bytes(&self) -> usize {
        self.shared.lock().estimated_bytes
    }

    /// Current counters.
    pub fn stats(&self) -> StoreStats {
        let state = self.shared.lock();
        StoreStats {
            items: state.items.len(),
            estimated_bytes: state.estimated_bytes,
            ..state.stats
        }
    }

    /// Receive future [`StoreEvent`]s. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.shared.lock().subscribers.push(tx);
        rx
    }
}

impl<T> Drop for ExpiringStore<T> {
    fn drop(&mut self) {
        let sweeper = self
            .sweeper
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if cfg!(debug_assertions) && sweeper.is_some() {
            eprintln!("burrow: ExpiringStore dropped with its sweep thread running; stopping it");
        }
        stop_sweeper(sweeper);
    }
}
