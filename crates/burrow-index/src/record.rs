//! Stored items and their on-disk form.
//!
//! A [`StoredRecord`] wraps a payload with the metadata an
//! [`ExpiringStore`](crate::expiring::ExpiringStore) keeps for it: creation
//! time, optional expiry, a free-text description, an estimated size and an
//! open string-keyed metadata map. A single record can be saved to and
//! loaded from a JSON file; nothing else in Burrow persists.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, SystemTime};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A payload plus expiry and descriptive metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord<T> {
    /// The stored value.
    pub value: T,
    /// When the record was inserted.
    pub created_at: SystemTime,
    /// When the record stops being visible. `None` never expires.
    pub expires_at: Option<SystemTime>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Estimated memory footprint in bytes.
    pub estimated_bytes: usize,
    /// Caller-defined metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl<T> StoredRecord<T> {
    /// Whether the record has expired at `now`.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Time left before expiry at `now`. `None` for a record that never
    /// expires; zero once expired.
    pub fn remaining(&self, now: SystemTime) -> Option<Duration> {
        self.expires_at
            .map(|at| at.duration_since(now).unwrap_or(Duration::ZERO))
    }
}

impl<T: Serialize> StoredRecord<T> {
    /// Write the record to `path` as JSON, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let file = fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

impl<T: DeserializeOwned> StoredRecord<T> {
    /// Read a record previously written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let file = fs::File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Per-item options for
/// [`ExpiringStore::insert_with`](crate::expiring::ExpiringStore::insert_with).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemOptions {
    /// Lifetime of the item. `None` uses the store's default.
    pub ttl: Option<Duration>,
    /// Free-text description.
    pub description: String,
    /// Caller-defined metadata.
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Size estimate to use instead of measuring the encoded payload.
    pub estimated_bytes: Option<usize>,
}

impl ItemOptions {
    /// Options with only a lifetime set.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add one metadata entry.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Override the size estimate.
    pub fn estimated_bytes(mut self, bytes: usize) -> Self {
        self.estimated_bytes = Some(bytes);
        self
    }
}
