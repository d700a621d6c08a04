//! Error types for the index and store layer.

use std::error::Error;
use std::fmt;
use std::io;

use burrow_core::CollectionError;

/// Errors returned by indexes, logs and expiring stores.
#[derive(Debug)]
pub enum StoreError {
    /// A key that must be unique is already present.
    DuplicateKey {
        /// Debug rendering of the key.
        key: String,
    },
    /// A required key is absent.
    KeyNotFound {
        /// Debug rendering of the key.
        key: String,
    },
    /// An underlying container failed.
    Collection(CollectionError),
    /// Reading or writing a record file failed, or the sweep thread could
    /// not be spawned.
    Io(io::Error),
    /// A record could not be encoded or decoded.
    Format(serde_json::Error),
}

impl StoreError {
    pub(crate) fn duplicate(key: &impl fmt::Debug) -> Self {
        Self::DuplicateKey {
            key: format!("{key:?}"),
        }
    }

    pub(crate) fn not_found(key: &impl fmt::Debug) -> Self {
        Self::KeyNotFound {
            key: format!("{key:?}"),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey { key } => write!(f, "duplicate key {key}"),
            Self::KeyNotFound { key } => write!(f, "key {key} not found"),
            Self::Collection(e) => write!(f, "collection error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Format(e) => write!(f, "record format error: {e}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Collection(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Format(e) => Some(e),
            Self::DuplicateKey { .. } | Self::KeyNotFound { .. } => None,
        }
    }
}

impl From<CollectionError> for StoreError {
    fn from(e: CollectionError) -> Self {
        Self::Collection(e)
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Format(e)
    }
}
