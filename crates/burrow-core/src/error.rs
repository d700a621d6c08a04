//! Error types shared by all Burrow containers.
//!
//! Every container reports failures through [`CollectionError`]. The
//! variants follow one taxonomy: precondition violations, missing or
//! duplicate keys, capacity exhaustion, and use after explicit release.
//! Precondition checks always run before any state is mutated, so a
//! container that returned an error is unchanged.

use std::error::Error;
use std::fmt;

/// Errors returned by arena-backed containers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionError {
    /// An index outside the live range `[0, len)` was accessed.
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The live length at the time of the access.
        len: usize,
    },
    /// An argument failed validation (zero count, bad range, bad config).
    InvalidArgument {
        /// Description of what was wrong.
        reason: String,
    },
    /// A required lookup found no live entry for the key.
    KeyNotFound {
        /// The missing key.
        key: i64,
    },
    /// A key that must be unique was supplied more than once.
    DuplicateKey {
        /// The repeated key.
        key: i64,
    },
    /// The map could not place an entry even after compacting and
    /// growing to its maximum capacity.
    ///
    /// This signals a capacity-ceiling defect in the caller, not a normal
    /// runtime condition.
    CapacityExhausted {
        /// Table capacity when placement failed.
        capacity: usize,
        /// Number of occupied entries when placement failed.
        count: usize,
    },
    /// The container's memory was explicitly released.
    Released,
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::KeyNotFound { key } => write!(f, "key {key} not found"),
            Self::DuplicateKey { key } => write!(f, "duplicate key {key}"),
            Self::CapacityExhausted { capacity, count } => {
                write!(
                    f,
                    "capacity exhausted: {count} entries in a table of {capacity} slots"
                )
            }
            Self::Released => write!(f, "container memory has been released"),
        }
    }
}

impl Error for CollectionError {}

impl CollectionError {
    /// Shorthand for an [`InvalidArgument`](Self::InvalidArgument) error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}
