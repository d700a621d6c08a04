//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies an external entity tracked by a transaction log.
///
/// Typically a row identifier owned by a list-view-like consumer. The
/// value is opaque to Burrow; only equality and hashing are used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub i64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntityId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

/// Sequence number of a transaction log entry.
///
/// Allocated from a per-log [`LogKeySequence`], so keys are unique and
/// strictly increasing within one log. A higher key was recorded later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogKey(pub u64);

impl fmt::Display for LogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for LogKey {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Monotonic allocator for [`LogKey`]s.
///
/// Thread-safe; each call to [`next`](Self::next) returns a key that has
/// never been returned by this sequence before.
#[derive(Debug)]
pub struct LogKeySequence(AtomicU64);

impl LogKeySequence {
    /// Create a sequence whose first key is `LogKey(1)`.
    pub fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    /// Allocate the next key.
    pub fn next(&self) -> LogKey {
        LogKey(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for LogKeySequence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_strictly_increasing() {
        let seq = LogKeySequence::new();
        let a = seq.next();
        let b = seq.next();
        let c = seq.next();
        assert_eq!(a, LogKey(1));
        assert!(a < b && b < c);
    }

    #[test]
    fn entity_id_display() {
        assert_eq!(EntityId(-12).to_string(), "-12");
        assert_eq!(EntityId::from(3), EntityId(3));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;
        use std::sync::Arc;
        use std::thread;

        proptest! {
            #[test]
            fn keys_are_dense_and_increasing(n in 1usize..500) {
                let seq = LogKeySequence::new();
                let keys: Vec<_> = (0..n).map(|_| seq.next()).collect();
                prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
                prop_assert_eq!(keys[n - 1], LogKey(n as u64));
            }

            #[test]
            fn keys_unique_across_threads(threads in 2usize..6, per_thread in 1usize..200) {
                let seq = Arc::new(LogKeySequence::new());
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let seq = Arc::clone(&seq);
                        thread::spawn(move || {
                            let keys: Vec<_> = (0..per_thread).map(|_| seq.next()).collect();
                            assert!(keys.windows(2).all(|w| w[0] < w[1]));
                            keys
                        })
                    })
                    .collect();
                let mut seen = HashSet::new();
                for handle in handles {
                    for key in handle.join().unwrap() {
                        prop_assert!(seen.insert(key));
                    }
                }
                prop_assert_eq!(seen.len(), threads * per_thread);
            }
        }
    }
}
