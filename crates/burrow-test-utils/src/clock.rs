//! A clock that only moves when told to.

use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use burrow_core::Clock;

/// Manually advanced [`Clock`].
///
/// Starts at a fixed instant so expiry timestamps in tests are stable.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    /// 2020-01-01T00:00:00Z.
    pub const EPOCH_SECS: u64 = 1_577_836_800;

    pub fn new() -> Self {
        Self::starting_at(SystemTime::UNIX_EPOCH + Duration::from_secs(Self::EPOCH_SECS))
    }

    pub fn starting_at(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: SystemTime) {
        *self.now.lock().unwrap() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap()
    }
}
