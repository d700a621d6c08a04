//! Expiring-store configuration.

use std::time::Duration;

use burrow_core::CollectionError;

/// Configuration for an [`ExpiringStore`](crate::expiring::ExpiringStore).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Pause between background sweeps.
    ///
    /// Default: 1 s. Must be non-zero.
    pub sweep_interval: Duration,

    /// Aggregate estimated size above which subscribers receive
    /// [`StoreEvent::MemoryThresholdExceeded`](crate::expiring::StoreEvent).
    ///
    /// Default: 64 MiB. Must be non-zero.
    pub memory_threshold_bytes: usize,

    /// Lifetime applied when an item is inserted without an explicit one.
    /// `None` keeps such items until they are removed.
    ///
    /// Default: `None`.
    pub default_ttl: Option<Duration>,
}

impl StoreConfig {
    /// Default sweep interval.
    pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

    /// Default memory threshold: 64 MiB.
    pub const DEFAULT_MEMORY_THRESHOLD_BYTES: usize = 64 << 20;

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), CollectionError> {
        if self.sweep_interval.is_zero() {
            return Err(CollectionError::invalid("sweep_interval must be non-zero"));
        }
        if self.memory_threshold_bytes == 0 {
            return Err(CollectionError::invalid(
                "memory_threshold_bytes must be non-zero",
            ));
        }
        if self.default_ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(CollectionError::invalid("default_ttl must be non-zero when set"));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Self::DEFAULT_SWEEP_INTERVAL,
            memory_threshold_bytes: Self::DEFAULT_MEMORY_THRESHOLD_BYTES,
            default_ttl: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(StoreConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_values_are_rejected() {
        let config = StoreConfig {
            sweep_interval: Duration::ZERO,
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());

        let config = StoreConfig {
            memory_threshold_bytes: 0,
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());

        let config = StoreConfig {
            default_ttl: Some(Duration::ZERO),
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
