//! Map sizing and load-factor parameters.

use burrow_core::CollectionError;

/// Configuration for an [`OpenMap`](crate::map::OpenMap).
///
/// Validated at construction; the map keeps its own copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapConfig {
    /// Requested initial table size.
    ///
    /// Default: 256. Rounded up to a power of two and clamped to
    /// `[MIN_CAPACITY, MAX_CAPACITY]`.
    pub initial_capacity: usize,

    /// Used-slot percentage (occupied plus tombstones) at which an insert
    /// first rebuilds the table.
    ///
    /// Default: 70. Must be in `1..=100`.
    pub max_load_percent: u8,

    /// Tombstone share of used slots above which a rebuild compacts in
    /// place instead of doubling.
    ///
    /// Default: 50. Must be in `1..=100`.
    pub compact_tombstone_percent: u8,
}

impl MapConfig {
    /// Smallest table size: 2^4.
    pub const MIN_CAPACITY: usize = 1 << 4;

    /// Largest table size: 2^20.
    pub const MAX_CAPACITY: usize = 1 << 20;

    /// Default initial table size: 2^8.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 1 << 8;

    /// Default rebuild threshold.
    pub const DEFAULT_MAX_LOAD_PERCENT: u8 = 70;

    /// Default compact-versus-grow threshold.
    pub const DEFAULT_COMPACT_TOMBSTONE_PERCENT: u8 = 50;

    /// Default parameters with the given initial capacity.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            ..Self::default()
        }
    }

    /// Smallest configuration that holds `entries` keys without a rebuild.
    pub fn for_entries(entries: usize) -> Self {
        let load = Self::DEFAULT_MAX_LOAD_PERCENT as usize;
        let needed = entries.saturating_mul(100) / load + 1;
        Self::with_capacity(needed)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), CollectionError> {
        if !(1..=100).contains(&self.max_load_percent) {
            return Err(CollectionError::invalid(format!(
                "max_load_percent must be in 1..=100, got {}",
                self.max_load_percent
            )));
        }
        if !(1..=100).contains(&self.compact_tombstone_percent) {
            return Err(CollectionError::invalid(format!(
                "compact_tombstone_percent must be in 1..=100, got {}",
                self.compact_tombstone_percent
            )));
        }
        Ok(())
    }

    /// The power-of-two table size actually used for `initial_capacity`.
    pub fn resolved_capacity(&self) -> usize {
        self.initial_capacity
            .clamp(Self::MIN_CAPACITY, Self::MAX_CAPACITY)
            .next_power_of_two()
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            max_load_percent: Self::DEFAULT_MAX_LOAD_PERCENT,
            compact_tombstone_percent: Self::DEFAULT_COMPACT_TOMBSTONE_PERCENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_256() {
        assert_eq!(MapConfig::default().resolved_capacity(), 256);
    }

    #[test]
    fn capacity_is_rounded_and_clamped() {
        assert_eq!(MapConfig::with_capacity(0).resolved_capacity(), 16);
        assert_eq!(MapConfig::with_capacity(100).resolved_capacity(), 128);
        assert_eq!(MapConfig::with_capacity(usize::MAX).resolved_capacity(), 1 << 20);
    }

    #[test]
    fn for_entries_fits_under_load_limit() {
        let config = MapConfig::for_entries(180);
        let cap = config.resolved_capacity();
        assert!(180 * 100 < cap * 70);
    }

    #[test]
    fn validate_rejects_out_of_range_percentages() {
        let mut config = MapConfig::default();
        config.max_load_percent = 0;
        assert!(config.validate().is_err());
        config.max_load_percent = 70;
        config.compact_tombstone_percent = 101;
        assert!(config.validate().is_err());
        config.compact_tombstone_percent = 50;
        assert!(config.validate().is_ok());
    }
}
