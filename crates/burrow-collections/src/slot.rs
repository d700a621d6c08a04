//! Tagged map slots.

#![allow(unsafe_code)]

use bytemuck::Zeroable;

/// One entry of an [`OpenMap`](crate::map::OpenMap) table.
///
/// The all-zero bit pattern is [`Slot::Empty`], so a freshly allocated or
/// cleared block is a table of empty slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C, u8)]
pub enum Slot<V> {
    /// Never used since the last rebuild. Terminates every probe chain.
    Empty,
    /// Holds a live entry.
    Occupied {
        /// The entry's key.
        key: i64,
        /// The entry's value.
        value: V,
    },
    /// A removed entry. Skipped by lookups, reclaimable by inserts, dropped
    /// by the next compact or resize.
    Tombstone,
}

// SAFETY: `Slot` is `repr(C, u8)` and `Empty` is its first variant, so its
// discriminant is 0 and the all-zero bit pattern is `Slot::Empty` (a
// fieldless variant places no requirements on the remaining bytes).
unsafe impl<V: Zeroable> Zeroable for Slot<V> {}

impl<V> Slot<V> {
    /// Whether the slot holds a live entry.
    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied { .. })
    }

    /// Whether the slot is a tombstone.
    pub fn is_tombstone(&self) -> bool {
        matches!(self, Self::Tombstone)
    }

    /// Whether the slot is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
