//! Burrow: collections over manually managed memory blocks.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Burrow sub-crates. For most users, adding `burrow` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use burrow::prelude::*;
//!
//! // Integer-keyed map: 180 inserts into the default 256-slot table
//! // cross the 70% load limit and double it.
//! let mut map = OpenMap::<u32>::new();
//! for key in 0..180 {
//!     map.set(key, key as u32 * 10).unwrap();
//! }
//! assert_eq!(map.capacity(), 512);
//! assert_eq!(map.try_get(42), Some(420));
//!
//! // Sorted store: keys come back in order regardless of insert order.
//! let mut store = SortedStore::<i64>::new();
//! store.add(3, 30).unwrap();
//! store.add(1, 10).unwrap();
//! store.add(2, 20).unwrap();
//! assert_eq!(store.keys().collect::<Vec<_>>(), vec![1, 2, 3]);
//!
//! // Growable array: capacity doubles, length is tracked separately.
//! let mut array = GrowableArray::<u16>::with_capacity(4);
//! for v in 0..5 {
//!     array.add(v).unwrap();
//! }
//! assert_eq!((array.len(), array.capacity()), (5, 8));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `burrow-core` | Errors, identifiers, `Element`, `Clock` |
//! | [`arena`] | `burrow-arena` | Raw `MemoryBlock` storage |
//! | [`collections`] | `burrow-collections` | Arrays, views, maps, sorted stores |
//! | [`index`] | `burrow-index` | Categorized index, transaction log, expiring store |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`burrow-core`).
///
/// Contains [`types::CollectionError`], the identifier newtypes and the
/// [`types::Element`] bound on container payloads.
pub use burrow_core as types;

/// Raw memory blocks (`burrow-arena`).
///
/// [`arena::MemoryBlock`] is the storage unit under every container. Most
/// users never touch it directly.
pub use burrow_arena as arena;

/// Arena-backed containers (`burrow-collections`).
///
/// [`collections::GrowableArray`], [`collections::OpenMap`],
/// [`collections::FrozenMap`] and [`collections::SortedStore`].
pub use burrow_collections as collections;

/// Synchronised indexes and stores (`burrow-index`).
///
/// [`index::CategorizedIndex`], [`index::TransactionLog`],
/// [`index::ExpiringStore`] and [`index::StoreRegistry`].
pub use burrow_index as index;

/// Common imports for typical Burrow usage.
///
/// ```rust
/// use burrow::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use burrow_core::{Clock, CollectionError, Element, EntityId, LogKey, SystemClock};

    // Containers
    pub use burrow_collections::{
        ArrayView, ArrayViewMut, FrozenMap, GrowableArray, MapConfig, OpenMap, SortedStore,
    };

    // Index layer
    pub use burrow_index::{
        CategorizedIndex, ChangeState, ExpiringStore, ItemOptions, StoreConfig, StoreError,
        StoreEvent, StoreRegistry, StoredRecord, TransactionLog,
    };
}
