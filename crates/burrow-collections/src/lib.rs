//! Arena-backed containers for Burrow.
//!
//! Every container here stores its elements in exclusively owned
//! [`MemoryBlock`](burrow_arena::MemoryBlock)s and never in a `Vec`:
//!
//! - [`GrowableArray`]: resizable sequence with positional insert and
//!   remove, and zero-copy [`ArrayView`]s over its live prefix.
//! - [`OpenMap`]: `i64`-keyed hash map with linear probing, tombstone
//!   deletion and full-rebuild resize/compact. [`FrozenMap`] is its
//!   build-once, read-only counterpart.
//! - [`SortedStore`]: key-sorted store over three parallel arrays with
//!   binary-search lookup, lazy deletion and batch removal.
//!
//! None of them are internally synchronised. Mutation takes `&mut self`;
//! wrap a container in a lock to share it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod array;
pub mod config;
pub mod frozen;
pub mod map;
pub mod slot;
pub mod sorted;
pub mod view;

pub use array::GrowableArray;
pub use config::MapConfig;
pub use frozen::FrozenMap;
pub use map::{MapStats, OpenMap};
pub use slot::Slot;
pub use sorted::SortedStore;
pub use view::{ArrayView, ArrayViewMut};
