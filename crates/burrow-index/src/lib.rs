//! Indexes, change logs and expiring stores for Burrow.
//!
//! The coordination layer above the raw containers:
//!
//! - [`CategorizedIndex`]: thread-safe key → (category, value) index with
//!   a category → key-set inverse, returning snapshot copies.
//! - [`TransactionLog`]: ordered Add/Change/Remove log per external
//!   identifier with O(1) "latest entry of kind X" lookup, backed by
//!   [`OpenMap`](burrow_collections::OpenMap)s.
//! - [`ExpiringStore`]: time-boxed values with metadata, a background
//!   sweep thread and memory-threshold events.
//! - [`StoreRegistry`]: explicitly constructed, type-keyed set of shared
//!   expiring stores.
//!
//! # Threads
//!
//! The only thread in the workspace is an expiring store's sweep thread.
//! It is joined on [`ExpiringStore::shutdown`], on
//! [`StoreRegistry::shutdown_all`], or when the store is dropped.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod categorized;
pub mod config;
pub mod error;
pub mod expiring;
pub mod record;
pub mod registry;
pub mod txlog;

pub use categorized::CategorizedIndex;
pub use config::StoreConfig;
pub use error::StoreError;
pub use expiring::{ExpiringStore, ShutdownReport, StoreEvent, StoreStats};
pub use record::{ItemOptions, StoredRecord};
pub use registry::StoreRegistry;
pub use txlog::{ChangeState, LogEntry, TransactionLog};
