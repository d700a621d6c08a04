//! Raw memory blocks for Burrow collections.
//!
//! Every Burrow container stores its elements in one or more
//! [`MemoryBlock`]s: contiguous, zero-initialised allocations of a single
//! fixed-size element type, obtained directly from the global allocator
//! rather than through `Vec`. This crate is the only one in the workspace
//! that contains `unsafe` code, and all of it lives in the private `raw`
//! module.
//!
//! # Architecture
//!
//! ```text
//! MemoryBlock<T> (public, safe, release-aware)
//! └── RawBuf<T> (private: alloc_zeroed / realloc / dealloc)
//! ```
//!
//! # Lifecycle
//!
//! - **Allocate:** zero-filled, fatal on allocator exhaustion.
//! - **Reallocate:** prefix preserved, tail zero-filled, may move.
//! - **Clear:** zero-fill a prefix in place.
//! - **Release:** explicit free; later access yields `Released`.
//!   Dropping an unreleased block frees it as well.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod block;
mod raw;

pub use block::{BlockStats, MemoryBlock};
