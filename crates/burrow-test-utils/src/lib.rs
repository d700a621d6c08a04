//! Test utilities for Burrow development.
//!
//! Provides seeded, reproducible key sets for property and integration
//! tests ([`keys`]) and a manually advanced [`ManualClock`] for
//! exercising expiry without sleeping.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod clock;
pub mod keys;

pub use clock::ManualClock;
pub use keys::{colliding_keys, distinct_keys, seeded_rng, shuffled};
