//! Core types and traits for the Burrow collections library.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other Burrow crate: the
//! [`CollectionError`] taxonomy, strongly-typed identifiers, the
//! [`Element`] bound that arena-backed containers place on their payloads,
//! and the [`Clock`] that expiry decisions read time from.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod error;
pub mod id;
pub mod traits;

pub use clock::{Clock, SystemClock};
pub use error::CollectionError;
pub use id::{EntityId, LogKey, LogKeySequence};
pub use traits::Element;
