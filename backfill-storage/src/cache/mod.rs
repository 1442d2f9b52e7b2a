//! Read-through cache layer.
//!
//! This module provides a cache-aside lookup over two pluggable resources:
//! a fast primary and a slower secondary. Values found only in the secondary
//! are promoted into the primary on the way out.
//!
//! # Design Philosophy
//!
//! The cache owns no storage and no state. Everything it knows arrives at
//! construction: the two read handles, the primary write handle, and the two
//! accessor functions (or the [`ReadSource`]/[`WriteTarget`] traits standing
//! in for them). Not-found is `Ok(None)`; resource failures travel through
//! `Err` untouched.
//!
//! # Example
//!
//! ```ignore
//! let cache = ReadThroughCache::from_resources(&memory, &database, &memory);
//!
//! match cache.lookup(&key)? {
//!     LookupOutcome::Primary(v) => { /* fast path */ }
//!     LookupOutcome::Promoted(v) => { /* primary now holds v */ }
//!     LookupOutcome::Unpromoted(v) => { /* lenient policy, write failed */ }
//!     LookupOutcome::Absent => { /* neither resource has it */ }
//! }
//! ```

pub mod outcome;
pub mod read_through;
pub mod traits;

pub use outcome::{CacheStats, LookupOutcome};
pub use read_through::{ReadFn, ReadThroughCache, ResourceCache, WriteFn};
pub use traits::{ReadSource, WriteTarget};
