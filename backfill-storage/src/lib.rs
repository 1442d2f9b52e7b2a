//! Backfill Storage - Read-Through Cache
//!
//! Generic cache-aside lookup over pluggable primary and secondary resources.
//! Concrete stores are supplied by the caller; see `backfill-test-utils` for
//! in-memory doubles.

pub mod cache;

pub use cache::{
    CacheStats, LookupOutcome, ReadFn, ReadSource, ReadThroughCache, ResourceCache, WriteFn,
    WriteTarget,
};

// Re-export shared types so callers need a single dependency
pub use backfill_core::{
    BackfillError, BackfillResult, CacheConfig, ConfigError, PromotionPolicy, ResourceError,
    ResourceRole,
};
