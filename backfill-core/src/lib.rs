//! Backfill Core - Shared Types
//!
//! Vocabulary shared by every backfill crate: resource roles, the promotion
//! policy, error types, and cache configuration.
//! This crate contains no cache logic.

pub mod config;
pub mod enums;
pub mod error;

pub use config::{CacheConfig, DEFAULT_CACHE_NAME, ENV_CACHE_NAME, ENV_PROMOTION_POLICY};
pub use enums::{PromotionPolicy, PromotionPolicyParseError, ResourceRole};
pub use error::{BackfillError, BackfillResult, ConfigError, ResourceError};
