//! Configuration types
//!
//! A cache is configured from code via the builder methods, from environment
//! variables via [`CacheConfig::from_env`], or from a TOML document via
//! [`CacheConfig::from_toml_str`]. Every field has a default.

use crate::{ConfigError, PromotionPolicy};
use serde::{Deserialize, Serialize};

/// Environment variable holding the cache label used in tracing spans.
pub const ENV_CACHE_NAME: &str = "BACKFILL_CACHE_NAME";

/// Environment variable holding the promotion policy (`strict` or `lenient`).
pub const ENV_PROMOTION_POLICY: &str = "BACKFILL_PROMOTION_POLICY";

/// Default cache label.
pub const DEFAULT_CACHE_NAME: &str = "read_through";

/// Configuration for a read-through cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Label recorded on every lookup span.
    pub name: String,
    /// Treatment of a failed write into the primary resource.
    pub promotion_policy: PromotionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CACHE_NAME.to_string(),
            promotion_policy: PromotionPolicy::Strict,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the promotion policy.
    pub fn with_promotion_policy(mut self, policy: PromotionPolicy) -> Self {
        self.promotion_policy = policy;
        self
    }

    /// Create CacheConfig from environment variables.
    ///
    /// Environment variables:
    /// - `BACKFILL_CACHE_NAME`: span label (default: "read_through")
    /// - `BACKFILL_PROMOTION_POLICY`: "strict" or "lenient" (default: strict)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// Unset variables take their defaults; a set but unparseable policy is
    /// an error rather than a silent fallback.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(ENV_CACHE_NAME) {
            config.name = name.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_PROMOTION_POLICY) {
            config.promotion_policy =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    field: ENV_PROMOTION_POLICY.to_string(),
                    value: raw.clone(),
                    reason: "expected strict or lenient".to_string(),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a TOML document. Missing keys take defaults.
    ///
    /// The name is trimmed the same way [`from_lookup`](Self::from_lookup)
    /// trims it.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.name = config.name.trim().to_string();
        config.validate()?;
        Ok(config)
    }

    /// Check that the config is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "name".to_string(),
            });
        }
        Ok(())
    }
}
