//! Error types for backfill resources and configuration

use crate::ResourceRole;
use thiserror::Error;

/// Failures a backing resource may report from a read or a write.
///
/// Not-found is never an error: resources report it as `Ok(None)`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("{role} resource unavailable: {reason}")]
    Unavailable { role: ResourceRole, reason: String },

    #[error("Read from {role} resource failed: {reason}")]
    ReadFailed { role: ResourceRole, reason: String },

    #[error("Write to {role} resource failed: {reason}")]
    WriteFailed { role: ResourceRole, reason: String },

    #[error("Resource lock poisoned")]
    LockPoisoned,
}

impl ResourceError {
    /// The resource the failure concerns, if known.
    pub fn role(&self) -> Option<ResourceRole> {
        match self {
            ResourceError::Unavailable { role, .. }
            | ResourceError::ReadFailed { role, .. }
            | ResourceError::WriteFailed { role, .. } => Some(*role),
            ResourceError::LockPoisoned => None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {reason}")]
    Parse { reason: String },
}

/// Master error type for backfill errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackfillError {
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for backfill operations.
pub type BackfillResult<T> = Result<T, BackfillError>;

// =============================================================================
// TESTS
// =============================================================================
