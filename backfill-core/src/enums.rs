//! Enum types shared across backfill crates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// RESOURCE ROLES
// ============================================================================

/// Which backing resource a read, write, or failure concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceRole {
    /// The fast resource consulted first and repopulated on promotion.
    Primary,
    /// The fallback resource consulted only on a primary miss.
    Secondary,
}

impl ResourceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceRole::Primary => "primary",
            ResourceRole::Secondary => "secondary",
        }
    }
}

impl fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PROMOTION POLICY
// ============================================================================

/// How a failed write into the primary resource is treated during promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionPolicy {
    /// The write failure is returned to the caller; the lookup fails.
    #[default]
    Strict,
    /// The write failure is logged and the secondary value is still returned.
    Lenient,
}

impl PromotionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionPolicy::Strict => "strict",
            PromotionPolicy::Lenient => "lenient",
        }
    }

    /// Returns true if promotion failures are propagated to the caller.
    pub fn is_strict(&self) -> bool {
        matches!(self, PromotionPolicy::Strict)
    }
}

impl fmt::Display for PromotionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromotionPolicy {
    type Err = PromotionPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(PromotionPolicy::Strict),
            "lenient" => Ok(PromotionPolicy::Lenient),
            _ => Err(PromotionPolicyParseError(s.to_string())),
        }
    }
}

/// Error when parsing an invalid promotion policy string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionPolicyParseError(pub String);

impl fmt::Display for PromotionPolicyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid promotion policy: {}", self.0)
    }
}

impl std::error::Error for PromotionPolicyParseError {}
