//! Lookup outcomes and caller-side statistics.
//!
//! [`LookupOutcome`] carries the value of a read-through lookup together with
//! where it was served from, so callers can tell a primary hit from a
//! promotion without the cache keeping any state of its own.

use backfill_core::ResourceRole;

/// Result of a read-through lookup, carrying provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome<V> {
    /// Found in the primary resource. Nothing else was consulted.
    Primary(V),
    /// Found in the secondary resource and written into the primary.
    Promoted(V),
    /// Found in the secondary resource; the write into the primary failed
    /// and was tolerated by a lenient promotion policy.
    Unpromoted(V),
    /// Found in neither resource.
    Absent,
}

impl<V> LookupOutcome<V> {
    /// Get a reference to the value, if one was found.
    pub fn value(&self) -> Option<&V> {
        match self {
            Self::Primary(v) | Self::Promoted(v) | Self::Unpromoted(v) => Some(v),
            Self::Absent => None,
        }
    }

    /// Consume the outcome and return the value, if one was found.
    pub fn into_value(self) -> Option<V> {
        match self {
            Self::Primary(v) | Self::Promoted(v) | Self::Unpromoted(v) => Some(v),
            Self::Absent => None,
        }
    }

    /// Returns true if either resource held the key.
    pub fn is_hit(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// The resource that supplied the value.
    pub fn served_from(&self) -> Option<ResourceRole> {
        match self {
            Self::Primary(_) => Some(ResourceRole::Primary),
            Self::Promoted(_) | Self::Unpromoted(_) => Some(ResourceRole::Secondary),
            Self::Absent => None,
        }
    }

    /// Returns true if the lookup wrote into the primary resource.
    pub fn wrote_primary(&self) -> bool {
        matches!(self, Self::Promoted(_))
    }
}

/// Statistics accumulated from lookup outcomes.
///
/// Owned by the caller; feed it every outcome you want counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served by the primary resource.
    pub primary_hits: u64,
    /// Lookups served by the secondary resource.
    pub secondary_hits: u64,
    /// Successful writes into the primary resource.
    pub promotions: u64,
    /// Tolerated write failures under a lenient policy.
    pub promotion_failures: u64,
    /// Lookups that found nothing.
    pub misses: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one lookup outcome.
    pub fn record<V>(&mut self, outcome: &LookupOutcome<V>) {
        match outcome {
            LookupOutcome::Primary(_) => self.primary_hits += 1,
            LookupOutcome::Promoted(_) => {
                self.secondary_hits += 1;
                self.promotions += 1;
            }
            LookupOutcome::Unpromoted(_) => {
                self.secondary_hits += 1;
                self.promotion_failures += 1;
            }
            LookupOutcome::Absent => self.misses += 1,
        }
    }

    /// Total number of recorded lookups.
    pub fn lookups(&self) -> u64 {
        self.primary_hits + self.secondary_hits + self.misses
    }

    /// Fraction of lookups that found a value in either resource (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            (self.primary_hits + self.secondary_hits) as f64 / total as f64
        }
    }

    /// Fraction of lookups served without touching the secondary resource.
    pub fn primary_hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.primary_hits as f64 / total as f64
        }
    }
}
