//! Backfill Test Utilities
//!
//! Centralized test infrastructure for the backfill workspace:
//! - In-memory mock stores with call counters and failure injection
//! - Proptest generators for keys, values, and lookup scenarios
//! - Test fixtures for common scenarios
//! - Custom assertions for lookup outcomes
//! - Tracing setup for tests

// Re-export the crates under test for convenience
pub use backfill_core::{
    CacheConfig, ConfigError, PromotionPolicy, ResourceError, ResourceRole,
};
pub use backfill_storage::{
    CacheStats, LookupOutcome, ReadSource, ReadThroughCache, ResourceCache, WriteTarget,
};

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use uuid::Uuid;

// ============================================================================
// TEST VALUE TYPE
// ============================================================================

/// Value type used throughout the scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Value {
    pub name: String,
}

impl Value {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Mock store keyed the way the scenarios key it.
pub type ValueStore = MockStore<Uuid, Value>;

// ============================================================================
// MOCK STORE
// ============================================================================

/// In-memory store for testing.
///
/// Counts every read and write attempt, records successful writes in order,
/// and can be switched to fail reads or writes.
#[derive(Debug)]
pub struct MockStore<K, V> {
    role: ResourceRole,
    entries: RwLock<HashMap<K, V>>,
    write_log: Mutex<Vec<(K, V)>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl<K, V> MockStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty store playing the given role.
    pub fn new(role: ResourceRole) -> Self {
        Self {
            role,
            entries: RwLock::new(HashMap::new()),
            write_log: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Create an empty primary store.
    pub fn primary() -> Self {
        Self::new(ResourceRole::Primary)
    }

    /// Create an empty secondary store.
    pub fn secondary() -> Self {
        Self::new(ResourceRole::Secondary)
    }

    /// Seed an entry without counting it as a write.
    pub fn with_entry(self, key: K, value: V) -> Self {
        self.seed(key, value);
        self
    }

    /// Make every read fail.
    pub fn failing_reads(self) -> Self {
        self.set_fail_reads(true);
        self
    }

    /// Make every write fail.
    pub fn failing_writes(self) -> Self {
        self.set_fail_writes(true);
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed an entry without counting it as a write.
    pub fn seed(&self, key: K, value: V) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }

    /// Peek at an entry without counting it as a read.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn role(&self) -> ResourceRole {
        self.role
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of read attempts, failed ones included.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write attempts, failed ones included.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Successful writes, in order.
    pub fn write_log(&self) -> Vec<(K, V)> {
        self.write_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read accessor in the shape the cache's get function expects.
    pub fn get_value(&self, key: &K) -> Result<Option<V>, ResourceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ResourceError::ReadFailed {
                role: self.role,
                reason: "injected read failure".to_string(),
            });
        }
        let entries = self.entries.read().map_err(|_| ResourceError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    /// Write accessor in the shape the cache's set function expects.
    pub fn set_value(&self, key: &K, value: &V) -> Result<(), ResourceError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ResourceError::WriteFailed {
                role: self.role,
                reason: "injected write failure".to_string(),
            });
        }
        self.entries
            .write()
            .map_err(|_| ResourceError::LockPoisoned)?
            .insert(key.clone(), value.clone());
        self.write_log
            .lock()
            .map_err(|_| ResourceError::LockPoisoned)?
            .push((key.clone(), value.clone()));
        Ok(())
    }
}

impl<K, V> ReadSource<K, V> for MockStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    type Error = ResourceError;

    fn read(&self, key: &K) -> Result<Option<V>, ResourceError> {
        self.get_value(key)
    }
}

impl<K, V> WriteTarget<K, V> for MockStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    type Error = ResourceError;

    fn write(&self, key: &K, value: &V) -> Result<(), ResourceError> {
        self.set_value(key, value)
    }
}

// ============================================================================
// TRACING
// ============================================================================

/// Install a fmt subscriber that writes through the test harness.
///
/// Honors `RUST_LOG`; defaults to trace output for the cache crate. Safe to
/// call from every test.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("backfill_storage=trace,warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for keys, values, and lookup scenarios.

    use super::*;
    use proptest::prelude::*;

    /// Generate a random UUID key.
    pub fn arb_key() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Generate a value. Empty names are included: they are present values.
    pub fn arb_value() -> impl Strategy<Value = Value> {
        "[a-z0-9]{0,12}".prop_map(Value::new)
    }

    /// Generate what each resource holds for a single key.
    pub fn arb_scenario() -> impl Strategy<Value = Scenario> {
        (
            arb_key(),
            proptest::option::of(arb_value()),
            proptest::option::of(arb_value()),
        )
            .prop_map(|(key, primary, secondary)| Scenario {
                key,
                primary,
                secondary,
            })
    }

    /// Generate a scenario where only the secondary resource holds the key.
    pub fn arb_secondary_only_scenario() -> impl Strategy<Value = Scenario> {
        (arb_key(), arb_value()).prop_map(|(key, value)| Scenario {
            key,
            primary: None,
            secondary: Some(value),
        })
    }

    /// Placement of a key across the two resources.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Scenario {
        pub key: Uuid,
        pub primary: Option<Value>,
        pub secondary: Option<Value>,
    }

    impl Scenario {
        /// Seed both stores without counting the writes.
        pub fn seed(&self, primary: &ValueStore, secondary: &ValueStore) {
            if let Some(value) = &self.primary {
                primary.seed(self.key, value.clone());
            }
            if let Some(value) = &self.secondary {
                secondary.seed(self.key, value.clone());
            }
        }

        /// The value a lookup must return.
        pub fn expected(&self) -> Option<Value> {
            self.primary.clone().or_else(|| self.secondary.clone())
        }

        /// Whether a lookup must promote.
        pub fn expects_promotion(&self) -> bool {
            self.primary.is_none() && self.secondary.is_some()
        }
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// A fresh timestamp-sortable key.
    pub fn new_key() -> Uuid {
        Uuid::now_v7()
    }

    /// A value with the given name.
    pub fn value(name: &str) -> Value {
        Value::new(name)
    }

    /// Primary store holding `{name}` under `key`.
    pub fn primary_with(key: Uuid, name: &str) -> ValueStore {
        ValueStore::primary().with_entry(key, value(name))
    }

    /// Secondary store holding `{name}` under `key`.
    pub fn secondary_with(key: Uuid, name: &str) -> ValueStore {
        ValueStore::secondary().with_entry(key, value(name))
    }

    /// Config using the lenient promotion policy.
    pub fn lenient_config() -> CacheConfig {
        CacheConfig::new()
            .with_name("lenient-test")
            .with_promotion_policy(PromotionPolicy::Lenient)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for lookup outcomes and store traffic.

    use super::*;
    use std::fmt::Debug;

    /// Assert that the lookup was served by the primary resource.
    #[track_caller]
    pub fn assert_primary_hit<V: PartialEq + Debug>(outcome: &LookupOutcome<V>, expected: &V) {
        match outcome {
            LookupOutcome::Primary(v) => assert_eq!(v, expected, "Wrong primary value"),
            other => panic!("Expected primary hit, got: {:?}", other),
        }
    }

    /// Assert that the lookup promoted a secondary value.
    #[track_caller]
    pub fn assert_promoted<V: PartialEq + Debug>(outcome: &LookupOutcome<V>, expected: &V) {
        match outcome {
            LookupOutcome::Promoted(v) => assert_eq!(v, expected, "Wrong promoted value"),
            other => panic!("Expected promotion, got: {:?}", other),
        }
    }

    /// Assert that the lookup found nothing.
    #[track_caller]
    pub fn assert_absent<V: Debug>(outcome: &LookupOutcome<V>) {
        assert!(
            matches!(outcome, LookupOutcome::Absent),
            "Expected absent, got: {:?}",
            outcome
        );
    }

    /// Assert that a store was never read from or written to.
    #[track_caller]
    pub fn assert_untouched<K, V>(store: &MockStore<K, V>)
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        assert_eq!(store.reads(), 0, "Expected no reads on {} store", store.role());
        assert_eq!(store.writes(), 0, "Expected no writes on {} store", store.role());
    }

    /// Assert that a store received no write attempts.
    #[track_caller]
    pub fn assert_no_writes<K, V>(store: &MockStore<K, V>)
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        assert_eq!(store.writes(), 0, "Expected no writes on {} store", store.role());
    }

    /// Assert that a result is a resource error concerning `role`.
    #[track_caller]
    pub fn assert_resource_error<T: Debug>(result: &Result<T, ResourceError>, role: ResourceRole) {
        match result {
            Err(err) => assert_eq!(err.role(), Some(role), "Wrong role in {:?}", err),
            Ok(value) => panic!("Expected {} resource error, got Ok({:?})", role, value),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
