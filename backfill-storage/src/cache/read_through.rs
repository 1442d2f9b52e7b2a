//! Read-through cache over a primary and a secondary resource.
//!
//! A lookup consults the primary resource first. On a miss it falls back to
//! the secondary resource and, if the key is found there, promotes the value
//! into the primary resource so later lookups hit it directly.

use std::any::type_name;
use std::fmt;

use backfill_core::{CacheConfig, ResourceRole};
use tracing::{debug, debug_span, trace, warn};

use super::outcome::LookupOutcome;
use super::traits::{ReadSource, WriteTarget};

/// Accessor reading a value for a key from a read handle.
pub type ReadFn<R, K, V, E> = fn(&R, &K) -> Result<Option<V>, E>;

/// Accessor writing a key/value pair through a write handle.
pub type WriteFn<W, K, V, E> = fn(&W, &K, &V) -> Result<(), E>;

/// A cache whose accessors are the [`ReadSource`] and [`WriteTarget`] methods.
pub type ResourceCache<K, V, R, W> = ReadThroughCache<
    R,
    W,
    ReadFn<R, K, V, <R as ReadSource<K, V>>::Error>,
    WriteFn<W, K, V, <R as ReadSource<K, V>>::Error>,
>;

/// Read-through cache composed from externally supplied resources.
///
/// # Type Parameters
///
/// - `R`: handle type of both read resources (primary and secondary)
/// - `W`: handle type of the primary write resource
/// - `G`: get accessor, `Fn(&R, &K) -> Result<Option<V>, E>`
/// - `S`: set accessor, `Fn(&W, &K, &V) -> Result<(), E>`
///
/// The cache stores no entries and holds no mutable state; every lookup is
/// an independent pass over the resources. It adds no locking, so it is
/// `Send`/`Sync` exactly when the collaborators are.
///
/// # Example
///
/// ```ignore
/// let cache = ReadThroughCache::new(
///     &memory,
///     &database,
///     &memory,
///     |store: &Store, key: &Uuid| store.get_value(key),
///     |store: &Store, key: &Uuid, value: &Value| store.set_value(key, value),
/// );
///
/// let value = cache.get_data_by_key(&key)?;
/// ```
#[derive(Clone)]
pub struct ReadThroughCache<R, W, G, S> {
    /// Fast resource consulted first.
    primary: R,
    /// Fallback resource consulted on a primary miss.
    secondary: R,
    /// Write handle for promotions into the primary resource.
    primary_writer: W,
    get_fn: G,
    set_fn: S,
    config: CacheConfig,
}

impl<R, W, G, S> ReadThroughCache<R, W, G, S> {
    /// Create a new read-through cache with the default configuration.
    pub fn new(primary: R, secondary: R, primary_writer: W, get_fn: G, set_fn: S) -> Self {
        Self {
            primary,
            secondary,
            primary_writer,
            get_fn,
            set_fn,
            config: CacheConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a reference to the primary read resource.
    pub fn primary(&self) -> &R {
        &self.primary
    }

    /// Get a reference to the secondary read resource.
    pub fn secondary(&self) -> &R {
        &self.secondary
    }

    /// Get a reference to the primary write resource.
    pub fn primary_writer(&self) -> &W {
        &self.primary_writer
    }

    /// Get the value for `key`, promoting it from the secondary resource on a
    /// primary miss.
    ///
    /// Returns `Ok(None)` when neither resource holds the key. Errors from the
    /// accessors are returned unchanged. A failed promotion is an error under
    /// the strict policy even though the value was found.
    pub fn get_data_by_key<K, V, E>(&self, key: &K) -> Result<Option<V>, E>
    where
        G: Fn(&R, &K) -> Result<Option<V>, E>,
        S: Fn(&W, &K, &V) -> Result<(), E>,
    {
        self.lookup(key).map(LookupOutcome::into_value)
    }

    /// Same pass as [`get_data_by_key`](Self::get_data_by_key), reporting
    /// which resource served the value and whether it was promoted.
    ///
    /// The error type is opaque to the cache, so a tolerated promotion
    /// failure is logged by error type only.
    pub fn lookup<K, V, E>(&self, key: &K) -> Result<LookupOutcome<V>, E>
    where
        G: Fn(&R, &K) -> Result<Option<V>, E>,
        S: Fn(&W, &K, &V) -> Result<(), E>,
    {
        let span = debug_span!("read_through.lookup", cache = %self.config.name);
        let _enter = span.enter();

        if let Some(value) = (self.get_fn)(&self.primary, key)? {
            trace!(served_from = %ResourceRole::Primary, "primary hit");
            return Ok(LookupOutcome::Primary(value));
        }

        let Some(value) = (self.get_fn)(&self.secondary, key)? else {
            trace!("miss in both resources");
            return Ok(LookupOutcome::Absent);
        };

        match (self.set_fn)(&self.primary_writer, key, &value) {
            Ok(()) => {
                debug!(served_from = %ResourceRole::Secondary, "promoted into primary");
                Ok(LookupOutcome::Promoted(value))
            }
            Err(_) if !self.config.promotion_policy.is_strict() => {
                warn!(
                    error_type = type_name::<E>(),
                    policy = %self.config.promotion_policy,
                    "promotion into primary failed, serving secondary value"
                );
                Ok(LookupOutcome::Unpromoted(value))
            }
            Err(e) => Err(e),
        }
    }
}

impl<R, W, K, V, E> ReadThroughCache<R, W, ReadFn<R, K, V, E>, WriteFn<W, K, V, E>>
where
    R: ReadSource<K, V, Error = E>,
    W: WriteTarget<K, V, Error = E>,
{
    /// Create a cache whose accessors are the resources' own trait methods.
    pub fn from_resources(primary: R, secondary: R, primary_writer: W) -> Self {
        let get_fn: ReadFn<R, K, V, E> = read_resource::<R, K, V>;
        let set_fn: WriteFn<W, K, V, E> = write_resource::<W, K, V>;
        Self::new(primary, secondary, primary_writer, get_fn, set_fn)
    }
}

fn read_resource<R, K, V>(resource: &R, key: &K) -> Result<Option<V>, R::Error>
where
    R: ReadSource<K, V>,
{
    resource.read(key)
}

fn write_resource<W, K, V>(resource: &W, key: &K, value: &V) -> Result<(), W::Error>
where
    W: WriteTarget<K, V>,
{
    resource.write(key, value)
}

impl<R, W, G, S> fmt::Debug for ReadThroughCache<R, W, G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadThroughCache")
            .field("primary", &type_name::<R>())
            .field("secondary", &type_name::<R>())
            .field("primary_writer", &type_name::<W>())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backfill_core::{PromotionPolicy, ResourceError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::RwLock;

    // Mock resource for testing: a map with call counters and a failure switch
    struct MockResource {
        role: ResourceRole,
        entries: RwLock<HashMap<u32, String>>,
        reads: AtomicUsize,
        writes: AtomicUsize,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl MockResource {
        fn new(role: ResourceRole) -> Self {
            Self {
                role,
                entries: RwLock::new(HashMap::new()),
                reads: AtomicUsize::new(0),
                writes: AtomicUsize::new(0),
                fail_reads: false,
                fail_writes: false,
            }
        }

        fn with_entry(self, key: u32, value: &str) -> Self {
            self.entries.write().unwrap().insert(key, value.to_string());
            self
        }

        fn failing_reads(mut self) -> Self {
            self.fail_reads = true;
            self
        }

        fn failing_writes(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        fn get_value(&self, key: &u32) -> Result<Option<String>, ResourceError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads {
                return Err(ResourceError::ReadFailed {
                    role: self.role,
                    reason: "injected".to_string(),
                });
            }
            Ok(self.entries.read().unwrap().get(key).cloned())
        }

        fn set_value(&self, key: &u32, value: &String) -> Result<(), ResourceError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(ResourceError::WriteFailed {
                    role: self.role,
                    reason: "injected".to_string(),
                });
            }
            self.entries.write().unwrap().insert(*key, value.clone());
            Ok(())
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl ReadSource<u32, String> for MockResource {
        type Error = ResourceError;

        fn read(&self, key: &u32) -> Result<Option<String>, ResourceError> {
            self.get_value(key)
        }
    }

    impl WriteTarget<u32, String> for MockResource {
        type Error = ResourceError;

        fn write(&self, key: &u32, value: &String) -> Result<(), ResourceError> {
            self.set_value(key, value)
        }
    }

    fn get(resource: &&MockResource, key: &u32) -> Result<Option<String>, ResourceError> {
        resource.get_value(key)
    }

    fn set(resource: &&MockResource, key: &u32, value: &String) -> Result<(), ResourceError> {
        resource.set_value(key, value)
    }

    #[test]
    fn test_primary_hit_skips_secondary_and_writer() {
        let primary = MockResource::new(ResourceRole::Primary).with_entry(1, "name1");
        let secondary = MockResource::new(ResourceRole::Secondary).with_entry(1, "name1");
        let cache = ReadThroughCache::new(&primary, &secondary, &primary, get, set);

        let result = cache.get_data_by_key(&1).unwrap();

        assert_eq!(result, Some("name1".to_string()));
        assert_eq!(primary.reads(), 1);
        assert_eq!(secondary.reads(), 0);
        assert_eq!(primary.writes(), 0);
    }

    #[test]
    fn test_secondary_hit_promotes_once() {
        let primary = MockResource::new(ResourceRole::Primary);
        let secondary = MockResource::new(ResourceRole::Secondary).with_entry(3, "name3");
        let cache = ReadThroughCache::new(&primary, &secondary, &primary, get, set);

        let outcome = cache.lookup(&3).unwrap();

        assert_eq!(outcome, LookupOutcome::Promoted("name3".to_string()));
        assert_eq!(primary.writes(), 1);
        assert_eq!(
            primary.entries.read().unwrap().get(&3),
            Some(&"name3".to_string())
        );
    }

    #[test]
    fn test_promoted_key_hits_primary_next_time() {
        let primary = MockResource::new(ResourceRole::Primary);
        let secondary = MockResource::new(ResourceRole::Secondary).with_entry(4, "name4");
        let cache = ReadThroughCache::new(&primary, &secondary, &primary, get, set);

        assert!(cache.lookup(&4).unwrap().wrote_primary());
        let second = cache.lookup(&4).unwrap();

        assert_eq!(second, LookupOutcome::Primary("name4".to_string()));
        assert_eq!(secondary.reads(), 1);
        assert_eq!(primary.writes(), 1);
    }

    #[test]
    fn test_total_miss_returns_none_without_writing() {
        let primary = MockResource::new(ResourceRole::Primary);
        let secondary = MockResource::new(ResourceRole::Secondary);
        let cache = ReadThroughCache::new(&primary, &secondary, &primary, get, set);

        assert_eq!(cache.get_data_by_key(&9).unwrap(), None);
        assert_eq!(secondary.reads(), 1);
        assert_eq!(primary.writes(), 0);
    }

    #[test]
    fn test_primary_read_failure_aborts_before_secondary() {
        let primary = MockResource::new(ResourceRole::Primary).failing_reads();
        let secondary = MockResource::new(ResourceRole::Secondary).with_entry(1, "x");
        let cache = ReadThroughCache::new(&primary, &secondary, &primary, get, set);

        let err = cache.get_data_by_key(&1).unwrap_err();

        assert_eq!(err.role(), Some(ResourceRole::Primary));
        assert_eq!(secondary.reads(), 0);
        assert_eq!(primary.writes(), 0);
    }

    #[test]
    fn test_secondary_read_failure_aborts_before_write() {
        let primary = MockResource::new(ResourceRole::Primary);
        let secondary = MockResource::new(ResourceRole::Secondary).failing_reads();
        let cache = ReadThroughCache::new(&primary, &secondary, &primary, get, set);

        let err = cache.get_data_by_key(&1).unwrap_err();

        assert!(matches!(err, ResourceError::ReadFailed { role: ResourceRole::Secondary, .. }));
        assert_eq!(primary.writes(), 0);
    }

    #[test]
    fn test_strict_policy_propagates_write_failure() {
        let reader = MockResource::new(ResourceRole::Primary);
        let writer = MockResource::new(ResourceRole::Primary).failing_writes();
        let secondary = MockResource::new(ResourceRole::Secondary).with_entry(5, "name5");
        let cache = ReadThroughCache::new(&reader, &secondary, &writer, get, set);

        let err = cache.get_data_by_key(&5).unwrap_err();

        assert!(matches!(err, ResourceError::WriteFailed { .. }));
        assert_eq!(writer.writes(), 1);
    }

    #[test]
    fn test_lenient_policy_serves_value_on_write_failure() {
        let reader = MockResource::new(ResourceRole::Primary);
        let writer = MockResource::new(ResourceRole::Primary).failing_writes();
        let secondary = MockResource::new(ResourceRole::Secondary).with_entry(5, "name5");
        let cache = ReadThroughCache::new(&reader, &secondary, &writer, get, set).with_config(
            CacheConfig::new().with_promotion_policy(PromotionPolicy::Lenient),
        );

        let outcome = cache.lookup(&5).unwrap();

        assert_eq!(outcome, LookupOutcome::Unpromoted("name5".to_string()));
        assert!(!outcome.wrote_primary());
    }

    #[test]
    fn test_lenient_policy_still_propagates_read_failure() {
        let primary = MockResource::new(ResourceRole::Primary);
        let secondary = MockResource::new(ResourceRole::Secondary).failing_reads();
        let cache = ReadThroughCache::new(&primary, &secondary, &primary, get, set).with_config(
            CacheConfig::new().with_promotion_policy(PromotionPolicy::Lenient),
        );

        assert!(cache.lookup(&1).is_err());
    }

    // Error type with neither Display nor Error
    #[derive(Debug, PartialEq)]
    struct Opaque(u8);

    #[test]
    fn test_accessor_errors_need_no_display() {
        let primary: RwLock<HashMap<u32, String>> = RwLock::new(HashMap::new());
        let secondary: RwLock<HashMap<u32, String>> =
            RwLock::new(HashMap::from([(1, "name1".to_string())]));
        let cache = ReadThroughCache::new(
            &primary,
            &secondary,
            &primary,
            |store: &&RwLock<HashMap<u32, String>>, key: &u32| -> Result<Option<String>, Opaque> {
                Ok(store.read().unwrap().get(key).cloned())
            },
            |_: &&RwLock<HashMap<u32, String>>, _: &u32, _: &String| -> Result<(), Opaque> {
                Err(Opaque(7))
            },
        );

        assert_eq!(cache.get_data_by_key(&1), Err(Opaque(7)));
        assert_eq!(cache.get_data_by_key(&2), Ok(None));

        let lenient = cache
            .with_config(CacheConfig::new().with_promotion_policy(PromotionPolicy::Lenient));
        assert_eq!(lenient.lookup(&1), Ok(LookupOutcome::Unpromoted("name1".to_string())));
        assert!(primary.read().unwrap().is_empty());
    }

    #[test]
    fn test_from_resources_uses_trait_methods() {
        let primary = MockResource::new(ResourceRole::Primary);
        let secondary = MockResource::new(ResourceRole::Secondary).with_entry(2, "name2");
        let cache: ResourceCache<u32, String, &MockResource, &MockResource> =
            ReadThroughCache::from_resources(&primary, &secondary, &primary);

        assert_eq!(cache.get_data_by_key(&2).unwrap(), Some("name2".to_string()));
        assert_eq!(primary.writes(), 1);
        assert_eq!(cache.get_data_by_key(&2).unwrap(), Some("name2".to_string()));
        assert_eq!(secondary.reads(), 1);
    }

    #[test]
    fn test_accessors_and_debug() {
        let primary = MockResource::new(ResourceRole::Primary);
        let secondary = MockResource::new(ResourceRole::Secondary);
        let cache: ResourceCache<u32, String, &MockResource, &MockResource> =
            ReadThroughCache::from_resources(&primary, &secondary, &primary)
            .with_config(CacheConfig::new().with_name("users"));

        assert!(std::ptr::eq(*cache.primary(), &primary));
        assert!(std::ptr::eq(*cache.secondary(), &secondary));
        assert!(std::ptr::eq(*cache.primary_writer(), &primary));
        assert_eq!(cache.config().name, "users");

        let rendered = format!("{:?}", cache);
        assert!(rendered.contains("ReadThroughCache"));
        assert!(rendered.contains("users"));
    }

    #[test]
    fn test_clone_shares_resources() {
        let primary = MockResource::new(ResourceRole::Primary);
        let secondary = MockResource::new(ResourceRole::Secondary).with_entry(6, "name6");
        let cache: ResourceCache<u32, String, &MockResource, &MockResource> =
            ReadThroughCache::from_resources(&primary, &secondary, &primary);
        let cloned = cache.clone();

        cache.get_data_by_key(&6).unwrap();
        assert_eq!(
            cloned.lookup(&6).unwrap(),
            LookupOutcome::Primary("name6".to_string())
        );
    }
}
