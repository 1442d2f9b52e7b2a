//! Capability traits for the resources behind a read-through cache.
//!
//! A cache never owns storage. It reads from resources implementing
//! [`ReadSource`] and writes back through a resource implementing
//! [`WriteTarget`]. The two contracts are deliberately separate so the
//! primary read handle and the primary write handle may be different types
//! (e.g. a read replica and a writer connection).

use std::sync::Arc;

/// A resource that can produce a value for a key.
///
/// # Implementation Requirements
///
/// - A key that is not present is reported as `Ok(None)`, never as an error
/// - `Err` is reserved for resource failures (timeouts, I/O, decoding)
/// - Reads must not mutate what subsequent reads observe
pub trait ReadSource<K, V> {
    /// Failure type reported by this resource.
    type Error;

    /// Look up the value stored for `key`.
    fn read(&self, key: &K) -> Result<Option<V>, Self::Error>;
}

/// A resource that can persist a key/value association.
pub trait WriteTarget<K, V> {
    /// Failure type reported by this resource.
    type Error;

    /// Store `value` under `key`.
    fn write(&self, key: &K, value: &V) -> Result<(), Self::Error>;
}

impl<K, V, T> ReadSource<K, V> for &T
where
    T: ReadSource<K, V> + ?Sized,
{
    type Error = T::Error;

    fn read(&self, key: &K) -> Result<Option<V>, Self::Error> {
        (**self).read(key)
    }
}

impl<K, V, T> ReadSource<K, V> for Arc<T>
where
    T: ReadSource<K, V> + ?Sized,
{
    type Error = T::Error;

    fn read(&self, key: &K) -> Result<Option<V>, Self::Error> {
        (**self).read(key)
    }
}

impl<K, V, T> WriteTarget<K, V> for &T
where
    T: WriteTarget<K, V> + ?Sized,
{
    type Error = T::Error;

    fn write(&self, key: &K, value: &V) -> Result<(), Self::Error> {
        (**self).write(key, value)
    }
}

impl<K, V, T> WriteTarget<K, V> for Arc<T>
where
    T: WriteTarget<K, V> + ?Sized,
{
    type Error = T::Error;

    fn write(&self, key: &K, value: &V) -> Result<(), Self::Error> {
        (**self).write(key, value)
    }
}
