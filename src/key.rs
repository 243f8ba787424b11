//! Cache key management utilities.
//!
//! Keys are built from `(namespace, identifier, params)` so that identical
//! logical requests always collide to the same key. Params are sorted by name
//! before joining, making the key independent of caller-side ordering.

/// Fixed prefix applied to every key the cache writes into a backing store.
///
/// Durable storage may be shared with other applications; the prefix marks
/// which entries the cache owns and may sweep or clear.
pub const STORAGE_PREFIX: &str = "bkc:";

/// Builder for cache keys.
pub struct CacheKeyBuilder;

impl CacheKeyBuilder {
    /// Build a cache key from namespace, identifier and request params.
    ///
    /// Format: `"{namespace}:{identifier}"` or
    /// `"{namespace}:{identifier}:{k=v|k=v}"` with params sorted by key.
    ///
    /// # Example
    /// ```
    /// use bookingkit::key::CacheKeyBuilder;
    ///
    /// let a = CacheKeyBuilder::build("bookings", "list", &[("page", "2"), ("sort", "date")]);
    /// let b = CacheKeyBuilder::build("bookings", "list", &[("sort", "date"), ("page", "2")]);
    /// assert_eq!(a, b);
    /// assert_eq!(a, "bookings:list:page=2|sort=date");
    /// ```
    pub fn build(namespace: &str, identifier: &str, params: &[(&str, &str)]) -> String {
        if params.is_empty() {
            return format!("{}:{}", namespace, identifier);
        }

        let mut sorted: Vec<(&str, &str)> = params.to_vec();
        sorted.sort();

        let suffix = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("|");

        format!("{}:{}:{}", namespace, identifier, suffix)
    }

    /// Build a plain `"{namespace}:{identifier}"` key.
    pub fn build_simple(namespace: &str, identifier: &str) -> String {
        Self::build(namespace, identifier, &[])
    }

    /// Prefix a key for the backing stores.
    pub fn storage_key(key: &str) -> String {
        format!("{}{}", STORAGE_PREFIX, key)
    }

    /// Strip the storage prefix, returning `None` for foreign keys.
    pub fn logical_key(storage_key: &str) -> Option<&str> {
        storage_key.strip_prefix(STORAGE_PREFIX)
    }

    /// Namespace segment of a key (everything before the first `:`).
    pub fn namespace_of(key: &str) -> &str {
        key.split(':').next().unwrap_or(key)
    }
}
