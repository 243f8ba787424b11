//! Cache entry envelope persisted to the backing stores.
//!
//! Every value the cache owns is wrapped in a [`CacheEntry`] and stored as a
//! JSON object with camelCase field names:
//!
//! ```text
//! { "data": ..., "expiry": 1735000000000, "created": ...,
//!   "lastAccess": ..., "namespace": "bookings" }
//! ```
//!
//! `expiry` is an absolute millisecond Unix timestamp. An entry is invalid
//! once `now > expiry`; the cache lazily deletes it on the next read, and the
//! background sweep removes it in bulk.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current time as milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A single cache entry with its expiry and diagnostics timestamps.
///
/// The serialized form of this struct is the persisted-state contract: any
/// JSON that does not deserialize into it is treated as a corrupt entry and
/// evicted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Opaque payload (any JSON-serializable value).
    pub data: Value,
    /// Absolute expiry timestamp, milliseconds since the Unix epoch.
    pub expiry: u64,
    /// Creation timestamp, for diagnostics.
    pub created: u64,
    /// Last read timestamp, for diagnostics/eviction heuristics.
    pub last_access: u64,
    /// Namespace tag used for bulk invalidation and default-TTL lookup.
    pub namespace: String,
}

impl CacheEntry {
    /// Create an entry expiring `ttl` from now.
    pub fn new(data: Value, ttl: Duration, namespace: impl Into<String>) -> Self {
        let now = now_millis();
        CacheEntry {
            data,
            expiry: now + ttl.as_millis() as u64,
            created: now,
            last_access: now,
            namespace: namespace.into(),
        }
    }

    /// Whether the entry has passed its expiry.
    pub fn is_expired(&self) -> bool {
        now_millis() > self.expiry
    }

    /// Refresh the last-access timestamp.
    pub fn touch(&mut self) {
        self.last_access = now_millis();
    }
}
