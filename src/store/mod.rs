//! Storage backend variants for the tiered cache.
//!
//! Three interchangeable stores sit behind one capability trait, selected by
//! a [`StorageTier`] tag at call time: a plain in-process map, a
//! session-scoped map, and a durable file-backed map. Values are opaque
//! serialized strings; the cache layer owns the entry envelope.

use crate::error::Result;

pub mod local;
pub mod memory;
pub mod session;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use session::SessionStore;

/// Which backing store a cache operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StorageTier {
    /// In-process map; fastest, lost on restart, can never fail.
    #[default]
    Memory,
    /// Session-scoped map; wiped wholesale when the session ends.
    Session,
    /// Durable file-backed map; survives restarts, writes can fail.
    Local,
}

impl std::fmt::Display for StorageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageTier::Memory => write!(f, "memory"),
            StorageTier::Session => write!(f, "session"),
            StorageTier::Local => write!(f, "local"),
        }
    }
}

/// Trait for storage backend implementations.
///
/// Abstracts key/value storage of serialized cache entries, allowing the
/// cache to treat all three tiers uniformly.
///
/// **IMPORTANT:** All methods use `&self` to allow concurrent access.
/// Implementations use interior mutability (DashMap, file mutex).
#[allow(async_fn_in_trait)]
pub trait StorageBackend: Send + Sync {
    /// Retrieve a serialized value by storage key.
    ///
    /// # Returns
    /// - `Ok(Some(text))` - Value found
    /// - `Ok(None)` - Key not present
    ///
    /// # Errors
    /// Returns `Err` if the backing store cannot be read.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store a serialized value under a storage key, overwriting.
    ///
    /// # Errors
    /// Returns `Err` if the write fails (quota, IO). The cache layer catches
    /// this and degrades to the memory tier.
    async fn write(&self, key: &str, value: String) -> Result<()>;

    /// Remove a value; idempotent, absent keys are not an error.
    ///
    /// # Errors
    /// Returns `Err` only if the backing store itself fails.
    async fn remove(&self, key: &str) -> Result<()>;

    /// List every storage key currently held.
    ///
    /// Used by the sweep, wildcard invalidation and `clear`.
    ///
    /// # Errors
    /// Returns `Err` if the backing store cannot be enumerated.
    async fn scan_keys(&self) -> Result<Vec<String>>;

    /// Remove every key. Default implementation scans and removes.
    ///
    /// # Errors
    /// Returns `Err` if the backing store fails mid-sweep.
    async fn clear(&self) -> Result<()> {
        for key in self.scan_keys().await? {
            self.remove(&key).await?;
        }
        Ok(())
    }

    /// Number of keys currently held.
    async fn len(&self) -> usize {
        self.scan_keys().await.map(|k| k.len()).unwrap_or(0)
    }
}
