//! In-process storage backend (default, thread-safe).
//!
//! Uses DashMap for lock-free concurrent access with per-key sharding.
//! This tier can never fail, which makes it the degradation target when a
//! durable write is rejected.

use super::StorageBackend;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe in-process storage backend.
///
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new, empty in-process store.
    pub fn new() -> Self {
        MemoryStore {
            entries: Arc::new(DashMap::new()),
        }
    }
}

impl StorageBackend for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn write(&self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn scan_keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }

    async fn len(&self) -> usize {
        self.entries.len()
    }
}
