//! Session-scoped storage backend.
//!
//! Holds entries for the lifetime of one session object: dropping the store
//! (or calling `end_session`) discards everything at once. Contents are
//! otherwise indistinguishable from the in-process tier, but the cache treats
//! the two as separate stores so callers can pin short-lived, session-bound
//! data here without it surviving a login/logout cycle.

use super::StorageBackend;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// Session-scoped storage backend.
#[derive(Clone, Default)]
pub struct SessionStore {
    entries: Arc<DashMap<String, String>>,
}

impl SessionStore {
    /// Create a store for a fresh session.
    pub fn new() -> Self {
        SessionStore {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Discard everything the session accumulated.
    pub fn end_session(&self) {
        self.entries.clear();
        debug!("Session store wiped");
    }
}

impl StorageBackend for SessionStore {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_store_write_read() {
        let store = SessionStore::new();
        store.write("k", "v".to_string()).await.expect("write");
        assert_eq!(store.read("k").await.expect("read"), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_end_session_discards_everything() {
        let store = SessionStore::new();
        store.write("a", "1".to_string()).await.expect("write");
        store.write("b", "2".to_string()).await.expect("write");

        store.end_session();

        assert_eq!(store.len().await, 0);
        assert_eq!(store.read("a").await.expect("read"), None);
    }
}
