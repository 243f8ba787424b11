//! Durable file-backed storage backend.
//!
//! Entries live in a DashMap mirror and are written through to a single JSON
//! file (a string-to-string map) on every mutation. The file is loaded once
//! on open; a corrupt file is tolerated by starting empty rather than
//! failing. Writes use a temp-file-then-rename sequence so a crash mid-flush
//! leaves the previous snapshot intact.
//!
//! Write failures (disk full, permissions) surface as `BackendError`; the
//! cache layer catches them and degrades the entry to the memory tier.

use super::StorageBackend;
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Durable storage backend persisting to a JSON file.
///
/// Clones share the same map and file.
#[derive(Clone)]
pub struct LocalStore {
    path: PathBuf,
    entries: Arc<DashMap<String, String>>,
    // Serializes flushes so concurrent mutations cannot interleave
    // half-written snapshots.
    flush_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    /// Open (or create) a durable store at `path`.
    ///
    /// An unreadable or corrupt file is treated as empty; durable state is a
    /// cache, losing it only costs refetches.
    ///
    /// # Errors
    /// Returns `Err` if the parent directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let entries = DashMap::new();
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => match serde_json::from_str::<HashMap<String, String>>(&text) {
                Ok(map) => {
                    for (k, v) in map {
                        entries.insert(k, v);
                    }
                }
                Err(e) => {
                    warn!("Durable store at {:?} is corrupt, starting empty: {}", path, e);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!("Durable store at {:?} unreadable, starting empty: {}", path, e);
            }
        }

        Ok(LocalStore {
            path,
            entries: Arc::new(entries),
            flush_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn flush(&self) -> Result<()> {
        let snapshot: HashMap<String, String> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let text = serde_json::to_string(&snapshot)
            .map_err(|e| Error::SerializationError(e.to_string()))?;

        let _guard = self.flush_lock.lock().await;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

impl StorageBackend for LocalStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn write(&self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        if let Err(e) = self.flush().await {
            // Roll the mirror back so memory and disk stay consistent.
            self.entries.remove(key);
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush().await?;
        }
        Ok(())
    }

    async fn scan_keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.clear();
        self.flush().await
    }

    async fn len(&self) -> usize {
        self.entries.len()
    }
}
