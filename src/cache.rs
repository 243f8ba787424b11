//! Tiered TTL cache store - main entry point for cache operations.
//!
//! One [`CacheStore`] instance is wired at process start and shared (it is
//! cheap to clone behind `Arc`); services and the fetch wrapper receive it by
//! injection rather than through a hidden global.
//!
//! The store never surfaces backend failures: a rejected durable write
//! degrades to the in-process tier, a corrupt or expired entry reads as a
//! miss and is evicted on the spot. The only error allowed out of this layer
//! is a `get_or_set` producer failure, which belongs to the caller.

use crate::entry::CacheEntry;
use crate::error::Result;
use crate::key::CacheKeyBuilder;
use crate::policy::TtlPolicy;
use crate::store::{LocalStore, MemoryStore, SessionStore, StorageBackend, StorageTier};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default interval for the background expiry sweep.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

const ALL_TIERS: [StorageTier; 3] = [
    StorageTier::Memory,
    StorageTier::Session,
    StorageTier::Local,
];

/// Options for a cache write.
#[derive(Clone, Debug, Default)]
pub struct SetOptions {
    /// Explicit TTL. A registered namespace default takes precedence over
    /// this value; see [`TtlPolicy::resolve`].
    pub ttl: Option<Duration>,
    /// Which backing store to write to.
    pub tier: StorageTier,
    /// Namespace tag. When absent it is derived from the key's first
    /// segment.
    pub namespace: Option<String>,
}

impl SetOptions {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_tier(mut self, tier: StorageTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Live-entry counts per store, for observability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheStats {
    pub memory: usize,
    pub session: usize,
    pub local: usize,
    pub total: usize,
}

// The durable tier is file-backed when a path was given, otherwise a
// volatile stand-in so the API stays total.
#[derive(Clone)]
enum LocalBackend {
    Durable(LocalStore),
    Volatile(MemoryStore),
}

impl LocalBackend {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        match self {
            LocalBackend::Durable(s) => s.read(key).await,
            LocalBackend::Volatile(s) => s.read(key).await,
        }
    }

    async fn write(&self, key: &str, value: String) -> Result<()> {
        match self {
            LocalBackend::Durable(s) => s.write(key, value).await,
            LocalBackend::Volatile(s) => s.write(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match self {
            LocalBackend::Durable(s) => s.remove(key).await,
            LocalBackend::Volatile(s) => s.remove(key).await,
        }
    }

    async fn scan_keys(&self) -> Result<Vec<String>> {
        match self {
            LocalBackend::Durable(s) => s.scan_keys().await,
            LocalBackend::Volatile(s) => s.scan_keys().await,
        }
    }
}

/// Process-wide tiered TTL cache.
///
/// # Example
///
/// ```
/// use bookingkit::cache::{CacheStore, SetOptions};
/// use bookingkit::store::StorageTier;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache = CacheStore::in_memory();
/// let key = CacheStore::generate_key("bookings", "list", &[("page", "1")]);
///
/// cache.set(&key, &vec![1, 2, 3], SetOptions::default()).await;
/// let hit: Option<Vec<i32>> = cache.get(&key, StorageTier::Memory).await;
/// assert_eq!(hit, Some(vec![1, 2, 3]));
/// # }
/// ```
#[derive(Clone)]
pub struct CacheStore {
    memory: MemoryStore,
    session: SessionStore,
    local: LocalBackend,
    ttl_policy: TtlPolicy,
}

impl CacheStore {
    /// Cache with all three tiers in process memory (no durable file).
    pub fn in_memory() -> Self {
        CacheStore {
            memory: MemoryStore::new(),
            session: SessionStore::new(),
            local: LocalBackend::Volatile(MemoryStore::new()),
            ttl_policy: TtlPolicy::new(),
        }
    }

    /// Cache with a durable local tier persisted at `path`.
    ///
    /// # Errors
    /// Returns `Err` if the durable file's directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(CacheStore {
            memory: MemoryStore::new(),
            session: SessionStore::new(),
            local: LocalBackend::Durable(LocalStore::open(path).await?),
            ttl_policy: TtlPolicy::new(),
        })
    }

    /// Replace the TTL policy.
    pub fn with_ttl_policy(mut self, policy: TtlPolicy) -> Self {
        self.ttl_policy = policy;
        self
    }

    /// Session-tier handle, for wiring session teardown.
    pub fn session_store(&self) -> &SessionStore {
        &self.session
    }

    /// Build a deterministic cache key; see [`CacheKeyBuilder::build`].
    pub fn generate_key(namespace: &str, identifier: &str, params: &[(&str, &str)]) -> String {
        CacheKeyBuilder::build(namespace, identifier, params)
    }

    /// Read a value from the selected tier.
    ///
    /// Returns `None` on miss, expiry or corruption; expired and corrupt
    /// entries are deleted as a side effect. Never fails.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, tier: StorageTier) -> Option<T> {
        let storage_key = CacheKeyBuilder::storage_key(key);

        let raw = match self.backend_read(tier, &storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache MISS [{}] {}", tier, key);
                return None;
            }
            Err(e) => {
                warn!("Cache read failed [{}] {}: {}", tier, key, e);
                return None;
            }
        };

        let mut entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Evicting corrupt entry [{}] {}: {}", tier, key, e);
                let _ = self.backend_remove(tier, &storage_key).await;
                return None;
            }
        };

        if entry.is_expired() {
            debug!("Cache EXPIRED [{}] {}", tier, key);
            let _ = self.backend_remove(tier, &storage_key).await;
            return None;
        }

        // Refresh the diagnostics timestamp on the memory tier; rewriting
        // durable tiers on every read is not worth the IO.
        if tier == StorageTier::Memory {
            entry.touch();
            if let Ok(text) = serde_json::to_string(&entry) {
                let _ = self.backend_write(tier, &storage_key, text).await;
            }
        }

        match serde_json::from_value::<T>(entry.data) {
            Ok(value) => {
                debug!("Cache HIT [{}] {}", tier, key);
                Some(value)
            }
            Err(e) => {
                warn!("Evicting type-mismatched entry [{}] {}: {}", tier, key, e);
                let _ = self.backend_remove(tier, &storage_key).await;
                None
            }
        }
    }

    /// Store a value. Never fails: a rejected write on the requested tier is
    /// logged and retried on the in-process tier.
    pub async fn set<T: Serialize>(&self, key: &str, data: &T, options: SetOptions) {
        let data = match serde_json::to_value(data) {
            Ok(v) => v,
            Err(e) => {
                warn!("Cache set skipped, value not serializable for {}: {}", key, e);
                return;
            }
        };

        let namespace = options
            .namespace
            .clone()
            .unwrap_or_else(|| CacheKeyBuilder::namespace_of(key).to_string());
        let ttl = self.ttl_policy.resolve(Some(&namespace), options.ttl);

        let entry = CacheEntry::new(data, ttl, namespace);
        let text = match serde_json::to_string(&entry) {
            Ok(text) => text,
            Err(e) => {
                warn!("Cache set skipped, entry not serializable for {}: {}", key, e);
                return;
            }
        };

        let storage_key = CacheKeyBuilder::storage_key(key);
        if let Err(e) = self
            .backend_write(options.tier, &storage_key, text.clone())
            .await
        {
            warn!(
                "Cache write failed [{}] {}, degrading to memory tier: {}",
                options.tier, key, e
            );
            let _ = self
                .backend_write(StorageTier::Memory, &storage_key, text)
                .await;
            return;
        }
        debug!("Cache SET [{}] {} (ttl {:?})", options.tier, key, ttl);
    }

    /// Remove a single entry from the selected tier. Idempotent.
    pub async fn delete(&self, key: &str, tier: StorageTier) {
        let storage_key = CacheKeyBuilder::storage_key(key);
        if let Err(e) = self.backend_remove(tier, &storage_key).await {
            warn!("Cache delete failed [{}] {}: {}", tier, key, e);
        }
    }

    /// Remove every entry across all tiers whose key or namespace matches
    /// `pattern`: plain patterns match by substring, `*` matches everything,
    /// an embedded `*` acts as a wildcard. Returns the number of entries
    /// removed.
    pub async fn invalidate(&self, pattern: &str) -> usize {
        let matcher = PatternMatcher::new(pattern);
        let mut removed = 0;

        for tier in ALL_TIERS {
            let keys = match self.backend_scan(tier).await {
                Ok(keys) => keys,
                Err(e) => {
                    warn!("Invalidation scan failed [{}]: {}", tier, e);
                    continue;
                }
            };

            for storage_key in keys {
                let Some(key) = CacheKeyBuilder::logical_key(&storage_key) else {
                    continue;
                };

                let hit = if matcher.matches(key) {
                    true
                } else {
                    // The key may carry a custom namespace that its text does
                    // not reveal; check the stored entry. Unreadable entries
                    // are corrupt and go too.
                    match self.backend_read(tier, &storage_key).await {
                        Ok(Some(raw)) => match serde_json::from_str::<CacheEntry>(&raw) {
                            Ok(entry) => matcher.matches(&entry.namespace),
                            Err(_) => true,
                        },
                        _ => false,
                    }
                };

                if hit && self.backend_remove(tier, &storage_key).await.is_ok() {
                    removed += 1;
                }
            }
        }

        debug!("Invalidated {} entries matching '{}'", removed, pattern);
        removed
    }

    /// Remove everything the cache owns (all prefixed entries) across all
    /// tiers.
    pub async fn clear(&self) {
        for tier in ALL_TIERS {
            let keys = match self.backend_scan(tier).await {
                Ok(keys) => keys,
                Err(e) => {
                    warn!("Clear scan failed [{}]: {}", tier, e);
                    continue;
                }
            };
            for storage_key in keys {
                if CacheKeyBuilder::logical_key(&storage_key).is_some() {
                    let _ = self.backend_remove(tier, &storage_key).await;
                }
            }
        }
        info!("Cache cleared across all tiers");
    }

    /// Sweep all tiers, deleting expired and corrupt entries. Never fails;
    /// returns the number of entries removed.
    pub async fn cleanup(&self) -> usize {
        let mut removed = 0;

        for tier in ALL_TIERS {
            let keys = match self.backend_scan(tier).await {
                Ok(keys) => keys,
                Err(e) => {
                    warn!("Cleanup scan failed [{}]: {}", tier, e);
                    continue;
                }
            };

            for storage_key in keys {
                if CacheKeyBuilder::logical_key(&storage_key).is_none() {
                    continue;
                }
                let stale = match self.backend_read(tier, &storage_key).await {
                    Ok(Some(raw)) => match serde_json::from_str::<CacheEntry>(&raw) {
                        Ok(entry) => entry.is_expired(),
                        Err(_) => true,
                    },
                    Ok(None) => false,
                    Err(_) => false,
                };
                if stale && self.backend_remove(tier, &storage_key).await.is_ok() {
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            debug!("Cleanup removed {} stale entries", removed);
        }
        removed
    }

    /// Spawn the periodic expiry sweep.
    ///
    /// Runs `cleanup` every `every` ([`CLEANUP_INTERVAL`] in production).
    /// Abort the returned handle to stop maintenance.
    pub fn spawn_cleanup(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately; skip it so the sweep
            // starts one full interval after spawn.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.cleanup().await;
            }
        })
    }

    /// Return the cached value if present and fresh, otherwise run
    /// `producer`, cache its result under `key` and return it.
    ///
    /// # Errors
    /// Propagates the producer's error; nothing is cached in that case.
    pub async fn get_or_set<T, F, Fut>(
        &self,
        key: &str,
        producer: F,
        options: SetOptions,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get::<T>(key, options.tier).await {
            return Ok(value);
        }

        let value = producer().await?;
        self.set(key, &value, options).await;
        Ok(value)
    }

    /// Live-entry counts per tier.
    pub async fn stats(&self) -> CacheStats {
        let memory = self.live_count(StorageTier::Memory).await;
        let session = self.live_count(StorageTier::Session).await;
        let local = self.live_count(StorageTier::Local).await;
        CacheStats {
            memory,
            session,
            local,
            total: memory + session + local,
        }
    }

    async fn live_count(&self, tier: StorageTier) -> usize {
        let Ok(keys) = self.backend_scan(tier).await else {
            return 0;
        };
        let mut live = 0;
        for storage_key in keys {
            if CacheKeyBuilder::logical_key(&storage_key).is_none() {
                continue;
            }
            if let Ok(Some(raw)) = self.backend_read(tier, &storage_key).await {
                if let Ok(entry) = serde_json::from_str::<CacheEntry>(&raw) {
                    if !entry.is_expired() {
                        live += 1;
                    }
                }
            }
        }
        live
    }

    async fn backend_read(&self, tier: StorageTier, key: &str) -> Result<Option<String>> {
        match tier {
            StorageTier::Memory => self.memory.read(key).await,
            StorageTier::Session => self.session.read(key).await,
            StorageTier::Local => self.local.read(key).await,
        }
    }

    async fn backend_write(&self, tier: StorageTier, key: &str, value: String) -> Result<()> {
        match tier {
            StorageTier::Memory => self.memory.write(key, value).await,
            StorageTier::Session => self.session.write(key, value).await,
            StorageTier::Local => self.local.write(key, value).await,
        }
    }

    async fn backend_remove(&self, tier: StorageTier, key: &str) -> Result<()> {
        match tier {
            StorageTier::Memory => self.memory.remove(key).await,
            StorageTier::Session => self.session.remove(key).await,
            StorageTier::Local => self.local.remove(key).await,
        }
    }

    async fn backend_scan(&self, tier: StorageTier) -> Result<Vec<String>> {
        match tier {
            StorageTier::Memory => self.memory.scan_keys().await,
            StorageTier::Session => self.session.scan_keys().await,
            StorageTier::Local => self.local.scan_keys().await,
        }
    }
}

/// Invalidation pattern semantics: `*` matches everything, an embedded `*`
/// is a wildcard, anything else matches by substring.
enum PatternMatcher {
    All,
    Wildcard(Regex),
    Contains(String),
}

impl PatternMatcher {
    fn new(pattern: &str) -> Self {
        if pattern == "*" {
            return PatternMatcher::All;
        }
        if pattern.contains('*') {
            let escaped = regex::escape(pattern).replace("\\*", ".*");
            // Escaped input cannot produce an invalid expression; fall back
            // to substring matching if it somehow does.
            return match Regex::new(&escaped) {
                Ok(re) => PatternMatcher::Wildcard(re),
                Err(_) => PatternMatcher::Contains(pattern.replace('*', "")),
            };
        }
        PatternMatcher::Contains(pattern.to_string())
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            PatternMatcher::All => true,
            PatternMatcher::Wildcard(re) => re.is_match(text),
            PatternMatcher::Contains(needle) => text.contains(needle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::CacheEntry;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let cache = CacheStore::in_memory();
        cache.set("scratch:a", &json!({"n": 1}), SetOptions::default()).await;

        let hit: Option<serde_json::Value> = cache.get("scratch:a", StorageTier::Memory).await;
        assert_eq!(hit, Some(json!({"n": 1})));
    }

    #[tokio::test]
    async fn test_get_wrong_tier_is_miss() {
        let cache = CacheStore::in_memory();
        cache.set("scratch:a", &1, SetOptions::default()).await;

        let hit: Option<i32> = cache.get("scratch:a", StorageTier::Session).await;
        assert_eq!(hit, None);
    }

    #[tokio::test]
    async fn test_ttl_expiry_removes_entry_on_read() {
        let cache = CacheStore::in_memory();
        cache
            .set(
                "scratch:a",
                &"data",
                SetOptions::default().with_ttl(Duration::from_millis(100)),
            )
            .await;

        let fresh: Option<String> = cache.get("scratch:a", StorageTier::Memory).await;
        assert_eq!(fresh, Some("data".to_string()));

        tokio::time::sleep(Duration::from_millis(150)).await;

        let stale: Option<String> = cache.get("scratch:a", StorageTier::Memory).await;
        assert_eq!(stale, None);

        // The expired read deleted the entry outright.
        let raw = cache
            .backend_read(StorageTier::Memory, &CacheKeyBuilder::storage_key("scratch:a"))
            .await
            .expect("read");
        assert!(raw.is_none());
    }

    #[tokio::test]
    async fn test_namespace_default_overrides_explicit_ttl() {
        let cache = CacheStore::in_memory();
        cache
            .set(
                "bookings:list",
                &"data",
                SetOptions::default().with_ttl(Duration::from_secs(999_999)),
            )
            .await;

        let raw = cache
            .backend_read(
                StorageTier::Memory,
                &CacheKeyBuilder::storage_key("bookings:list"),
            )
            .await
            .expect("read")
            .expect("entry present");
        let entry: CacheEntry = serde_json::from_str(&raw).expect("parse entry");

        // The bookings namespace default (2 minutes) wins over the explicit
        // TTL argument.
        assert_eq!(entry.expiry - entry.created, 120_000);
    }

    #[tokio::test]
    async fn test_invalidate_substring() {
        let cache = CacheStore::in_memory();
        cache.set("gallery:x", &1, SetOptions::default()).await;
        cache.set("gallery:y", &2, SetOptions::default()).await;
        cache.set("other:z", &3, SetOptions::default()).await;

        let removed = cache.invalidate("gallery").await;
        assert_eq!(removed, 2);

        let x: Option<i32> = cache.get("gallery:x", StorageTier::Memory).await;
        let z: Option<i32> = cache.get("other:z", StorageTier::Memory).await;
        assert_eq!(x, None);
        assert_eq!(z, Some(3));
    }

    #[tokio::test]
    async fn test_invalidate_wildcard_and_match_all() {
        let cache = CacheStore::in_memory();
        cache.set("bookings:list:page=1", &1, SetOptions::default()).await;
        cache.set("bookings:detail:7", &2, SetOptions::default()).await;
        cache.set("analytics:summary", &3, SetOptions::default()).await;

        let removed = cache.invalidate("bookings:*page*").await;
        assert_eq!(removed, 1);
        let detail: Option<i32> = cache.get("bookings:detail:7", StorageTier::Memory).await;
        assert_eq!(detail, Some(2));

        let removed_all = cache.invalidate("*").await;
        assert_eq!(removed_all, 2);
        assert_eq!(cache.stats().await.total, 0);
    }

    #[tokio::test]
    async fn test_invalidate_matches_custom_namespace() {
        let cache = CacheStore::in_memory();
        cache
            .set(
                "misc:thing",
                &1,
                SetOptions::default().with_namespace("highlights"),
            )
            .await;

        let removed = cache.invalidate("highlights").await;
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_invalidate_spans_all_tiers() {
        let cache = CacheStore::in_memory();
        cache.set("bookings:a", &1, SetOptions::default()).await;
        cache
            .set(
                "bookings:b",
                &2,
                SetOptions::default().with_tier(StorageTier::Session),
            )
            .await;
        cache
            .set(
                "bookings:c",
                &3,
                SetOptions::default().with_tier(StorageTier::Local),
            )
            .await;

        let removed = cache.invalidate("bookings").await;
        assert_eq!(removed, 3);
        assert_eq!(cache.stats().await.total, 0);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let cache = CacheStore::in_memory();
        cache.set("a:1", &1, SetOptions::default()).await;
        cache
            .set("b:2", &2, SetOptions::default().with_tier(StorageTier::Session))
            .await;

        cache.clear().await;
        assert_eq!(cache.stats().await.total, 0);
    }

    #[tokio::test]
    async fn test_cleanup_sweeps_expired_and_corrupt() {
        let cache = CacheStore::in_memory();
        cache
            .set(
                "scratch:stale",
                &1,
                SetOptions::default().with_ttl(Duration::from_millis(50)),
            )
            .await;
        cache.set("scratch:fresh", &2, SetOptions::default()).await;

        // Plant a corrupt entry directly in the backing store.
        cache
            .backend_write(
                StorageTier::Memory,
                &CacheKeyBuilder::storage_key("scratch:corrupt"),
                "not json".to_string(),
            )
            .await
            .expect("write");

        tokio::time::sleep(Duration::from_millis(80)).await;

        let removed = cache.cleanup().await;
        assert_eq!(removed, 2);

        let fresh: Option<i32> = cache.get("scratch:fresh", StorageTier::Memory).await;
        assert_eq!(fresh, Some(2));
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_miss_and_is_evicted() {
        let cache = CacheStore::in_memory();
        let storage_key = CacheKeyBuilder::storage_key("scratch:bad");
        cache
            .backend_write(StorageTier::Memory, &storage_key, "{broken".to_string())
            .await
            .expect("write");

        let miss: Option<i32> = cache.get("scratch:bad", StorageTier::Memory).await;
        assert_eq!(miss, None);

        let gone = cache
            .backend_read(StorageTier::Memory, &storage_key)
            .await
            .expect("read");
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn test_get_or_set_calls_producer_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let cache = CacheStore::in_memory();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_set(
                    "scratch:produced",
                    || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(41)
                    },
                    SetOptions::default(),
                )
                .await
                .expect("get_or_set");
            assert_eq!(value, 41);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_set_producer_failure_caches_nothing() {
        let cache = CacheStore::in_memory();

        let result: Result<i32> = cache
            .get_or_set(
                "scratch:failing",
                || async { Err(crate::error::Error::Other("boom".to_string())) },
                SetOptions::default(),
            )
            .await;
        assert!(result.is_err());

        let miss: Option<i32> = cache.get("scratch:failing", StorageTier::Memory).await;
        assert_eq!(miss, None);
    }

    #[tokio::test]
    async fn test_set_degrades_to_memory_on_durable_write_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");
        let cache = CacheStore::open(&path).await.expect("open");

        // Break the durable file by replacing it with a directory.
        tokio::fs::remove_file(&path).await.ok();
        tokio::fs::create_dir_all(&path).await.expect("mkdir");

        cache
            .set(
                "scratch:a",
                &7,
                SetOptions::default().with_tier(StorageTier::Local),
            )
            .await;

        // The entry landed on the memory tier instead of being lost.
        let hit: Option<i32> = cache.get("scratch:a", StorageTier::Memory).await;
        assert_eq!(hit, Some(7));
    }

    #[tokio::test]
    async fn test_stats_counts_live_entries_per_tier() {
        let cache = CacheStore::in_memory();
        cache.set("a:1", &1, SetOptions::default()).await;
        cache.set("a:2", &2, SetOptions::default()).await;
        cache
            .set("b:1", &3, SetOptions::default().with_tier(StorageTier::Session))
            .await;

        let stats = cache.stats().await;
        assert_eq!(stats.memory, 2);
        assert_eq!(stats.session, 1);
        assert_eq!(stats.local, 0);
        assert_eq!(stats.total, 3);
    }

    #[tokio::test]
    async fn test_spawn_cleanup_sweeps_on_interval() {
        let cache = Arc::new(CacheStore::in_memory());
        cache
            .set(
                "scratch:stale",
                &1,
                SetOptions::default().with_ttl(Duration::from_millis(20)),
            )
            .await;

        let handle = cache.spawn_cleanup(Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.abort();

        let raw = cache
            .backend_read(
                StorageTier::Memory,
                &CacheKeyBuilder::storage_key("scratch:stale"),
            )
            .await
            .expect("read");
        assert!(raw.is_none());
    }

    #[test]
    fn test_pattern_matcher_variants() {
        assert!(PatternMatcher::new("*").matches("anything"));
        assert!(PatternMatcher::new("gallery").matches("gallery:x"));
        assert!(!PatternMatcher::new("gallery").matches("other:z"));
        assert!(PatternMatcher::new("book*list").matches("bookings:list:page=1"));
        assert!(!PatternMatcher::new("book*list").matches("analytics:summary"));
    }
}
