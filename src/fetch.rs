//! Cache-aware fetch wrapper.
//!
//! Wraps outbound REST calls with cache-first-or-fetch semantics, retry with
//! linearly increasing delay, and per-instance request de-duplication: a new
//! call on the same client supersedes any in-flight one, whose result
//! resolves with `aborted: true` instead of an error so callers can tell
//! "superseded" from "failed". Superseding detaches the client from the
//! result; the underlying transport is not interrupted.
//!
//! The remote REST API stays an external collaborator behind the
//! [`Transport`] trait, which keeps the wrapper independent of any HTTP
//! client and trivially mockable in tests.

use crate::cache::{CacheStore, SetOptions};
use crate::error::{Error, Result};
use crate::key::CacheKeyBuilder;
use crate::store::StorageTier;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// HTTP method of an outbound request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// An outbound request.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Request {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Request {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }

    pub fn put(url: impl Into<String>, body: Value) -> Self {
        Request {
            method: Method::Put,
            url: url.into(),
            body: Some(body),
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Request {
            method: Method::Delete,
            url: url.into(),
            body: None,
        }
    }
}

/// Response from the transport.
#[derive(Clone, Debug)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    /// 2xx status codes count as success.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for the outbound transport.
///
/// Implement over your HTTP client of choice; tests use in-memory mocks.
///
/// **IMPORTANT:** Uses `&self` to allow concurrent requests; implementations
/// should use interior mutability for any shared state.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Perform the request.
    ///
    /// # Errors
    /// Returns `Err` on transport-level failure (connection refused,
    /// timeout). Non-2xx responses are returned as `Ok`; the fetch wrapper
    /// decides whether to retry them.
    async fn send(&self, request: &Request) -> Result<Response>;
}

/// Fixed-count retry with linearly increasing delay.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (0 = no retry).
    pub max_retries: u32,
    /// Delay before retry `n` is `base_delay * n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        RetryPolicy {
            max_retries,
            base_delay,
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }
}

/// Cache behavior for one fetch call.
#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Read the cache before the network and write through after it.
    pub use_cache: bool,
    /// Skip the cache read but still write through.
    pub force_refresh: bool,
    /// Cache namespace; also the first key segment.
    pub namespace: String,
    /// Request params folded into the cache key.
    pub params: Vec<(String, String)>,
    /// Explicit TTL (subject to namespace-default precedence).
    pub ttl: Option<Duration>,
    /// Backing store for the cached response.
    pub tier: StorageTier,
    /// Invalidation patterns applied after a successful response.
    pub invalidates: Vec<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            use_cache: true,
            force_refresh: false,
            namespace: "default".to_string(),
            params: Vec::new(),
            ttl: None,
            tier: StorageTier::default(),
            invalidates: Vec::new(),
        }
    }
}

impl FetchOptions {
    /// Cache-enabled options under a namespace.
    pub fn cached(namespace: impl Into<String>) -> Self {
        FetchOptions {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Cache-disabled options (mutating verbs).
    pub fn uncached() -> Self {
        FetchOptions {
            use_cache: false,
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: &[(&str, &str)]) -> Self {
        self.params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    pub fn with_force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_tier(mut self, tier: StorageTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn invalidating(mut self, patterns: &[&str]) -> Self {
        self.invalidates = patterns.iter().map(|p| p.to_string()).collect();
        self
    }
}

/// Result of a fetch call.
#[derive(Clone, Debug)]
pub struct FetchOutcome {
    /// Response payload; `Null` when aborted.
    pub data: Value,
    /// Whether the payload came from the cache.
    pub from_cache: bool,
    /// Whether this call was superseded by a newer one.
    pub aborted: bool,
}

impl FetchOutcome {
    fn hit(data: Value) -> Self {
        FetchOutcome {
            data,
            from_cache: true,
            aborted: false,
        }
    }

    fn fetched(data: Value) -> Self {
        FetchOutcome {
            data,
            from_cache: false,
            aborted: false,
        }
    }

    fn superseded() -> Self {
        FetchOutcome {
            data: Value::Null,
            from_cache: false,
            aborted: true,
        }
    }
}

/// Cache-aware fetch client over a [`Transport`].
///
/// One client instance de-duplicates its own requests: within an instance,
/// only the most recently issued request's result is delivered. Across
/// instances there is no ordering guarantee.
pub struct FetchClient<T: Transport> {
    transport: Arc<T>,
    cache: Arc<CacheStore>,
    retry: RetryPolicy,
    // Bumped by every new call; an in-flight call whose snapshot no longer
    // matches has been superseded.
    generation: AtomicU64,
}

impl<T: Transport> FetchClient<T> {
    pub fn new(transport: Arc<T>, cache: Arc<CacheStore>) -> Self {
        FetchClient {
            transport,
            cache,
            retry: RetryPolicy::default(),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Perform a request with cache semantics from `options`.
    ///
    /// Cache hits short-circuit without touching the network. Misses go to
    /// the transport with retry, write through to the cache when caching is
    /// enabled, then run any invalidation patterns.
    ///
    /// # Errors
    /// Returns `Err` once retries are exhausted on transport failure or
    /// non-2xx responses. Supersession is not an error: the outcome carries
    /// `aborted: true`.
    pub async fn fetch(&self, request: Request, options: FetchOptions) -> Result<FetchOutcome> {
        let my_gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let params: Vec<(&str, &str)> = options
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let cache_key = CacheKeyBuilder::build(&options.namespace, &request.url, &params);

        if options.use_cache && !options.force_refresh {
            if let Some(data) = self.cache.get::<Value>(&cache_key, options.tier).await {
                return Ok(FetchOutcome::hit(data));
            }
            if self.superseded(my_gen) {
                return Ok(FetchOutcome::superseded());
            }
        }

        let mut attempt: u32 = 0;
        let response = loop {
            attempt += 1;

            let result = self.transport.send(&request).await;
            if self.superseded(my_gen) {
                debug!("{} {} superseded, dropping result", request.method, request.url);
                return Ok(FetchOutcome::superseded());
            }

            let err = match result {
                Ok(response) if response.is_success() => break response,
                Ok(response) => Error::HttpStatus {
                    status: response.status,
                    url: request.url.clone(),
                },
                Err(e) => e,
            };

            if attempt > self.retry.max_retries {
                warn!(
                    "{} {} failed after {} attempts: {}",
                    request.method, request.url, attempt, err
                );
                return Err(err);
            }

            let delay = self.retry.base_delay * attempt;
            debug!(
                "{} {} failed (attempt {}), retrying in {:?}: {}",
                request.method, request.url, attempt, delay, err
            );
            tokio::time::sleep(delay).await;
            if self.superseded(my_gen) {
                return Ok(FetchOutcome::superseded());
            }
        };

        if options.use_cache {
            let set_options = SetOptions {
                ttl: options.ttl,
                tier: options.tier,
                namespace: Some(options.namespace.clone()),
            };
            self.cache.set(&cache_key, &response.body, set_options).await;
        }

        for pattern in &options.invalidates {
            self.cache.invalidate(pattern).await;
        }

        Ok(FetchOutcome::fetched(response.body))
    }

    /// GET with caching enabled by default.
    pub async fn get(&self, url: &str, options: FetchOptions) -> Result<FetchOutcome> {
        self.fetch(Request::get(url), options).await
    }

    /// POST, cache-disabled; `invalidates` patterns run after a 2xx
    /// response.
    pub async fn post(&self, url: &str, body: Value, invalidates: &[&str]) -> Result<FetchOutcome> {
        let options = FetchOptions::uncached().invalidating(invalidates);
        self.fetch(Request::post(url, body), options).await
    }

    /// PUT, cache-disabled; `invalidates` patterns run after a 2xx response.
    pub async fn put(&self, url: &str, body: Value, invalidates: &[&str]) -> Result<FetchOutcome> {
        let options = FetchOptions::uncached().invalidating(invalidates);
        self.fetch(Request::put(url, body), options).await
    }

    /// DELETE, cache-disabled; `invalidates` patterns run after a 2xx
    /// response.
    pub async fn delete(&self, url: &str, invalidates: &[&str]) -> Result<FetchOutcome> {
        let options = FetchOptions::uncached().invalidating(invalidates);
        self.fetch(Request::delete(url), options).await
    }

    fn superseded(&self, my_gen: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != my_gen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    struct MockTransport {
        calls: AtomicUsize,
        fail_first: usize,
        delay: Duration,
    }

    impl MockTransport {
        fn new() -> Self {
            MockTransport {
                calls: AtomicUsize::new(0),
                fail_first: 0,
                delay: Duration::ZERO,
            }
        }

        fn failing_first(n: usize) -> Self {
            MockTransport {
                fail_first: n,
                ..Self::new()
            }
        }

        fn slow(delay: Duration) -> Self {
            MockTransport {
                delay,
                ..Self::new()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for MockTransport {
        async fn send(&self, _request: &Request) -> Result<Response> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if n < self.fail_first {
                return Ok(Response {
                    status: 500,
                    body: Value::Null,
                });
            }
            Ok(Response {
                status: 200,
                body: json!({ "call": n }),
            })
        }
    }

    fn client(transport: MockTransport) -> (Arc<MockTransport>, FetchClient<MockTransport>) {
        let transport = Arc::new(transport);
        let cache = Arc::new(CacheStore::in_memory());
        let client = FetchClient::new(Arc::clone(&transport), cache)
            .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)));
        (transport, client)
    }

    #[tokio::test]
    async fn test_cache_hit_short_circuits_network() {
        let (transport, client) = client(MockTransport::new());

        let first = client
            .get("/api/bookings", FetchOptions::cached("bookings"))
            .await
            .expect("first fetch");
        assert!(!first.from_cache);

        let second = client
            .get("/api/bookings", FetchOptions::cached("bookings"))
            .await
            .expect("second fetch");
        assert!(second.from_cache);
        assert_eq!(second.data, first.data);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_skips_read_but_writes_through() {
        let (transport, client) = client(MockTransport::new());

        client
            .get("/api/bookings", FetchOptions::cached("bookings"))
            .await
            .expect("seed");

        let refreshed = client
            .get(
                "/api/bookings",
                FetchOptions::cached("bookings").with_force_refresh(),
            )
            .await
            .expect("refresh");
        assert!(!refreshed.from_cache);
        assert_eq!(transport.call_count(), 2);

        // The refreshed payload replaced the cached one.
        let hit = client
            .get("/api/bookings", FetchOptions::cached("bookings"))
            .await
            .expect("hit");
        assert!(hit.from_cache);
        assert_eq!(hit.data, refreshed.data);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let (transport, client) = client(MockTransport::failing_first(2));

        let outcome = client
            .get("/api/bookings", FetchOptions::cached("bookings"))
            .await
            .expect("fetch");
        assert!(!outcome.aborted);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted_surfaces_http_error() {
        let (transport, client) = client(MockTransport::failing_first(100));

        let err = client
            .get("/api/bookings", FetchOptions::cached("bookings"))
            .await
            .expect_err("should fail");
        assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
        // Initial attempt plus three retries.
        assert_eq!(transport.call_count(), 4);
    }

    #[tokio::test]
    async fn test_failed_fetch_caches_nothing() {
        let (_, client) = client(MockTransport::failing_first(100));

        client
            .get("/api/bookings", FetchOptions::cached("bookings"))
            .await
            .expect_err("should fail");

        let miss: Option<Value> = client
            .cache
            .get(
                &CacheKeyBuilder::build("bookings", "/api/bookings", &[]),
                StorageTier::Memory,
            )
            .await;
        assert_eq!(miss, None);
    }

    #[tokio::test]
    async fn test_newer_call_supersedes_in_flight_one() {
        let transport = Arc::new(MockTransport::slow(Duration::from_millis(100)));
        let cache = Arc::new(CacheStore::in_memory());
        let client = Arc::new(FetchClient::new(Arc::clone(&transport), Arc::clone(&cache)));

        let first_client = Arc::clone(&client);
        let first = tokio::spawn(async move {
            first_client
                .get("/api/bookings", FetchOptions::cached("bookings"))
                .await
        });

        // Let the first call reach the transport before superseding it.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = client
            .get("/api/bookings", FetchOptions::cached("bookings"))
            .await
            .expect("second fetch");

        let first = first.await.expect("join").expect("first fetch");
        assert!(first.aborted);
        assert_eq!(first.data, Value::Null);
        assert!(!second.aborted);

        // Only the second call's payload reached the cache.
        let cached: Option<Value> = cache
            .get(
                &CacheKeyBuilder::build("bookings", "/api/bookings", &[]),
                StorageTier::Memory,
            )
            .await;
        assert_eq!(cached, Some(second.data));
    }

    #[tokio::test]
    async fn test_mutation_invalidates_patterns_after_success() {
        let (_, client) = client(MockTransport::new());

        client
            .cache
            .set(
                "bookings:list",
                &json!([1, 2]),
                crate::cache::SetOptions::default(),
            )
            .await;

        client
            .post("/api/bookings", json!({"client": "A"}), &["bookings"])
            .await
            .expect("post");

        let miss: Option<Value> = client.cache.get("bookings:list", StorageTier::Memory).await;
        assert_eq!(miss, None);
    }

    #[tokio::test]
    async fn test_params_distinguish_cache_entries() {
        let (transport, client) = client(MockTransport::new());

        client
            .get(
                "/api/bookings",
                FetchOptions::cached("bookings").with_params(&[("page", "1")]),
            )
            .await
            .expect("page 1");
        let page2 = client
            .get(
                "/api/bookings",
                FetchOptions::cached("bookings").with_params(&[("page", "2")]),
            )
            .await
            .expect("page 2");

        assert!(!page2.from_cache);
        assert_eq!(transport.call_count(), 2);
    }
}
