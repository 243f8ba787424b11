//! Namespace TTL policy.
//!
//! Each namespace carries a default time-to-live; the table below is policy,
//! not mechanism, and can be overridden through the builder methods.
//!
//! | Namespace         | Default TTL |
//! |-------------------|-------------|
//! | `analytics`       | 5 minutes   |
//! | `highlights`      | 30 minutes  |
//! | `event-galleries` | 15 minutes  |
//! | `bookings`        | 2 minutes   |
//! | `booking-enums`   | 6 hours     |
//! | `services`        | 4 hours     |
//! | `auth`            | 24 hours    |
//! | (anything else)   | 10 minutes  |

use std::collections::HashMap;
use std::time::Duration;

/// Global fallback TTL when neither a namespace default nor an explicit
/// per-call TTL applies.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Per-namespace TTL defaults with a global fallback.
#[derive(Clone, Debug)]
pub struct TtlPolicy {
    defaults: HashMap<String, Duration>,
    fallback: Duration,
}

impl TtlPolicy {
    /// Policy with the standard namespace table.
    pub fn new() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert("analytics".to_string(), Duration::from_secs(5 * 60));
        defaults.insert("highlights".to_string(), Duration::from_secs(30 * 60));
        defaults.insert("event-galleries".to_string(), Duration::from_secs(15 * 60));
        defaults.insert("bookings".to_string(), Duration::from_secs(2 * 60));
        defaults.insert("booking-enums".to_string(), Duration::from_secs(6 * 3600));
        defaults.insert("services".to_string(), Duration::from_secs(4 * 3600));
        defaults.insert("auth".to_string(), Duration::from_secs(24 * 3600));
        TtlPolicy {
            defaults,
            fallback: DEFAULT_TTL,
        }
    }

    /// Policy with no namespace defaults, only the global fallback.
    pub fn empty() -> Self {
        TtlPolicy {
            defaults: HashMap::new(),
            fallback: DEFAULT_TTL,
        }
    }

    /// Override or register a namespace default.
    pub fn with_namespace(mut self, namespace: impl Into<String>, ttl: Duration) -> Self {
        self.defaults.insert(namespace.into(), ttl);
        self
    }

    /// Override the global fallback TTL.
    pub fn with_fallback(mut self, ttl: Duration) -> Self {
        self.fallback = ttl;
        self
    }

    /// Default TTL registered for a namespace, if any.
    pub fn namespace_default(&self, namespace: &str) -> Option<Duration> {
        self.defaults.get(namespace).copied()
    }

    /// Resolve the effective TTL for a write.
    ///
    /// Resolution order: namespace default, then the explicit per-call TTL,
    /// then the global fallback. A registered namespace default silently
    /// overrides an explicit `ttl` argument; callers that need a different
    /// TTL for a registered namespace must go through [`TtlPolicy::with_namespace`].
    pub fn resolve(&self, namespace: Option<&str>, explicit: Option<Duration>) -> Duration {
        namespace
            .and_then(|ns| self.namespace_default(ns))
            .or(explicit)
            .unwrap_or(self.fallback)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table() {
        let policy = TtlPolicy::new();
        assert_eq!(
            policy.namespace_default("bookings"),
            Some(Duration::from_secs(120))
        );
        assert_eq!(
            policy.namespace_default("auth"),
            Some(Duration::from_secs(86400))
        );
        assert_eq!(policy.namespace_default("nonexistent"), None);
    }

    #[test]
    fn test_namespace_default_overrides_explicit_ttl() {
        let policy = TtlPolicy::new();
        let ttl = policy.resolve(Some("bookings"), Some(Duration::from_secs(999_999)));
        assert_eq!(ttl, Duration::from_secs(120));
    }

    #[test]
    fn test_explicit_ttl_applies_for_unregistered_namespace() {
        let policy = TtlPolicy::new();
        let ttl = policy.resolve(Some("scratch"), Some(Duration::from_secs(42)));
        assert_eq!(ttl, Duration::from_secs(42));
    }

    #[test]
    fn test_global_fallback() {
        let policy = TtlPolicy::new();
        assert_eq!(policy.resolve(None, None), DEFAULT_TTL);
        assert_eq!(policy.resolve(Some("scratch"), None), DEFAULT_TTL);
    }

    #[test]
    fn test_builder_overrides() {
        let policy = TtlPolicy::empty()
            .with_namespace("bookings", Duration::from_secs(5))
            .with_fallback(Duration::from_secs(7));
        assert_eq!(
            policy.resolve(Some("bookings"), None),
            Duration::from_secs(5)
        );
        assert_eq!(policy.resolve(None, None), Duration::from_secs(7));
    }
}
