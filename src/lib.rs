//! # bookingkit
//!
//! Client-side data layer for an event-booking admin dashboard.
//!
//! ## Features
//!
//! - **Tiered TTL cache:** one [`CacheStore`] over three backing stores
//!   (in-process, session-scoped, durable), with namespace-based
//!   invalidation and a periodic expiry sweep
//! - **Cache-aware fetch:** [`FetchClient`] wraps any [`Transport`] with
//!   cache-first reads, write-through, linear-backoff retry, and
//!   per-instance request de-duplication
//! - **Enum mapping:** [`EnumMapper`] memoizes server-declared status and
//!   event-type listings, with sentinel lookups for unknown codes
//! - **Booking view models:** [`transform_bookings`] defensively normalizes
//!   raw booking records for the UI
//! - **Event-driven invalidation:** [`EventBus`] broadcasts domain events
//!   that clear the affected cache namespaces
//!
//! ## Quick Start
//!
//! ```ignore
//! use bookingkit::{
//!     CacheStore, EventBus, FetchClient, FetchOptions, CLEANUP_INTERVAL,
//!     events::{self, DomainEvent},
//! };
//! use std::sync::Arc;
//!
//! // 1. One shared cache, wired at process start
//! let cache = Arc::new(CacheStore::open("admin-cache.json").await?);
//! let sweeper = cache.spawn_cleanup(CLEANUP_INTERVAL);
//!
//! // 2. Event bus drives targeted invalidation
//! let bus = EventBus::new();
//! let listener = events::spawn_invalidation(&bus, Arc::clone(&cache));
//!
//! // 3. Fetch through the cache
//! let client = FetchClient::new(transport, Arc::clone(&cache));
//! let bookings = client
//!     .get("/api/bookings", FetchOptions::cached("bookings"))
//!     .await?;
//!
//! // 4. Mutations publish events; the listener invalidates
//! client.post("/api/bookings", payload, &["bookings"]).await?;
//! bus.publish(DomainEvent::BookingCreate);
//! ```

#[macro_use]
extern crate log;

pub mod cache;
pub mod entry;
pub mod enums;
pub mod error;
pub mod events;
pub mod fetch;
pub mod key;
pub mod policy;
pub mod store;
pub mod transform;

// Re-exports for convenience
pub use cache::{CacheStats, CacheStore, SetOptions, CLEANUP_INTERVAL};
pub use entry::CacheEntry;
pub use enums::{EnumEntry, EnumMapper, EnumSource, EnumVariant};
pub use error::{Error, Result};
pub use events::{DomainEvent, EventBus};
pub use fetch::{FetchClient, FetchOptions, FetchOutcome, Request, Response, RetryPolicy, Transport};
pub use key::CacheKeyBuilder;
pub use policy::TtlPolicy;
pub use store::{StorageBackend, StorageTier};
pub use transform::{transform_bookings, BookingViewModel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
