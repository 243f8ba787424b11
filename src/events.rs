//! Domain event bus and cache invalidation wiring.
//!
//! Cross-component invalidation goes through an explicit typed
//! publish/subscribe channel instead of an ambient broadcast: producers and
//! consumers are handed an [`EventBus`] by injection. The event names and
//! their invalidation targets are part of the external contract.
//!
//! Uses a tokio broadcast channel for event distribution; receivers that lag
//! behind skip missed events and keep going.

use crate::cache::CacheStore;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default broadcast channel capacity.
const CHANNEL_CAPACITY: usize = 64;

/// Domain events other components emit on mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    GalleryUpload,
    GalleryDelete,
    GalleryPublish,
    BookingStatusUpdate,
    BookingCreate,
    BookingDeclined,
    UserLogout,
    UserLogin,
}

/// What an event does to the cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidationAction {
    /// Invalidate these namespace patterns.
    Patterns(&'static [&'static str]),
    /// Drop the entire cache.
    ClearAll,
}

impl DomainEvent {
    /// Cache impact of this event. The mapping is contract, not policy.
    pub fn invalidation(&self) -> InvalidationAction {
        match self {
            DomainEvent::GalleryUpload | DomainEvent::GalleryDelete => {
                InvalidationAction::Patterns(&["gallery", "highlights"])
            }
            DomainEvent::GalleryPublish => InvalidationAction::Patterns(&["gallery-public"]),
            DomainEvent::BookingStatusUpdate
            | DomainEvent::BookingCreate
            | DomainEvent::BookingDeclined => {
                InvalidationAction::Patterns(&["bookings", "analytics"])
            }
            DomainEvent::UserLogout => InvalidationAction::ClearAll,
            DomainEvent::UserLogin => InvalidationAction::Patterns(&["auth"]),
        }
    }
}

/// In-process publish/subscribe hub for domain events.
///
/// Clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(CHANNEL_CAPACITY)
    }

    /// Bus with an explicit channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        EventBus { tx }
    }

    /// Publish an event to every subscriber.
    ///
    /// Publishing with no subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: DomainEvent) {
        match self.tx.send(event) {
            Ok(n) => debug!("Published {:?} to {} subscribers", event, n),
            Err(_) => debug!("Published {:?} with no subscribers", event),
        }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the listener that turns domain events into cache invalidation.
///
/// Runs until the bus is dropped (or the handle is aborted). Lagged
/// receivers log and continue; invalidation of a skipped event is lost,
/// which only costs extra refetches.
pub fn spawn_invalidation(bus: &EventBus, cache: Arc<CacheStore>) -> tokio::task::JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => apply_invalidation(&cache, event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Invalidation listener lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn apply_invalidation(cache: &CacheStore, event: DomainEvent) {
    match event.invalidation() {
        InvalidationAction::Patterns(patterns) => {
            for pattern in patterns {
                cache.invalidate(pattern).await;
            }
            debug!("Applied invalidation for {:?}", event);
        }
        InvalidationAction::ClearAll => {
            cache.clear().await;
            debug!("Cleared cache for {:?}", event);
        }
    }
}
