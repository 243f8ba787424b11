//! Server-declared enumeration mapper.
//!
//! Booking status and event type arrive as numeric codes; the backend also
//! serves the listings that give those codes symbolic and display names
//! (by convention 1=pending, 2=confirmed, 3=declined, 4=cancelled). The
//! mapper loads both listings once, memoizes them until explicitly reset,
//! and answers lookups with sentinels instead of failing on unknown codes.

use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// One entry of a server enumeration listing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumEntry {
    /// Numeric code used on the wire.
    pub value: i64,
    /// Symbolic name, e.g. `"Confirmed"`.
    pub name: String,
    /// Human-readable label shown in the UI.
    pub display_name: String,
}

/// Resolved names for a numeric code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub display_name: String,
}

impl EnumVariant {
    /// Sentinel returned for codes the mapper does not know.
    pub fn unknown() -> Self {
        EnumVariant {
            name: "Unknown".to_string(),
            display_name: "Unknown".to_string(),
        }
    }
}

/// Trait for the enumeration listings source.
///
/// Backed by the REST API in production; tests use in-memory mocks.
#[allow(async_fn_in_trait)]
pub trait EnumSource: Send + Sync {
    /// Booking status listing.
    ///
    /// # Errors
    /// Returns `Err` if the listing cannot be fetched.
    async fn booking_statuses(&self) -> Result<Vec<EnumEntry>>;

    /// Event type listing.
    ///
    /// # Errors
    /// Returns `Err` if the listing cannot be fetched.
    async fn event_types(&self) -> Result<Vec<EnumEntry>>;
}

#[derive(Default)]
struct Tables {
    statuses: Vec<EnumEntry>,
    event_types: Vec<EnumEntry>,
}

/// Lookup tables translating numeric codes to names.
///
/// `load` populates both tables all-or-nothing; a partial fetch leaves the
/// mapper empty so callers can treat lookups as uniformly degraded. Once
/// loaded, tables are immutable until [`EnumMapper::reset`].
#[derive(Default)]
pub struct EnumMapper {
    tables: RwLock<Tables>,
    loaded: AtomicBool,
}

impl EnumMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch both enumerations concurrently and populate the tables.
    ///
    /// Returns `true` only if both listings were fetched; on any failure the
    /// tables stay empty and the call returns `false`. Idempotent: once
    /// loaded, further calls return `true` without refetching.
    pub async fn load<S: EnumSource>(&self, source: &S) -> bool {
        if self.loaded.load(Ordering::Acquire) {
            return true;
        }

        match futures::try_join!(source.booking_statuses(), source.event_types()) {
            Ok((statuses, event_types)) => {
                {
                    let mut tables = self.tables.write().expect("enum tables lock poisoned");
                    tables.statuses = statuses;
                    tables.event_types = event_types;
                }
                self.loaded.store(true, Ordering::Release);
                info!("Enum tables loaded");
                true
            }
            Err(e) => {
                warn!("Enum load failed, lookups stay degraded: {}", e);
                false
            }
        }
    }

    /// Whether the tables are populated.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Drop the memoized tables; the next `load` refetches.
    pub fn reset(&self) {
        self.loaded.store(false, Ordering::Release);
        let mut tables = self.tables.write().expect("enum tables lock poisoned");
        *tables = Tables::default();
        debug!("Enum tables reset");
    }

    /// Names for a booking status code; sentinel for unknown codes.
    pub fn booking_status(&self, code: i64) -> EnumVariant {
        self.lookup_booking_status(code)
            .unwrap_or_else(EnumVariant::unknown)
    }

    /// Names for an event type code; sentinel for unknown codes.
    pub fn event_type(&self, code: i64) -> EnumVariant {
        let tables = self.tables.read().expect("enum tables lock poisoned");
        find(&tables.event_types, code).unwrap_or_else(EnumVariant::unknown)
    }

    /// Names for a booking status code, `None` when the table has no entry.
    ///
    /// Used by the transformer, which needs to distinguish "unknown code"
    /// from a status actually named Unknown.
    pub fn lookup_booking_status(&self, code: i64) -> Option<EnumVariant> {
        let tables = self.tables.read().expect("enum tables lock poisoned");
        find(&tables.statuses, code)
    }

    /// Reverse lookup: status code for an exact display name.
    ///
    /// Linear scan in listing order; if two codes ever share a display name
    /// the first match wins, with no uniqueness guarantee.
    pub fn status_value(&self, display_name: &str) -> Option<i64> {
        let tables = self.tables.read().expect("enum tables lock poisoned");
        tables
            .statuses
            .iter()
            .find(|entry| entry.display_name == display_name)
            .map(|entry| entry.value)
    }
}

fn find(entries: &[EnumEntry], code: i64) -> Option<EnumVariant> {
    entries.iter().find(|e| e.value == code).map(|e| EnumVariant {
        name: e.name.clone(),
        display_name: e.display_name.clone(),
    })
}
