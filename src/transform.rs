//! Booking record transformer.
//!
//! Normalizes raw booking payloads from the REST API into stable view
//! models. The transformer is pure and total: every field access is
//! defaulted, a malformed record yields a fully-defaulted view model, and
//! one bad record never aborts the batch.
//!
//! Raw records are JSON objects read for these fields (everything else is
//! carried along untouched in `original_data`):
//!
//! ```text
//! {
//!   "id": 42,
//!   "client": { "name": "...", "email": "...", "phone": "..." },
//!   "event_date": "2026-03-05T14:30:00Z",
//!   "package_name": "Gold",
//!   "services": [
//!     { "custom_price": 120.0, "quantity": 2, "service": { "price": 100.0 } },
//!     null
//!   ],
//!   "status": 2
//! }
//! ```

use crate::enums::EnumMapper;
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

/// Shown when the record carries no client name.
pub const UNKNOWN_CUSTOMER: &str = "Unknown customer";
/// Shown when the record carries no event date.
pub const NO_DATE_SET: &str = "No date set";
/// Shown when the event date does not parse.
pub const INVALID_DATE: &str = "Invalid date";
/// Symbolic status fallback. Lowercase, matched by status filters.
pub const UNKNOWN_STATUS: &str = "unknown";
/// Display status fallback. Deliberately differs from the symbolic
/// fallback in text and case; both strings are load-bearing for filters.
pub const UNKNOWN_STATUS_DISPLAY: &str = "Unknown status";

const NO_EMAIL: &str = "No email";
const NO_PHONE: &str = "No phone";
const CUSTOM_PACKAGE: &str = "Custom package";

/// Client contact details, each field individually defaulted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Booked package summary with the computed total.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    /// Human-readable service count, e.g. `"3 services"`.
    pub duration: String,
    /// Sum of effective unit price times quantity over the service lines.
    pub total_price: f64,
}

/// Normalized, UI-ready representation of a raw booking record.
#[derive(Clone, Debug, Serialize)]
pub struct BookingViewModel {
    pub id: i64,
    pub client: ClientInfo,
    /// Formatted event date, or a sentinel when missing/unparsable.
    pub date_time: String,
    pub package: PackageInfo,
    /// Lowercased symbolic status name, `"unknown"` when unmapped.
    pub status: String,
    /// Display label, `"Unknown status"` when unmapped.
    pub status_display: String,
    /// Untransformed source record, kept for fallback access such as
    /// sorting by the raw event date.
    pub original_data: Value,
}

/// Transform a batch of raw booking records into view models.
///
/// Maps every record independently; malformed records produce defaulted
/// view models instead of aborting the batch.
pub fn transform_bookings(mapper: &EnumMapper, raw: &[Value]) -> Vec<BookingViewModel> {
    raw.iter().map(|record| transform_one(mapper, record)).collect()
}

fn transform_one(mapper: &EnumMapper, record: &Value) -> BookingViewModel {
    let (status, status_display) = match record.get("status").and_then(Value::as_i64) {
        Some(code) => match mapper.lookup_booking_status(code) {
            Some(variant) => (variant.name.to_lowercase(), variant.display_name),
            None => (UNKNOWN_STATUS.to_string(), UNKNOWN_STATUS_DISPLAY.to_string()),
        },
        None => (UNKNOWN_STATUS.to_string(), UNKNOWN_STATUS_DISPLAY.to_string()),
    };

    BookingViewModel {
        id: record.get("id").and_then(Value::as_i64).unwrap_or(0),
        client: client_info(record.get("client")),
        date_time: format_event_date(record.get("event_date")),
        package: package_info(record),
        status,
        status_display,
        original_data: record.clone(),
    }
}

fn client_info(client: Option<&Value>) -> ClientInfo {
    let field = |name: &str, fallback: &str| {
        client
            .and_then(|c| c.get(name))
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string()
    };
    ClientInfo {
        name: field("name", UNKNOWN_CUSTOMER),
        email: field("email", NO_EMAIL),
        phone: field("phone", NO_PHONE),
    }
}

fn format_event_date(raw: Option<&Value>) -> String {
    let Some(text) = raw.and_then(Value::as_str) else {
        return NO_DATE_SET.to_string();
    };
    if text.trim().is_empty() {
        return NO_DATE_SET.to_string();
    }
    match parse_event_date(text) {
        Some(dt) => dt.format("%B %-d, %Y at %-I:%M %p").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

fn parse_event_date(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    // Bare dates render at midnight.
    chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn package_info(record: &Value) -> PackageInfo {
    let services = record
        .get("services")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut line_count = 0usize;
    let mut total_price = 0.0;
    for line in services {
        // Null service lines are skipped entirely.
        if line.is_null() {
            continue;
        }
        line_count += 1;

        let unit_price = line
            .get("custom_price")
            .and_then(Value::as_f64)
            .or_else(|| {
                line.get("service")
                    .and_then(|s| s.get("price"))
                    .and_then(Value::as_f64)
            })
            .unwrap_or(0.0);
        let quantity = line.get("quantity").and_then(Value::as_f64).unwrap_or(1.0);
        total_price += unit_price * quantity;
    }

    let duration = if line_count == 1 {
        "1 service".to_string()
    } else {
        format!("{} services", line_count)
    };

    PackageInfo {
        name: record
            .get("package_name")
            .and_then(Value::as_str)
            .unwrap_or(CUSTOM_PACKAGE)
            .to_string(),
        duration,
        total_price,
    }
}
