//! Error types for the booking data layer.

use std::fmt;

/// Result type for data-layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the booking data layer.
///
/// Cache-backend failures (`BackendError`, `DeserializationError`) are
/// recovered inside the cache layer: they are logged and degrade to a miss
/// or a memory-tier write, never reaching callers. The variants that do
/// surface are transport failures after retries are exhausted and producer
/// failures propagated through `get_or_set`.
#[derive(Debug, Clone)]
pub enum Error {
    /// Serialization failed when converting a value to cache JSON.
    SerializationError(String),

    /// Deserialization failed when reading a cached entry.
    ///
    /// Indicates corrupted or malformed data in a backing store.
    /// The cache treats this as a miss and evicts the entry.
    DeserializationError(String),

    /// Backing-store error (file write failed, quota, disabled storage).
    ///
    /// The cache degrades to the in-process store on write, and to a miss
    /// on read. Callers of `CacheStore` never observe this variant.
    BackendError(String),

    /// Transport-level failure during an outbound request.
    ///
    /// Raised by the fetch wrapper once its retry budget is exhausted.
    TransportError(String),

    /// Remote endpoint answered with a non-success status code.
    HttpStatus {
        /// HTTP status code returned by the endpoint
        status: u16,
        /// Request URL, for diagnostics
        url: String,
    },

    /// Enumeration listings could not be loaded from the source.
    ///
    /// Callers see this as `load() == false`; lookups stay degraded
    /// (sentinel values) until a retry succeeds.
    EnumLoadError(String),

    /// Configuration error during construction.
    ConfigError(String),

    /// Generic error with custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::TransportError(msg) => write!(f, "Transport error: {}", msg),
            Error::HttpStatus { status, url } => {
                write!(f, "HTTP {} from {}", status, url)
            }
            Error::EnumLoadError(msg) => write!(f, "Enum load error: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::BackendError(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::BackendError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}
