//! Error types for Toolspan core operations
//!
//! Every variant has a stable error code and maps onto an HTTP status,
//! so the collector daemon can turn a rejected report into a response
//! without inspecting the message text.
//!
//! # Example
//!
//! ```rust
//! use toolspan_core::error::CoreError;
//!
//! let err = CoreError::UnknownEventKind { kind: "pause".to_string() };
//! assert_eq!(err.error_code(), "UNKNOWN_EVENT_KIND");
//! assert_eq!(err.http_status_code(), 400);
//! assert!(err.is_client_error());
//! ```

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while ingesting or rendering events
#[derive(Error, Debug)]
pub enum CoreError {
    /// Reported event kind is neither `start` nor `stop`
    #[error("bad event kind {kind}")]
    UnknownEventKind { kind: String },

    /// Event body could not be decoded
    #[error("malformed event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    /// Collector state lock is poisoned (panic occurred while holding lock)
    #[error("collector state lock poisoned. This is a bug; please report it.")]
    StateLocked,
}

impl CoreError {
    /// Returns true if this error is a client error (4xx equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(self.http_status_code(), 400..=499)
    }

    /// Returns the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::UnknownEventKind { .. } => "UNKNOWN_EVENT_KIND",
            CoreError::MalformedEvent(_) => "MALFORMED_EVENT",
            CoreError::StateLocked => "STATE_LOCKED",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - the caller sent something we can't record
            CoreError::UnknownEventKind { .. } | CoreError::MalformedEvent(_) => 400,

            // 500 Internal Server Error - our fault
            CoreError::StateLocked => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_is_client_error() {
        let err = CoreError::UnknownEventKind {
            kind: "pause".to_string(),
        };
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "bad event kind pause");
    }

    #[test]
    fn test_malformed_event_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert_eq!(err.error_code(), "MALFORMED_EVENT");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_lock_poison_is_server_error() {
        assert_eq!(CoreError::StateLocked.http_status_code(), 500);
        assert!(!CoreError::StateLocked.is_client_error());
    }
}
