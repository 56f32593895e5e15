//! Error types for the collector daemon

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use toolspan_core::CoreError;

/// Result type for daemon operations
pub type CollectorResult<T> = Result<T, CollectorError>;

/// Errors that can occur in the collector daemon
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Another daemon already owns the listening endpoint
    #[error("collector already running on {addr}")]
    AlreadyRunning { addr: SocketAddr },

    /// Listening endpoint could not be bound for another reason
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server stopped with an I/O error
    #[error("server error: {0}")]
    Serve(std::io::Error),

    /// Request for a path the collector doesn't serve
    #[error("bad path {path}")]
    BadPath { path: String },

    /// Event ingestion or rendering failed
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CollectorError {
    /// Returns the HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            CollectorError::BadPath { .. } => 400,
            CollectorError::Core(err) => err.http_status_code(),
            CollectorError::AlreadyRunning { .. }
            | CollectorError::Bind { .. }
            | CollectorError::Serve(_) => 500,
        }
    }
}

impl IntoResponse for CollectorError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), "rejected request: {}", self);
        } else {
            tracing::error!(status = status.as_u16(), "request failed: {}", self);
        }

        (status, format!("{}\n", self)).into_response()
    }
}
