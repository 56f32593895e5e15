//! Liveness, diagnostics and termination

use std::sync::Arc;

use axum::{extract::State, http::StatusCode};

use crate::error::CollectorResult;
use crate::AppState;

/// Liveness probe used by the bootstrap launcher
pub async fn ping() -> StatusCode {
    StatusCode::OK
}

/// Human-readable snapshot of the collector state
pub async fn status(State(state): State<Arc<AppState>>) -> CollectorResult<String> {
    let collector = state.lock()?;
    Ok(collector.status().to_string())
}

/// Stop the daemon without draining
///
/// Taken under the collector lock so a report already being recorded
/// finishes first.
pub async fn die(
    State(state): State<Arc<AppState>>,
) -> CollectorResult<(StatusCode, &'static str)> {
    let _collector = state.lock()?;
    tracing::warn!("terminate requested over HTTP");
    state.idle.terminate();
    Ok((StatusCode::OK, "terminating\n"))
}
