//! Chart and trace rendering routes

use std::sync::Arc;

use axum::{extract::State, response::Json};
use toolspan_core::{render_chart, render_trace, TraceDocument};

use crate::error::CollectorResult;
use crate::AppState;

/// Live-concurrency chart, one line per event
pub async fn chart(State(state): State<Arc<AppState>>) -> CollectorResult<String> {
    let collector = state.lock()?;
    Ok(render_chart(collector.log().as_slice()))
}

/// Trace-viewer JSON of every closed invocation
pub async fn trace(State(state): State<Arc<AppState>>) -> CollectorResult<Json<TraceDocument>> {
    let collector = state.lock()?;
    let document = render_trace(collector.log().as_slice(), collector.started_at());
    tracing::debug!(intervals = document.trace_events.len(), "rendered trace");
    Ok(Json(document))
}
