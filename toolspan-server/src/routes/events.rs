//! Event ingestion route

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode};
use toolspan_core::{Event, EventReport};

use crate::error::CollectorResult;
use crate::AppState;

/// Record one start or stop report
///
/// The body is validated in full before the collector lock is taken, so a
/// rejected report never touches the log.
pub async fn report(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> CollectorResult<StatusCode> {
    let report = EventReport::from_slice(&body)?;
    let event = Event::try_from(report)?;

    let mut collector = state.lock()?;
    tracing::info!(
        id = %event.id,
        kind = %event.kind,
        tool = %event.tool,
        pkg = %event.pkg,
        live = collector.live().len(),
        "got event"
    );
    collector.record(event);

    Ok(StatusCode::OK)
}
