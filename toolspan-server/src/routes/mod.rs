//! HTTP route handlers

mod admin;
mod events;
mod render;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::error::CollectorError;
use crate::AppState;

/// Create the router with all routes
///
/// Every request, including rejected ones, counts as activity for the
/// idle monitor.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(admin::ping))
        .route("/event", post(events::report))
        .route("/status", get(admin::status))
        .route("/die", get(admin::die))
        .route("/chart", get(render::chart))
        .route("/trace", get(render::trace))
        .fallback(bad_path)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            track_activity,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn track_activity(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    state.idle.touch();
    next.run(request).await
}

async fn bad_path(uri: Uri) -> CollectorError {
    CollectorError::BadPath {
        path: uri.path().to_string(),
    }
}
