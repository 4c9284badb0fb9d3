// Presentation layer - mock log server used by the demo and for manual testing
pub mod app_state;
pub mod handlers;
pub mod mock_log;

use crate::presentation::app_state::MockServerState;
use crate::presentation::handlers::{health_check, list_logs, log_data, log_header};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<MockServerState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/logs", get(list_logs))
        .route("/logs/:id/header", get(log_header))
        .route("/logs/:id/data", get(log_data))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
