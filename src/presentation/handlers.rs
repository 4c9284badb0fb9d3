// HTTP request handlers for the mock log server
use crate::domain::log_stream::StreamHeader;
use crate::infrastructure::response_adapter::ResponseShape;
use crate::infrastructure::wire::{FlatLogData, NestedLog, NestedLogData, NestedLogResponse};
use crate::presentation::app_state::MockServerState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start: f64,
    pub end: f64,
    pub shape: Option<ResponseShape>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all log stream ids
pub async fn list_logs(State(state): State<Arc<MockServerState>>) -> Json<Vec<String>> {
    Json(state.logs.keys().cloned().collect())
}

pub async fn log_header(
    Path(id): Path<String>,
    State(state): State<Arc<MockServerState>>,
) -> Result<Json<StreamHeader>, StatusCode> {
    let log = state.logs.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(log.header()))
}

/// Rows within [start, end] in the requested response shape
pub async fn log_data(
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<MockServerState>>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let log = state.logs.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let data = log.rows(query.start, query.end);
    tracing::debug!(
        "Serving {} rows of {} for [{}, {}]",
        data.len(),
        id,
        query.start,
        query.end
    );

    let body = match query.shape.unwrap_or_default() {
        ResponseShape::Flat => serde_json::to_value(FlatLogData {
            mnemonics: log.mnemonics().to_vec(),
            data,
        }),
        ResponseShape::Nested => serde_json::to_value(NestedLogResponse {
            logs: vec![NestedLog {
                uid: Some(id.clone()),
                log_data: Some(NestedLogData {
                    mnemonic_list: log.mnemonics().join(","),
                    unit_list: None,
                    data,
                }),
            }],
        }),
    };

    body.map(Json).map_err(|e| {
        tracing::error!("Failed to encode log data for {}: {}", id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
