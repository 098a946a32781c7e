//! Health and readiness probes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::state::AppState;

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe: verifies the workflow stream is reachable.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.workflows.len().await {
        Ok(depth) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "workflow_queue_depth": depth })),
        ),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "not ready", "detail": "workflow stream unreachable" })),
            )
        }
    }
}
