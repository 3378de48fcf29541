//! Liveness probe.

use super::AppState;
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::error;

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.database.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            error!(error = %e, "Database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

/// Routes mounted under `/api`
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
