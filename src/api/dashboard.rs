//! Dashboard endpoint.

use super::{AppState, auth::AuthUser, error::ApiResult};
use crate::core::dashboard::{self, DashboardSummary};
use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use std::sync::Arc;

async fn show(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<DashboardSummary>> {
    let today = Utc::now().date_naive();
    let summary = dashboard::load_dashboard(&state.database, auth.user, today).await?;
    Ok(Json(summary))
}

/// Routes mounted under `/api`
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(show))
}
