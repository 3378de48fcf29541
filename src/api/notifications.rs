//! Notification endpoints.

use super::{
    AppState,
    auth::AuthUser,
    error::ApiResult,
    extract::{ApiPath, ApiQuery},
};
use crate::{core::notification, entities::notification as notification_entity};
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    #[serde(default)]
    unread_only: bool,
    limit: Option<u64>,
}

#[derive(Debug, Serialize)]
struct Updated {
    updated: u64,
}

async fn list(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<notification_entity::Model>>> {
    let notifications = notification::list_notifications(
        &state.database,
        auth.user.id,
        query.unread_only,
        query.limit,
    )
    .await?;
    Ok(Json(notifications))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<notification_entity::Model>> {
    let updated = notification::mark_read(&state.database, auth.user.id, id).await?;
    Ok(Json(updated))
}

async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Updated>> {
    let updated = notification::mark_all_read(&state.database, auth.user.id).await?;
    Ok(Json(Updated { updated }))
}

/// Routes mounted under `/api`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notifications", get(list))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/{id}/read", post(mark_read))
}
