//! Application endpoints.

use super::{
    AppState,
    auth::AuthUser,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
};
use crate::{
    core::application::{self, ApplicationWithScholarship, NewApplication, StatusUpdate},
    entities::application as application_entity,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    /// Another user's applications, visible with `view_applications`
    user_id: Option<i64>,
    limit: Option<u64>,
}

async fn list(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<ApplicationWithScholarship>>> {
    let owner_id = query.user_id.unwrap_or(auth.user.id);
    let applications =
        application::list_applications_for(&state.database, auth.user.id, owner_id, query.limit)
            .await?;
    Ok(Json(applications))
}

async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(input): ApiJson<NewApplication>,
) -> ApiResult<(StatusCode, Json<application_entity::Model>)> {
    let created = application::create_application(&state.database, auth.user.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Owners and connections holding `manage_applications` may move an application.
async fn update_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<Json<application_entity::Model>> {
    let updated =
        application::update_application_status(&state.database, auth.user.id, id, update).await?;
    Ok(Json(updated))
}

/// Routes mounted under `/api`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/applications", get(list).post(create))
        .route("/applications/{id}/status", patch(update_status))
}
