//! Scholarship endpoints.

use super::{
    AppState,
    auth::AuthUser,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
};
use crate::{
    core::scholarship::{self, NewScholarship, ScholarshipFilter, ScholarshipWithApplication},
    entities::{scholarship as scholarship_entity, sea_orm_active_enums::ScholarshipStatus},
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: ScholarshipStatus,
}

async fn list(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiQuery(filter): ApiQuery<ScholarshipFilter>,
) -> ApiResult<Json<Vec<ScholarshipWithApplication>>> {
    let scholarships = scholarship::list_scholarships(&state.database, auth.user.id, &filter).await?;
    Ok(Json(scholarships))
}

async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(input): ApiJson<NewScholarship>,
) -> ApiResult<(StatusCode, Json<ScholarshipWithApplication>)> {
    let created = scholarship::create_scholarship(&state.database, auth.user.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<StatusBody>,
) -> ApiResult<Json<scholarship_entity::Model>> {
    let updated =
        scholarship::update_scholarship_status(&state.database, auth.user.id, id, body.status)
            .await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    scholarship::delete_scholarship(&state.database, auth.user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Routes mounted under `/api`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/scholarships", get(list).post(create))
        .route("/scholarships/{id}", delete(remove))
        .route("/scholarships/{id}/status", patch(update_status))
}
