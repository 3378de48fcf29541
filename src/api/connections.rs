//! Family and counselor connection endpoints.

use super::{
    AppState,
    auth::AuthUser,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
};
use crate::{
    core::connection::{self, ConnectionRequest, ConnectionView},
    entities::user_connection,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct RespondBody {
    accept: bool,
}

async fn list(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ConnectionView>>> {
    let connections = connection::list_connections(&state.database, auth.user.id).await?;
    Ok(Json(connections))
}

async fn request(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(input): ApiJson<ConnectionRequest>,
) -> ApiResult<(StatusCode, Json<user_connection::Model>)> {
    let created = connection::request_connection(&state.database, auth.user.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn respond(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<RespondBody>,
) -> ApiResult<Json<user_connection::Model>> {
    let updated =
        connection::respond_to_connection(&state.database, auth.user.id, id, body.accept).await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    connection::remove_connection(&state.database, auth.user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Routes mounted under `/api`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/connections", get(list).post(request))
        .route("/connections/{id}", delete(remove))
        .route("/connections/{id}/respond", post(respond))
}
