//! Account settings: profile, password and account deletion.

use super::{
    AppState,
    auth::{AuthUser, clear_session_cookie},
    error::ApiResult,
    extract::ApiJson,
};
use crate::{
    core::user::{self, ProfileUpdate},
    entities::user as user_entity,
};
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{delete, get, put},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordChange {
    current_password: String,
    new_password: String,
}

async fn profile(auth: AuthUser) -> Json<user_entity::Model> {
    Json(auth.user)
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<user_entity::Model>> {
    let updated = user::update_profile(&state.database, auth.user.id, update).await?;
    Ok(Json(updated))
}

/// Changes the password and signs out every other session.
async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(body): ApiJson<PasswordChange>,
) -> ApiResult<StatusCode> {
    user::change_password(
        &state.database,
        auth.user.id,
        &body.current_password,
        &body.new_password,
        Some(auth.token.as_str()),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    user::soft_delete_user(&state.database, auth.user.id).await?;
    info!(user_id = auth.user.id, "Account deleted");
    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
    ))
}

/// Routes mounted under `/api`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/settings/profile", get(profile).put(update_profile))
        .route("/settings/password", put(change_password))
        .route("/settings/account", delete(delete_account))
}
