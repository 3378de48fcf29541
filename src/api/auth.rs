//! Session authentication and the `/api/auth` endpoints.
//!
//! A session token travels either in the `session_token` cookie (browsers) or
//! as `Authorization: Bearer <token>` (API clients). Login and registration
//! set the cookie and also return the token in the body.

use super::{
    AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use crate::{
    config::server::ServerConfig,
    core::{
        session,
        user::{self, NewUser},
    },
    entities::{session as session_entity, user as user_entity},
    errors::Error,
};
use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "session_token";

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Account behind the session
    pub user: user_entity::Model,
    /// Token the request was authenticated with
    pub token: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Reads the session token from the cookie, falling back to the bearer header.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(ApiError(Error::Unauthorized))?;
        let user = session::validate_session(&state.database, &token)
            .await?
            .ok_or(ApiError(Error::Unauthorized))?;
        Ok(Self { user, token })
    }
}

/// `Set-Cookie` value that stores `token` for `ttl_hours`.
pub fn session_cookie(token: &str, ttl_hours: i64, secure: bool) -> ApiResult<HeaderValue> {
    let max_age = ttl_hours.checked_mul(3600).ok_or_else(|| {
        ApiError(Error::Config {
            message: format!("Session TTL of {ttl_hours} hours is out of range"),
        })
    })?;
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| {
        ApiError(Error::Config {
            message: format!("Invalid session cookie: {e}"),
        })
    })
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("session_token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body returned after login or registration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: user_entity::Model,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Body returned by the session check
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: user_entity::Model,
}

fn signed_in(
    config: &ServerConfig,
    status: StatusCode,
    user: user_entity::Model,
    session: session_entity::Model,
) -> ApiResult<impl IntoResponse + use<>> {
    let cookie = session_cookie(&session.token, config.session_ttl_hours, config.cookie_secure)?;
    Ok((
        status,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(AuthResponse {
            user,
            token: session.token,
            expires_at: session.expires_at,
        }),
    ))
}

async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<impl IntoResponse> {
    let user = user::register_user(&state.database, input).await?;
    let session =
        session::create_session(&state.database, user.id, state.config.session_ttl_hours).await?;
    signed_in(&state.config, StatusCode::CREATED, user, session)
}

async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = user::authenticate(&state.database, &input.email, &input.password).await?;
    let session =
        session::create_session(&state.database, user.id, state.config.session_ttl_hours).await?;
    info!(user_id = user.id, "User logged in");
    signed_in(&state.config, StatusCode::OK, user, session)
}

async fn logout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    session::revoke_session(&state.database, &auth.token).await?;
    info!(user_id = auth.user.id, "User logged out");
    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
    ))
}

async fn current_session(auth: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse { user: auth.user })
}

/// Routes under `/api/auth`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
}
