//! HTTP API - axum routers, extractors and JSON error mapping.
//!
//! Every handler follows the same shape: authenticate through [`auth::AuthUser`],
//! call into [`crate::core`], and return JSON. Failures become an
//! [`error::ApiError`] with an `{"error": ...}` body.

use crate::config::server::ServerConfig;
use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub mod applications;
pub mod auth;
pub mod connections;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod forms;
pub mod goals;
pub mod health;
pub mod notifications;
pub mod scholarships;
pub mod settings;

/// Shared state handed to every handler
#[derive(Debug)]
pub struct AppState {
    /// Database connection pool
    pub database: DatabaseConnection,
    /// Server settings (session TTL, cookie flags, CORS)
    pub config: ServerConfig,
}

impl AppState {
    /// Wraps the connection and settings for sharing across handlers.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: ServerConfig) -> Arc<Self> {
        Arc::new(Self { database, config })
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_allow.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allow
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

/// Builds the full application router under `/api`.
pub fn app_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    let api = Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(scholarships::router())
        .merge(applications::router())
        .merge(dashboard::router())
        .merge(goals::router())
        .merge(settings::router())
        .merge(connections::router())
        .merge(notifications::router())
        .merge(forms::router());

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
