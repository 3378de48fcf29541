//! Maps [`crate::errors::Error`] onto HTTP responses.
//!
//! Bodies are always `{"error": "..."}`; validation failures add a `fields`
//! object. Server-side failures are logged and reported with a generic
//! message so internals never reach the client.

use crate::errors::{Error, FieldErrors};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError(pub Error);

/// Handler result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(Error::Database(err))
    }
}

fn bad_request(message: String) -> ApiError {
    ApiError(Error::Validation {
        message,
        fields: FieldErrors::new(),
    })
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl ApiError {
    /// HTTP status for the wrapped error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation { .. }
            | Error::InvalidAmount { .. }
            | Error::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } | Error::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
            Error::Config { .. }
            | Error::Database(_)
            | Error::PasswordHash { .. }
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            Error::Validation { message, fields } => ErrorBody {
                error: message,
                fields: (!fields.is_empty()).then_some(fields),
            },
            Error::Unauthorized => ErrorBody {
                error: "Unauthorized".to_string(),
                fields: None,
            },
            other if status.is_server_error() => {
                error!(error = %other, "Request failed");
                ErrorBody {
                    error: "Internal server error".to_string(),
                    fields: None,
                }
            }
            other => {
                warn!(status = status.as_u16(), error = %other, "Request rejected");
                ErrorBody {
                    error: other.to_string(),
                    fields: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}
