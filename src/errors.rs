//! Unified error types and result handling.
//!
//! Every business-logic function returns [`Result`]. The HTTP layer maps these
//! variants onto status codes in [`crate::api::error`].

use std::collections::BTreeMap;
use thiserror::Error;

/// Per-field validation messages, keyed by the camelCase field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Application error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// One or more submitted fields failed validation
    #[error("{message}")]
    Validation {
        /// Summary message
        message: String,
        /// Field-level messages
        fields: FieldErrors,
    },

    /// A monetary amount was negative, NaN, or infinite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Requested row does not exist or is not visible to the caller
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"Scholarship"`
        entity: &'static str,
        /// Identifier used in the lookup
        id: String,
    },

    /// No valid session or bad credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but not allowed to touch this resource
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Reason shown to the caller
        message: String,
    },

    /// Unique constraint would be violated
    #[error("{message}")]
    Conflict {
        /// Reason shown to the caller
        message: String,
    },

    /// Application status cannot move from `from` to `to`
    #[error("Cannot change application status from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// A form phase transition that the phase machine does not allow
    #[error("Invalid form transition: {message}")]
    InvalidTransition {
        /// Description of the rejected transition
        message: String,
    },

    /// Password hashing or verification failed for a reason other than a mismatch
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Underlying hasher message
        message: String,
    },

    /// I/O failure (config files, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a single-field validation error.
    #[must_use]
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), message.clone());
        Self::Validation { message, fields }
    }

    /// Builds a `NotFound` error for an integer id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

/// Rejects negative, NaN and infinite amounts.
pub fn ensure_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}
