//! Session business logic - issuing, validating and revoking login tokens.

use crate::{
    core::user,
    entities::{Session, session, user::Model as UserModel},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use sea_orm::{Set, prelude::*};
use tracing::debug;
use uuid::Uuid;

/// Issues a new session for `user_id` valid for `ttl_hours`.
pub async fn create_session(
    db: &DatabaseConnection,
    user_id: i64,
    ttl_hours: i64,
) -> Result<session::Model> {
    let now = Utc::now();
    let expires_at = Duration::try_hours(ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| Error::Config {
            message: format!("Session TTL of {ttl_hours} hours is out of range"),
        })?;
    let model = session::ActiveModel {
        token: Set(Uuid::new_v4().simple().to_string()),
        user_id: Set(user_id),
        created_at: Set(now),
        expires_at: Set(expires_at),
        ..Default::default()
    };
    let session = model.insert(db).await?;
    debug!(user_id, session_id = session.id, "Issued session");
    Ok(session)
}

/// Resolves a token to its user.
///
/// Returns `None` for unknown or expired tokens and for soft-deleted users.
/// Expired rows are deleted when they are seen.
pub async fn validate_session(db: &DatabaseConnection, token: &str) -> Result<Option<UserModel>> {
    let Some(session) = Session::find()
        .filter(session::Column::Token.eq(token))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    if session.expires_at <= Utc::now() {
        debug!(session_id = session.id, "Rejecting expired session");
        session.delete(db).await?;
        return Ok(None);
    }

    user::get_active_user_by_id(db, session.user_id).await
}

/// Deletes the session with `token`. Unknown tokens are ignored.
pub async fn revoke_session(db: &DatabaseConnection, token: &str) -> Result<()> {
    Session::delete_many()
        .filter(session::Column::Token.eq(token))
        .exec(db)
        .await?;
    Ok(())
}

/// Deletes every session of `user_id` except `keep_token`. Returns how many were removed.
pub async fn revoke_other_sessions(
    db: &DatabaseConnection,
    user_id: i64,
    keep_token: Option<&str>,
) -> Result<u64> {
    let mut query = Session::delete_many().filter(session::Column::UserId.eq(user_id));
    if let Some(token) = keep_token {
        query = query.filter(session::Column::Token.ne(token));
    }
    let result = query.exec(db).await?;
    Ok(result.rows_affected)
}
