//! User connection business logic.
//!
//! A connection links a parent or counselor with a student. The requester
//! proposes it and the target accepts or declines. An accepted connection
//! grants the flags in its `permissions` object to both sides.

use crate::{
    core::{notification, user},
    entities::{
        UserConnection,
        sea_orm_active_enums::{ConnectionRelationship, ConnectionStatus, NotificationKind},
        user_connection,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Permission flag for reading another user's financial goals
pub const VIEW_FINANCES: &str = "view_finances";
/// Permission flag for reading another user's applications
pub const VIEW_APPLICATIONS: &str = "view_applications";

/// Request body for proposing a connection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub target_email: String,
    pub relationship: ConnectionRelationship,
    /// Flags granted once accepted, e.g. `{"view_finances": true}`
    #[serde(default = "default_permissions")]
    pub permissions: Json,
}

fn default_permissions() -> Json {
    serde_json::json!({ VIEW_APPLICATIONS: true })
}

/// A connection together with the user on the other side
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    #[serde(flatten)]
    pub connection: user_connection::Model,
    /// Display name of the other party
    pub other_name: String,
    /// Email of the other party
    pub other_email: String,
    /// Whether the viewer sent the request
    pub outgoing: bool,
}

fn between(a: i64, b: i64) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(user_connection::Column::RequesterId.eq(a))
                .add(user_connection::Column::TargetId.eq(b)),
        )
        .add(
            Condition::all()
                .add(user_connection::Column::RequesterId.eq(b))
                .add(user_connection::Column::TargetId.eq(a)),
        )
}

/// Proposes a connection to the user registered under `target_email`.
pub async fn request_connection(
    db: &DatabaseConnection,
    requester_id: i64,
    request: ConnectionRequest,
) -> Result<user_connection::Model> {
    if !request.permissions.is_object() {
        return Err(Error::field(
            "permissions",
            "Permissions must be an object of flags",
        ));
    }

    let txn = db.begin().await?;

    let requester = user::get_active_user_by_id(&txn, requester_id)
        .await?
        .ok_or_else(|| Error::not_found("User", requester_id))?;
    let target = user::get_active_user_by_email(&txn, &request.target_email)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "User",
            id: request.target_email.trim().to_lowercase(),
        })?;

    if target.id == requester_id {
        return Err(Error::field(
            "targetEmail",
            "You cannot connect with yourself",
        ));
    }

    let existing = UserConnection::find()
        .filter(between(requester_id, target.id))
        .filter(user_connection::Column::Status.ne(ConnectionStatus::Declined))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict {
            message: "A connection with this user already exists".to_string(),
        });
    }

    let model = user_connection::ActiveModel {
        requester_id: Set(requester_id),
        target_id: Set(target.id),
        relationship: Set(request.relationship),
        status: Set(ConnectionStatus::Pending),
        permissions: Set(request.permissions),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = model.insert(&txn).await?;

    notification::create_notification(
        &txn,
        target.id,
        NotificationKind::Connection,
        "New connection request",
        format!("{} wants to connect with you", requester.display_name()),
    )
    .await?;

    txn.commit().await?;
    info!(
        connection_id = created.id,
        requester_id,
        target_id = target.id,
        "Connection requested"
    );
    Ok(created)
}

/// Accepts or declines a pending request. Only the target may respond.
pub async fn respond_to_connection(
    db: &DatabaseConnection,
    user_id: i64,
    connection_id: i64,
    accept: bool,
) -> Result<user_connection::Model> {
    let txn = db.begin().await?;

    let found = UserConnection::find_by_id(connection_id)
        .filter(user_connection::Column::TargetId.eq(user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Connection", connection_id))?;

    if found.status != ConnectionStatus::Pending {
        return Err(Error::Conflict {
            message: format!("Connection is already {}", found.status),
        });
    }

    let requester_id = found.requester_id;
    let status = if accept {
        ConnectionStatus::Accepted
    } else {
        ConnectionStatus::Declined
    };
    let mut model: user_connection::ActiveModel = found.into();
    model.status = Set(status);
    let updated = model.update(&txn).await?;

    let responder = user::get_active_user_by_id(&txn, user_id)
        .await?
        .map_or_else(|| "A user".to_string(), |u| u.display_name());
    notification::create_notification(
        &txn,
        requester_id,
        NotificationKind::Connection,
        "Connection request answered",
        format!("{responder} {status} your connection request"),
    )
    .await?;

    txn.commit().await?;
    info!(connection_id, user_id, %status, "Connection answered");
    Ok(updated)
}

/// Deletes a connection. Either side may remove it.
pub async fn remove_connection(
    db: &DatabaseConnection,
    user_id: i64,
    connection_id: i64,
) -> Result<()> {
    let result = UserConnection::delete_many()
        .filter(user_connection::Column::Id.eq(connection_id))
        .filter(
            Condition::any()
                .add(user_connection::Column::RequesterId.eq(user_id))
                .add(user_connection::Column::TargetId.eq(user_id)),
        )
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found("Connection", connection_id));
    }
    info!(connection_id, user_id, "Connection removed");
    Ok(())
}

/// Lists every connection the user is part of, newest first.
pub async fn list_connections(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<ConnectionView>> {
    let connections = UserConnection::find()
        .filter(
            Condition::any()
                .add(user_connection::Column::RequesterId.eq(user_id))
                .add(user_connection::Column::TargetId.eq(user_id)),
        )
        .order_by_desc(user_connection::Column::CreatedAt)
        .order_by_desc(user_connection::Column::Id)
        .all(db)
        .await?;

    let mut views = Vec::with_capacity(connections.len());
    for connection in connections {
        let outgoing = connection.requester_id == user_id;
        let other_id = if outgoing {
            connection.target_id
        } else {
            connection.requester_id
        };
        // Skip links to deleted accounts
        let Some(other) = user::get_active_user_by_id(db, other_id).await? else {
            continue;
        };
        views.push(ConnectionView {
            connection,
            other_name: other.display_name(),
            other_email: other.email,
            outgoing,
        });
    }
    Ok(views)
}

/// Whether `viewer_id` may act on `owner_id`'s data under `flag`.
///
/// Requires an accepted connection in either direction whose permissions set
/// `flag` to `true`. Owners always have access to their own data.
pub async fn has_permission<C>(db: &C, viewer_id: i64, owner_id: i64, flag: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    if viewer_id == owner_id {
        return Ok(true);
    }
    let connections = UserConnection::find()
        .filter(between(viewer_id, owner_id))
        .filter(user_connection::Column::Status.eq(ConnectionStatus::Accepted))
        .all(db)
        .await?;
    Ok(connections.iter().any(|c| c.grants(flag)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::notification::list_notifications;
    use crate::test_utils::*;

    fn request(email: &str, permissions: Json) -> ConnectionRequest {
        ConnectionRequest {
            target_email: email.to_string(),
            relationship: ConnectionRelationship::ParentChild,
            permissions,
        }
    }

    #[tokio::test]
    async fn test_request_and_accept() -> Result<()> {
        let db = setup_test_db().await?;
        let parent = create_test_user(&db, "parent@example.com").await?;
        let child = create_test_user(&db, "child@example.com").await?;

        let pending = request_connection(
            &db,
            parent.id,
            request("Child@Example.com", serde_json::json!({ VIEW_FINANCES: true })),
        )
        .await?;
        assert_eq!(pending.status, ConnectionStatus::Pending);
        assert!(!has_permission(&db, parent.id, child.id, VIEW_FINANCES).await?);
        assert_eq!(list_notifications(&db, child.id, true, None).await?.len(), 1);

        // Only the target can respond
        assert!(matches!(
            respond_to_connection(&db, parent.id, pending.id, true).await,
            Err(Error::NotFound { .. })
        ));

        let accepted = respond_to_connection(&db, child.id, pending.id, true).await?;
        assert_eq!(accepted.status, ConnectionStatus::Accepted);
        assert!(has_permission(&db, parent.id, child.id, VIEW_FINANCES).await?);
        assert!(has_permission(&db, child.id, parent.id, VIEW_FINANCES).await?);
        assert!(!has_permission(&db, parent.id, child.id, "manage_applications").await?);

        let again = respond_to_connection(&db, child.id, pending.id, false).await;
        assert!(matches!(again, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_request_rules() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_user(&db, "a@example.com").await?;
        create_test_user(&db, "b@example.com").await?;

        let bad_flags = request_connection(&db, a.id, request("b@example.com", Json::Null)).await;
        assert!(matches!(bad_flags, Err(Error::Validation { .. })));

        let to_self = request_connection(
            &db,
            a.id,
            request("a@example.com", serde_json::json!({})),
        )
        .await;
        assert!(matches!(to_self, Err(Error::Validation { .. })));

        let missing = request_connection(
            &db,
            a.id,
            request("nobody@example.com", serde_json::json!({})),
        )
        .await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));

        request_connection(&db, a.id, request("b@example.com", serde_json::json!({}))).await?;
        let duplicate =
            request_connection(&db, a.id, request("b@example.com", serde_json::json!({}))).await;
        assert!(matches!(duplicate, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_remove() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_user(&db, "one@example.com").await?;
        let b = create_test_user(&db, "two@example.com").await?;
        let stranger = create_test_user(&db, "three@example.com").await?;

        let link = connect_users(
            &db,
            a.id,
            b.id,
            ConnectionRelationship::CounselorStudent,
            serde_json::json!({ VIEW_APPLICATIONS: true }),
        )
        .await?;

        let from_b = list_connections(&db, b.id).await?;
        assert_eq!(from_b.len(), 1);
        assert!(!from_b[0].outgoing);
        assert_eq!(from_b[0].other_email, "one@example.com");

        assert!(matches!(
            remove_connection(&db, stranger.id, link.id).await,
            Err(Error::NotFound { .. })
        ));
        remove_connection(&db, b.id, link.id).await?;
        assert!(list_connections(&db, a.id).await?.is_empty());
        Ok(())
    }
}
