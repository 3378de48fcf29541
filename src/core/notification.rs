//! Notification business logic.
//!
//! Other modules create notifications as a side effect (status changes,
//! connection requests). Users can list them and mark them read.

use crate::{
    entities::{Notification, notification, sea_orm_active_enums::NotificationKind},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};

/// Creates an unread notification for `user_id`.
pub async fn create_notification<C>(
    db: &C,
    user_id: i64,
    kind: NotificationKind,
    title: impl Into<String>,
    message: impl Into<String>,
) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    let model = notification::ActiveModel {
        user_id: Set(user_id),
        title: Set(title.into()),
        message: Set(message.into()),
        kind: Set(kind),
        is_read: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Lists a user's notifications, newest first.
pub async fn list_notifications(
    db: &DatabaseConnection,
    user_id: i64,
    unread_only: bool,
    limit: Option<u64>,
) -> Result<Vec<notification::Model>> {
    let mut query = Notification::find().filter(notification::Column::UserId.eq(user_id));
    if unread_only {
        query = query.filter(notification::Column::IsRead.eq(false));
    }
    query
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .limit(limit.unwrap_or(50))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts unread notifications for the dashboard badge.
pub async fn unread_count(db: &DatabaseConnection, user_id: i64) -> Result<u64> {
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Marks one notification read. Other users' notifications are reported as not found.
pub async fn mark_read(
    db: &DatabaseConnection,
    user_id: i64,
    notification_id: i64,
) -> Result<notification::Model> {
    let found = Notification::find_by_id(notification_id)
        .filter(notification::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Notification", notification_id))?;

    if found.is_read {
        return Ok(found);
    }

    let mut model: notification::ActiveModel = found.into();
    model.is_read = Set(true);
    model.update(db).await.map_err(Into::into)
}

/// Marks every unread notification read. Returns how many changed.
pub async fn mark_all_read(db: &DatabaseConnection, user_id: i64) -> Result<u64> {
    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
