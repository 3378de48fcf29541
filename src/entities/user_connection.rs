//! User connection entity - A directed link between two users
//! (parent to child, counselor to student).
//!
//! `permissions` is a JSON object of boolean flags such as
//! `{"view_finances": true}`.

use super::sea_orm_active_enums::{ConnectionRelationship, ConnectionStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User connection database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_connections")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who sent the request
    pub requester_id: i64,
    /// User who must accept it
    pub target_id: i64,
    pub relationship: ConnectionRelationship,
    pub status: ConnectionStatus,
    /// Permission flags granted by the connection
    pub permissions: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequesterId",
        to = "super::user::Column::Id"
    )]
    Requester,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TargetId",
        to = "super::user::Column::Id"
    )]
    Target,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the permissions blob grants `flag`.
    #[must_use]
    pub fn grants(&self, flag: &str) -> bool {
        self.permissions
            .get(flag)
            .and_then(Json::as_bool)
            .unwrap_or(false)
    }
}
