//! Scholarship entity - A funding opportunity tracked by a user.
//!
//! Status is whatever the owner last set; nothing computes it from the deadline.

use super::sea_orm_active_enums::ScholarshipStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Scholarship database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scholarships")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who added the scholarship
    pub user_id: i64,
    /// Scholarship name
    pub title: String,
    /// Free-form description
    pub description: Option<String>,
    /// Award amount
    pub amount: f64,
    /// ISO currency code, `USD` unless given
    pub currency: String,
    /// Awarding organization
    pub provider: String,
    /// Eligibility requirements text
    pub eligibility: Option<String>,
    /// Application deadline
    pub deadline: Option<Date>,
    /// Link to the listing
    pub url: Option<String>,
    /// Listing status
    pub status: ScholarshipStatus,
    /// When the scholarship was added
    pub created_at: DateTimeUtc,
    /// When it was last modified
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each scholarship is owned by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One scholarship has many applications
    #[sea_orm(has_many = "super::application::Entity")]
    Applications,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
