//! User entity - Students, parents, counselors and admins.
//!
//! Users are never hard-deleted. Setting `deleted_at` hides the account from
//! every lookup and blocks login.

use super::sea_orm_active_enums::{EducationLevel, UserRole};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login email, stored lower-cased
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string; never leaves the server
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Account role
    pub role: UserRole,
    /// Current education level, if provided
    pub education_level: Option<EducationLevel>,
    /// Grade point average (0.0 - 5.0)
    pub gpa: Option<f64>,
    /// School or organization name
    pub school: Option<String>,
    /// Declared or intended major
    pub major: Option<String>,
    /// Expected graduation year
    pub graduation_year: Option<i32>,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
    /// Soft-delete timestamp
    pub deleted_at: Option<DateTimeUtc>,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
    /// One user owns many scholarships
    #[sea_orm(has_many = "super::scholarship::Entity")]
    Scholarships,
    /// One user has many applications
    #[sea_orm(has_many = "super::application::Entity")]
    Applications,
    /// One user has many financial goals
    #[sea_orm(has_many = "super::financial_goal::Entity")]
    FinancialGoals,
    /// One user has many notifications
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl Related<super::scholarship::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scholarships.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl Related<super::financial_goal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialGoals.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// "First Last"
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
