//! Application entity - Links a user to a scholarship and tracks its status.
use super::sea_orm_active_enums::ApplicationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Application database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "applications")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Applicant
    pub user_id: i64,
    /// Scholarship applied to
    pub scholarship_id: i64,
    /// Current status
    pub status: ApplicationStatus,
    /// Amount awarded; only set once accepted
    pub award_amount: Option<f64>,
    /// First time the application reached `submitted`
    pub submitted_at: Option<DateTimeUtc>,
    /// Applicant or counselor notes
    pub notes: Option<String>,
    /// When the application was created
    pub created_at: DateTimeUtc,
    /// When it was last modified
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each application belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each application targets one scholarship
    #[sea_orm(
        belongs_to = "super::scholarship::Entity",
        from = "Column::ScholarshipId",
        to = "super::scholarship::Column::Id"
    )]
    Scholarship,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::scholarship::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scholarship.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
