//! Financial goal entity - A funding target with optional academic and
//! geographic context.
//!
//! A goal owns its expense line items and funding sources. Deleting a goal
//! deletes both (see `core::goal::delete_goal`).

use super::sea_orm_active_enums::{
    CalculationMethod, EducationLevel, GoalStatus, GoalType, Priority,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Financial goal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_goals")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Goal owner
    pub user_id: i64,
    /// Short title shown on the dashboard
    pub title: String,
    /// Longer description
    pub description: Option<String>,
    /// What the money is for
    pub goal_type: GoalType,
    /// Amount needed
    pub target_amount: f64,
    /// Amount already saved toward the goal
    pub current_amount: f64,
    /// Date by which the target should be met
    pub deadline: Option<Date>,
    /// Relative importance
    pub priority: Priority,
    /// Lifecycle status
    pub status: GoalStatus,
    /// Whether the target is manual or the sum of expenses
    pub calculation_method: CalculationMethod,
    /// Education level the goal is for
    pub education_level: Option<EducationLevel>,
    /// School the goal is for
    pub institution: Option<String>,
    /// State or region, used for state-aid eligibility
    pub state: Option<String>,
    /// Academic year label, e.g. `2025-2026`
    pub academic_year: Option<String>,
    /// When the goal was created
    pub created_at: DateTimeUtc,
    /// When the goal was last modified
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each goal belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One goal has many expenses
    #[sea_orm(has_many = "super::goal_expense::Entity")]
    Expenses,
    /// One goal has many funding sources
    #[sea_orm(has_many = "super::goal_funding_source::Entity")]
    FundingSources,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::goal_expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::goal_funding_source::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundingSources.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
