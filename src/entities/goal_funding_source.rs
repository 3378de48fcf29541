//! Goal funding source entity - A named, probabilistic contribution toward a goal.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Funding source database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goal_funding_sources")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent goal
    pub goal_id: i64,
    /// Display name, e.g. "Parents' savings"
    pub name: String,
    /// Free-text source type (e.g. `federal_pell_grant`); drives funding classification
    pub source_type: String,
    pub amount: f64,
    /// Likelihood of receiving the funds, 0-100
    pub probability: i32,
    /// Whether the funds are confirmed
    pub is_confirmed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::financial_goal::Entity",
        from = "Column::GoalId",
        to = "super::financial_goal::Column::Id"
    )]
    FinancialGoal,
}

impl Related<super::financial_goal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialGoal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
