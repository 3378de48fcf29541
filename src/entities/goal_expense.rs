//! Goal expense entity - A named cost line item on a financial goal.
use super::sea_orm_active_enums::ExpenseFrequency;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Goal expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goal_expenses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent goal
    pub goal_id: i64,
    /// Line item name; drives expense classification
    pub name: String,
    pub amount: f64,
    pub frequency: ExpenseFrequency,
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
