//! Financial goal business logic.
//!
//! A goal is written together with its expense line items and funding
//! sources, so every multi-row write runs inside one transaction. For
//! itemized goals the target is the sum of the expenses and is recomputed on
//! every write.

use crate::{
    core::{connection, forms},
    entities::{
        FinancialGoal, GoalExpense, GoalFundingSource, financial_goal, goal_expense,
        goal_funding_source,
        sea_orm_active_enums::{
            CalculationMethod, EducationLevel, ExpenseFrequency, GoalStatus, GoalType, Priority,
        },
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Expense line item on a goal form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoalExpense {
    pub name: String,
    pub amount: f64,
    #[serde(default = "default_frequency")]
    pub frequency: ExpenseFrequency,
}

const fn default_frequency() -> ExpenseFrequency {
    ExpenseFrequency::OneTime
}

/// Funding source on a goal form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFundingSource {
    pub name: String,
    pub source_type: String,
    pub amount: f64,
    #[serde(default = "default_probability")]
    pub probability: i32,
    #[serde(default)]
    pub is_confirmed: bool,
}

const fn default_probability() -> i32 {
    100
}

/// Create/replace request for a goal and its items
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFinancialGoal {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub goal_type: GoalType,
    /// Required for manual goals. Ignored for itemized goals.
    #[serde(default)]
    pub target_amount: Option<f64>,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub priority: Priority,
    pub calculation_method: CalculationMethod,
    #[serde(default)]
    pub education_level: Option<EducationLevel>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub academic_year: Option<String>,
    #[serde(default)]
    pub expenses: Vec<NewGoalExpense>,
    #[serde(default)]
    pub funding_sources: Vec<NewFundingSource>,
}

/// Update request: the full goal form plus an optional status change
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    #[serde(flatten)]
    pub goal: NewFinancialGoal,
    #[serde(default)]
    pub status: Option<GoalStatus>,
}

/// A goal with its items and derived totals
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalWithItems {
    #[serde(flatten)]
    pub goal: financial_goal::Model,
    pub expenses: Vec<goal_expense::Model>,
    pub funding_sources: Vec<goal_funding_source::Model>,
    /// Sum of expense amounts
    pub total_expenses: f64,
    /// Sum of funding source amounts
    pub total_funding: f64,
    /// `total_expenses - total_funding`, never stored
    pub remaining_gap: f64,
}

impl GoalWithItems {
    /// Assembles a goal view and computes its totals.
    #[must_use]
    pub fn new(
        goal: financial_goal::Model,
        expenses: Vec<goal_expense::Model>,
        funding_sources: Vec<goal_funding_source::Model>,
    ) -> Self {
        let total_expenses = expenses.iter().map(|e| e.amount).sum::<f64>();
        let total_funding = funding_sources.iter().map(|s| s.amount).sum::<f64>();
        Self {
            goal,
            expenses,
            funding_sources,
            total_expenses,
            total_funding,
            remaining_gap: total_expenses - total_funding,
        }
    }
}

fn target_for(input: &NewFinancialGoal) -> f64 {
    match input.calculation_method {
        CalculationMethod::Itemized => input.expenses.iter().map(|e| e.amount).sum(),
        CalculationMethod::Manual => input.target_amount.unwrap_or_default(),
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn insert_items<C>(db: &C, goal_id: i64, input: &NewFinancialGoal) -> Result<()>
where
    C: ConnectionTrait,
{
    for expense in &input.expenses {
        goal_expense::ActiveModel {
            goal_id: Set(goal_id),
            name: Set(expense.name.trim().to_string()),
            amount: Set(expense.amount),
            frequency: Set(expense.frequency),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    for source in &input.funding_sources {
        goal_funding_source::ActiveModel {
            goal_id: Set(goal_id),
            name: Set(source.name.trim().to_string()),
            source_type: Set(source.source_type.trim().to_string()),
            amount: Set(source.amount),
            probability: Set(source.probability),
            is_confirmed: Set(source.is_confirmed),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

async fn delete_items<C>(db: &C, goal_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    GoalExpense::delete_many()
        .filter(goal_expense::Column::GoalId.eq(goal_id))
        .exec(db)
        .await?;
    GoalFundingSource::delete_many()
        .filter(goal_funding_source::Column::GoalId.eq(goal_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Loads items for a batch of goals, keeping the goals' order.
async fn attach_items<C>(db: &C, goals: Vec<financial_goal::Model>) -> Result<Vec<GoalWithItems>>
where
    C: ConnectionTrait,
{
    let ids: Vec<i64> = goals.iter().map(|g| g.id).collect();

    let mut expenses: HashMap<i64, Vec<goal_expense::Model>> = HashMap::new();
    for expense in GoalExpense::find()
        .filter(goal_expense::Column::GoalId.is_in(ids.clone()))
        .order_by_asc(goal_expense::Column::Id)
        .all(db)
        .await?
    {
        expenses.entry(expense.goal_id).or_default().push(expense);
    }

    let mut sources: HashMap<i64, Vec<goal_funding_source::Model>> = HashMap::new();
    for source in GoalFundingSource::find()
        .filter(goal_funding_source::Column::GoalId.is_in(ids))
        .order_by_asc(goal_funding_source::Column::Id)
        .all(db)
        .await?
    {
        sources.entry(source.goal_id).or_default().push(source);
    }

    Ok(goals
        .into_iter()
        .map(|goal| {
            let id = goal.id;
            GoalWithItems::new(
                goal,
                expenses.remove(&id).unwrap_or_default(),
                sources.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}

/// Creates a goal with its expenses and funding sources.
pub async fn create_goal(
    db: &DatabaseConnection,
    user_id: i64,
    input: NewFinancialGoal,
) -> Result<GoalWithItems> {
    forms::validate_goal(&input)?;

    let txn = db.begin().await?;
    let now = Utc::now();
    let goal = financial_goal::ActiveModel {
        user_id: Set(user_id),
        title: Set(input.title.trim().to_string()),
        description: Set(optional_text(input.description.clone())),
        goal_type: Set(input.goal_type),
        target_amount: Set(target_for(&input)),
        current_amount: Set(input.current_amount),
        deadline: Set(input.deadline),
        priority: Set(input.priority),
        status: Set(GoalStatus::Active),
        calculation_method: Set(input.calculation_method),
        education_level: Set(input.education_level),
        institution: Set(optional_text(input.institution.clone())),
        state: Set(optional_text(input.state.clone())),
        academic_year: Set(optional_text(input.academic_year.clone())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    insert_items(&txn, goal.id, &input).await?;
    let created = load_goal(&txn, goal).await?;
    txn.commit().await?;

    info!(
        user_id,
        goal_id = created.goal.id,
        target = created.goal.target_amount,
        "Created financial goal"
    );
    Ok(created)
}

async fn load_goal<C>(db: &C, goal: financial_goal::Model) -> Result<GoalWithItems>
where
    C: ConnectionTrait,
{
    let mut loaded = attach_items(db, vec![goal]).await?;
    loaded
        .pop()
        .ok_or_else(|| Error::Database(DbErr::RecordNotFound("financial goal".to_string())))
}

async fn find_owned<C>(db: &C, user_id: i64, goal_id: i64) -> Result<financial_goal::Model>
where
    C: ConnectionTrait,
{
    FinancialGoal::find_by_id(goal_id)
        .filter(financial_goal::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Financial goal", goal_id))
}

/// Fetches one of the user's goals with its items.
pub async fn get_goal_for_user(
    db: &DatabaseConnection,
    user_id: i64,
    goal_id: i64,
) -> Result<GoalWithItems> {
    let goal = find_owned(db, user_id, goal_id).await?;
    load_goal(db, goal).await
}

/// Replaces a goal's fields and items.
///
/// Existing expenses and funding sources are deleted and the submitted ones
/// inserted in their place.
pub async fn update_goal(
    db: &DatabaseConnection,
    user_id: i64,
    goal_id: i64,
    update: GoalUpdate,
) -> Result<GoalWithItems> {
    let GoalUpdate { goal: input, status } = update;
    forms::validate_goal(&input)?;

    let txn = db.begin().await?;
    let existing = find_owned(&txn, user_id, goal_id).await?;

    let mut model: financial_goal::ActiveModel = existing.into();
    model.title = Set(input.title.trim().to_string());
    model.description = Set(optional_text(input.description.clone()));
    model.goal_type = Set(input.goal_type);
    model.target_amount = Set(target_for(&input));
    model.current_amount = Set(input.current_amount);
    model.deadline = Set(input.deadline);
    model.priority = Set(input.priority);
    if let Some(status) = status {
        model.status = Set(status);
    }
    model.calculation_method = Set(input.calculation_method);
    model.education_level = Set(input.education_level);
    model.institution = Set(optional_text(input.institution.clone()));
    model.state = Set(optional_text(input.state.clone()));
    model.academic_year = Set(optional_text(input.academic_year.clone()));
    model.updated_at = Set(Utc::now());
    let goal = model.update(&txn).await?;

    delete_items(&txn, goal_id).await?;
    insert_items(&txn, goal_id, &input).await?;
    let updated = load_goal(&txn, goal).await?;
    txn.commit().await?;

    info!(user_id, goal_id, "Updated financial goal");
    Ok(updated)
}

/// Deletes a goal along with its expenses and funding sources.
pub async fn delete_goal(db: &DatabaseConnection, user_id: i64, goal_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let goal = find_owned(&txn, user_id, goal_id).await?;
    delete_items(&txn, goal_id).await?;
    goal.delete(&txn).await?;
    txn.commit().await?;

    info!(user_id, goal_id, "Deleted financial goal");
    Ok(())
}

/// Lists `owner_id`'s goals with items, newest first.
///
/// A viewer other than the owner needs an accepted connection granting
/// `view_finances`, otherwise `Error::Forbidden`.
pub async fn list_goals_with_items(
    db: &DatabaseConnection,
    viewer_id: i64,
    owner_id: i64,
) -> Result<Vec<GoalWithItems>> {
    if !connection::has_permission(db, viewer_id, owner_id, connection::VIEW_FINANCES).await? {
        return Err(Error::Forbidden {
            message: "You do not have access to this user's finances".to_string(),
        });
    }

    let goals = FinancialGoal::find()
        .filter(financial_goal::Column::UserId.eq(owner_id))
        .order_by_desc(financial_goal::Column::CreatedAt)
        .order_by_desc(financial_goal::Column::Id)
        .all(db)
        .await?;
    attach_items(db, goals).await
}

/// Lists the user's active goals with items, the input to the analytics.
pub async fn list_active_goals_with_items(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<GoalWithItems>> {
    let goals = FinancialGoal::find()
        .filter(financial_goal::Column::UserId.eq(user_id))
        .filter(financial_goal::Column::Status.eq(GoalStatus::Active))
        .order_by_asc(financial_goal::Column::Id)
        .all(db)
        .await?;
    attach_items(db, goals).await
}
