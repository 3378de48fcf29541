//! Financial goal endpoints and the goal analytics view.

use super::{
    AppState,
    auth::AuthUser,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
};
use crate::core::{
    analytics::{self, FinancialMetrics},
    dashboard,
    goal::{self, GoalUpdate, GoalWithItems, NewFinancialGoal},
};
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    /// Another user's goals, visible with `view_finances`
    user_id: Option<i64>,
}

async fn list(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<GoalWithItems>>> {
    let owner_id = query.user_id.unwrap_or(auth.user.id);
    let goals = goal::list_goals_with_items(&state.database, auth.user.id, owner_id).await?;
    Ok(Json(goals))
}

async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(input): ApiJson<NewFinancialGoal>,
) -> ApiResult<(StatusCode, Json<GoalWithItems>)> {
    let created = goal::create_goal(&state.database, auth.user.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn show(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<GoalWithItems>> {
    let found = goal::get_goal_for_user(&state.database, auth.user.id, id).await?;
    Ok(Json(found))
}

async fn update(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<GoalUpdate>,
) -> ApiResult<Json<GoalWithItems>> {
    let updated = goal::update_goal(&state.database, auth.user.id, id, input).await?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    goal::delete_goal(&state.database, auth.user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn metrics(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<FinancialMetrics>> {
    let goals = goal::list_active_goals_with_items(&state.database, auth.user.id).await?;
    let stats = dashboard::scholarship_stats(&state.database, auth.user.id).await?;
    let today = Utc::now().date_naive();
    Ok(Json(analytics::calculate_financial_metrics(
        &goals, &stats, today,
    )))
}

/// Routes mounted under `/api`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/financial-goals", get(list).post(create))
        .route("/financial-goals/analytics", get(metrics))
        .route(
            "/financial-goals/{id}",
            get(show).put(update).delete(remove),
        )
}
