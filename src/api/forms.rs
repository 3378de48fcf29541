//! Dynamic form layouts. Public so the registration page can render before sign-in.

use super::{AppState, extract::ApiQuery};
use crate::{
    core::forms::{self, FormField},
    entities::sea_orm_active_enums::{CalculationMethod, EducationLevel, UserRole},
};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationQuery {
    role: UserRole,
    education_level: Option<EducationLevel>,
}

#[derive(Debug, Deserialize)]
struct GoalQuery {
    method: CalculationMethod,
}

async fn registration(ApiQuery(query): ApiQuery<RegistrationQuery>) -> Json<Vec<FormField>> {
    Json(forms::registration_fields(query.role, query.education_level))
}

async fn financial_goal(ApiQuery(query): ApiQuery<GoalQuery>) -> Json<Vec<FormField>> {
    Json(forms::goal_fields(query.method))
}

/// Routes mounted under `/api`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/forms/registration", get(registration))
        .route("/forms/financial-goal", get(financial_goal))
}
