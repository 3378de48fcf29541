//! Shared test utilities for the scholarship tracker.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        application::{self, NewApplication},
        goal::{self, GoalWithItems, NewFinancialGoal, NewFundingSource, NewGoalExpense},
        scholarship::{self, NewScholarship},
        user::{self, NewUser},
    },
    entities::{
        self,
        sea_orm_active_enums::{
            CalculationMethod, ConnectionRelationship, ConnectionStatus, EducationLevel,
            ExpenseFrequency, GoalType, Priority, UserRole,
        },
    },
    errors::Result,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Password used by every test account
pub const TEST_PASSWORD: &str = "test-password-1";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A valid high-school student registration.
///
/// # Defaults
/// * password: [`TEST_PASSWORD`]
/// * school: "Central High", graduation year 2027
pub fn test_new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        first_name: "Test".to_string(),
        last_name: "Student".to_string(),
        role: UserRole::Student,
        education_level: Some(EducationLevel::HighSchool),
        gpa: Some(3.5),
        school: Some("Central High".to_string()),
        major: None,
        graduation_year: Some(2027),
    }
}

/// Registers a test student.
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
) -> Result<entities::user::Model> {
    user::register_user(db, test_new_user(email)).await
}

/// A valid scholarship worth 1000 with no application.
pub fn test_new_scholarship(title: &str) -> NewScholarship {
    NewScholarship {
        title: title.to_string(),
        description: None,
        amount: 1000.0,
        currency: None,
        provider: "Test Foundation".to_string(),
        eligibility: None,
        deadline: None,
        url: None,
        status: None,
        create_application: false,
        application_status: None,
        notes: None,
    }
}

/// Creates a test scholarship owned by `user_id`.
pub async fn create_test_scholarship(
    db: &DatabaseConnection,
    user_id: i64,
    title: &str,
) -> Result<entities::scholarship::Model> {
    let created = scholarship::create_scholarship(db, user_id, test_new_scholarship(title)).await?;
    Ok(created.scholarship)
}

/// Creates a scholarship and a draft application for it.
pub async fn create_test_application(
    db: &DatabaseConnection,
    user_id: i64,
    title: &str,
) -> Result<entities::application::Model> {
    let scholarship = create_test_scholarship(db, user_id, title).await?;
    application::create_application(
        db,
        user_id,
        NewApplication {
            scholarship_id: scholarship.id,
            status: None,
            award_amount: None,
            notes: None,
        },
    )
    .await
}

/// A goal form with two expenses (12000 total) and one 5000 funding source.
///
/// # Defaults
/// * `target_amount`: 10000 (only used by manual goals)
/// * `priority`: high
pub fn test_new_goal(title: &str, calculation_method: CalculationMethod) -> NewFinancialGoal {
    NewFinancialGoal {
        title: title.to_string(),
        description: None,
        goal_type: GoalType::Education,
        target_amount: Some(10_000.0),
        current_amount: 0.0,
        deadline: None,
        priority: Priority::High,
        calculation_method,
        education_level: None,
        institution: None,
        state: None,
        academic_year: None,
        expenses: vec![
            NewGoalExpense {
                name: "Tuition".to_string(),
                amount: 9000.0,
                frequency: ExpenseFrequency::Annual,
            },
            NewGoalExpense {
                name: "Dorm Housing Fee".to_string(),
                amount: 3000.0,
                frequency: ExpenseFrequency::Annual,
            },
        ],
        funding_sources: vec![NewFundingSource {
            name: "Pell Grant".to_string(),
            source_type: "federal_pell_grant".to_string(),
            amount: 5000.0,
            probability: 90,
            is_confirmed: true,
        }],
    }
}

/// Creates a manual goal with a 10000 target.
pub async fn create_test_goal(
    db: &DatabaseConnection,
    user_id: i64,
    title: &str,
) -> Result<GoalWithItems> {
    goal::create_goal(db, user_id, test_new_goal(title, CalculationMethod::Manual)).await
}

/// Inserts an already-accepted connection, skipping the request flow.
pub async fn connect_users(
    db: &DatabaseConnection,
    requester_id: i64,
    target_id: i64,
    relationship: ConnectionRelationship,
    permissions: serde_json::Value,
) -> Result<entities::user_connection::Model> {
    let model = entities::user_connection::ActiveModel {
        requester_id: Set(requester_id),
        target_id: Set(target_id),
        relationship: Set(relationship),
        status: Set(ConnectionStatus::Accepted),
        permissions: Set(permissions),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}
