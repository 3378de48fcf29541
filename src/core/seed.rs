//! Demo data seeding.
//!
//! Creates the demo account and its scholarships, applications and goals from
//! a [`SeedConfig`]. Seeding runs at most once: if the demo email is already
//! registered nothing is touched.

use crate::{
    config::seed::{SeedConfig, SeedGoal},
    core::{
        application::{self, NewApplication},
        goal::{self, NewFinancialGoal, NewFundingSource, NewGoalExpense},
        scholarship::{self, NewScholarship},
        user::{self, NewUser},
    },
    entities::sea_orm_active_enums::CalculationMethod,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::info;

fn goal_input(seed: &SeedGoal) -> NewFinancialGoal {
    NewFinancialGoal {
        title: seed.title.clone(),
        description: None,
        goal_type: seed.goal_type,
        target_amount: match seed.calculation_method {
            CalculationMethod::Manual => Some(seed.target_amount),
            CalculationMethod::Itemized => None,
        },
        current_amount: seed.current_amount,
        deadline: seed.deadline,
        priority: seed.priority,
        calculation_method: seed.calculation_method,
        education_level: None,
        institution: seed.institution.clone(),
        state: seed.state.clone(),
        academic_year: None,
        expenses: seed
            .expenses
            .iter()
            .map(|e| NewGoalExpense {
                name: e.name.clone(),
                amount: e.amount,
                frequency: e.frequency,
            })
            .collect(),
        funding_sources: seed
            .funding_sources
            .iter()
            .map(|s| NewFundingSource {
                name: s.name.clone(),
                source_type: s.source_type.clone(),
                amount: s.amount,
                probability: s.probability,
                is_confirmed: s.is_confirmed,
            })
            .collect(),
    }
}

/// Seeds the demo account. Returns `false` when its email is already taken,
/// including by a soft-deleted account.
pub async fn seed_demo_data(db: &DatabaseConnection, config: &SeedConfig) -> Result<bool> {
    let demo = &config.demo_user;
    if user::email_registered(db, &demo.email).await? {
        info!(email = %demo.email, "Demo user already exists, skipping seed");
        return Ok(false);
    }

    let owner = user::register_user(
        db,
        NewUser {
            email: demo.email.clone(),
            password: demo.password.clone(),
            first_name: demo.first_name.clone(),
            last_name: demo.last_name.clone(),
            role: demo.role,
            education_level: demo.education_level,
            gpa: None,
            school: demo.school.clone(),
            major: None,
            graduation_year: demo.graduation_year,
        },
    )
    .await?;

    for seed in &config.scholarships {
        let created = scholarship::create_scholarship(
            db,
            owner.id,
            NewScholarship {
                title: seed.title.clone(),
                description: None,
                amount: seed.amount,
                currency: None,
                provider: seed.provider.clone(),
                eligibility: seed.eligibility.clone(),
                deadline: seed.deadline,
                url: None,
                status: None,
                create_application: false,
                application_status: None,
                notes: None,
            },
        )
        .await?;

        if let Some(status) = seed.application_status {
            application::create_application(
                db,
                owner.id,
                NewApplication {
                    scholarship_id: created.scholarship.id,
                    status: Some(status),
                    award_amount: seed.award_amount,
                    notes: None,
                },
            )
            .await?;
        }
    }

    for seed in &config.goals {
        goal::create_goal(db, owner.id, goal_input(seed)).await?;
    }

    info!(
        user_id = owner.id,
        scholarships = config.scholarships.len(),
        goals = config.goals.len(),
        "Seeded demo data"
    );
    Ok(true)
}
