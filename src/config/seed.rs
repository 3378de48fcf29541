//! Demo-data seed file loading.
//!
//! The seed file is TOML. It describes one demo account plus the scholarships
//! and financial goals created for it on first start. Seeding itself lives in
//! `core::seed`.

use crate::entities::sea_orm_active_enums::{
    ApplicationStatus, CalculationMethod, EducationLevel, ExpenseFrequency, GoalType, Priority,
    UserRole,
};
use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

/// Structure of the whole seed file
#[derive(Debug, Deserialize)]
pub struct SeedConfig {
    /// Account that owns every seeded row
    pub demo_user: SeedUser,
    /// Scholarships to add
    #[serde(default)]
    pub scholarships: Vec<SeedScholarship>,
    /// Financial goals to add
    #[serde(default)]
    pub goals: Vec<SeedGoal>,
}

/// Demo account credentials and profile
#[derive(Debug, Deserialize, Clone)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub education_level: Option<EducationLevel>,
    pub school: Option<String>,
    pub graduation_year: Option<i32>,
}

/// One seeded scholarship, optionally with an application
#[derive(Debug, Deserialize, Clone)]
pub struct SeedScholarship {
    pub title: String,
    pub provider: String,
    pub amount: f64,
    pub deadline: Option<NaiveDate>,
    pub eligibility: Option<String>,
    /// Creates an application in this status when present
    pub application_status: Option<ApplicationStatus>,
    /// Award recorded on an accepted application
    pub award_amount: Option<f64>,
}

/// One seeded financial goal
#[derive(Debug, Deserialize, Clone)]
pub struct SeedGoal {
    pub title: String,
    pub goal_type: GoalType,
    pub priority: Priority,
    pub calculation_method: CalculationMethod,
    #[serde(default)]
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub deadline: Option<NaiveDate>,
    pub institution: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub expenses: Vec<SeedExpense>,
    #[serde(default)]
    pub funding_sources: Vec<SeedFundingSource>,
}

/// Expense line item on a seeded goal
#[derive(Debug, Deserialize, Clone)]
pub struct SeedExpense {
    pub name: String,
    pub amount: f64,
    pub frequency: ExpenseFrequency,
}

/// Funding source on a seeded goal
#[derive(Debug, Deserialize, Clone)]
pub struct SeedFundingSource {
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

/// Parses seed TOML from a string.
pub fn parse_seed_config(contents: &str) -> Result<SeedConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

/// Loads the seed file at `path`.
pub fn load_seed_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading seed data from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {path_ref:?}: {e}"),
    })?;
    parse_seed_config(&contents)
}
