//! Financial analytics - turns a user's goals and scholarship results into
//! dashboard metrics.
//!
//! Everything here is pure: no database access, no clock. Callers pass the
//! current date so deadline checks are reproducible.
//!
//! Expenses and funding sources are bucketed by keyword. Each table is checked
//! in order against the lower-cased input and the first category with a
//! matching substring wins. Keep the order when editing the tables: "Lab
//! Supplies" must hit `books` before `fees`, and "Dorm Housing Fee" must hit
//! `roomAndBoard` before `fees`.

use crate::{
    core::goal::GoalWithItems,
    entities::sea_orm_active_enums::GoalStatus,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Scholarship funding totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FundingStats {
    /// Awarded on accepted applications
    pub won: f64,
    /// Scholarship amounts still awaiting a decision
    pub potential: f64,
}

/// Application counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub total: u64,
    /// Everything past draft
    pub submitted: u64,
    pub accepted: u64,
    pub rejected: u64,
}

/// Scholarship summary fed into the metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipStats {
    pub funding: FundingStats,
    pub applications: ApplicationStats,
}

/// Expense bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpenseCategory {
    Tuition,
    RoomAndBoard,
    Books,
    Transportation,
    Personal,
    Fees,
    Other,
}

impl ExpenseCategory {
    /// Key used in `expenseBreakdown`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tuition => "tuition",
            Self::RoomAndBoard => "roomAndBoard",
            Self::Books => "books",
            Self::Transportation => "transportation",
            Self::Personal => "personal",
            Self::Fees => "fees",
            Self::Other => "other",
        }
    }
}

/// Funding bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FundingCategory {
    Scholarships,
    FederalAid,
    StateAid,
    FamilyContribution,
    Loans,
    WorkStudy,
    Other,
}

impl FundingCategory {
    /// Key used in `fundingBreakdown`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scholarships => "scholarships",
            Self::FederalAid => "federalAid",
            Self::StateAid => "stateAid",
            Self::FamilyContribution => "familyContribution",
            Self::Loans => "loans",
            Self::WorkStudy => "workStudy",
            Self::Other => "other",
        }
    }
}

/// Ordered expense keywords, matched against the lower-cased expense name
pub const EXPENSE_KEYWORDS: &[(ExpenseCategory, &[&str])] = &[
    (ExpenseCategory::Tuition, &["tuition", "course credit"]),
    (
        ExpenseCategory::RoomAndBoard,
        &["room", "board", "housing", "dorm", "rent", "meal", "food", "grocer"],
    ),
    (
        ExpenseCategory::Books,
        &["book", "textbook", "supplies", "laptop", "software"],
    ),
    (
        ExpenseCategory::Transportation,
        &[
            "transport", "travel", "gas", "fuel", "commute", "transit", "parking", "flight",
            "vehicle",
        ],
    ),
    (
        ExpenseCategory::Personal,
        &["personal", "clothing", "entertainment", "phone", "health", "insurance"],
    ),
    (
        ExpenseCategory::Fees,
        &["fee", "lab", "registration", "application", "deposit"],
    ),
];

/// Ordered funding keywords, matched against the lower-cased source type
pub const FUNDING_KEYWORDS: &[(FundingCategory, &[&str])] = &[
    (
        FundingCategory::Scholarships,
        &["scholarship", "award", "merit", "private_grant"],
    ),
    (FundingCategory::FederalAid, &["federal", "pell", "fafsa", "seog"]),
    (FundingCategory::StateAid, &["state", "cal_grant"]),
    (
        FundingCategory::FamilyContribution,
        &["family", "parent", "savings", "529"],
    ),
    (FundingCategory::Loans, &["loan"]),
    (
        FundingCategory::WorkStudy,
        &[
            "work_study", "work-study", "workstudy", "job", "employment", "part_time",
        ],
    ),
];

fn classify<T: Copy>(table: &[(T, &[&str])], input: &str, fallback: T) -> T {
    let lowered = input.to_lowercase();
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map_or(fallback, |(category, _)| *category)
}

/// Buckets an expense by its name.
#[must_use]
pub fn classify_expense(name: &str) -> ExpenseCategory {
    classify(EXPENSE_KEYWORDS, name, ExpenseCategory::Other)
}

/// Buckets a funding source by its type.
#[must_use]
pub fn classify_funding(source_type: &str) -> FundingCategory {
    classify(FUNDING_KEYWORDS, source_type, FundingCategory::Other)
}

/// Expense totals per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBreakdown {
    pub tuition: f64,
    pub room_and_board: f64,
    pub books: f64,
    pub transportation: f64,
    pub personal: f64,
    pub fees: f64,
    pub other: f64,
}

impl ExpenseBreakdown {
    fn add(&mut self, category: ExpenseCategory, amount: f64) {
        let slot = match category {
            ExpenseCategory::Tuition => &mut self.tuition,
            ExpenseCategory::RoomAndBoard => &mut self.room_and_board,
            ExpenseCategory::Books => &mut self.books,
            ExpenseCategory::Transportation => &mut self.transportation,
            ExpenseCategory::Personal => &mut self.personal,
            ExpenseCategory::Fees => &mut self.fees,
            ExpenseCategory::Other => &mut self.other,
        };
        *slot += amount;
    }
}

/// Funding totals per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingBreakdown {
    pub scholarships: f64,
    pub federal_aid: f64,
    pub state_aid: f64,
    pub family_contribution: f64,
    pub loans: f64,
    pub work_study: f64,
    pub other: f64,
}

impl FundingBreakdown {
    fn add(&mut self, category: FundingCategory, amount: f64) {
        let slot = match category {
            FundingCategory::Scholarships => &mut self.scholarships,
            FundingCategory::FederalAid => &mut self.federal_aid,
            FundingCategory::StateAid => &mut self.state_aid,
            FundingCategory::FamilyContribution => &mut self.family_contribution,
            FundingCategory::Loans => &mut self.loans,
            FundingCategory::WorkStudy => &mut self.work_study,
            FundingCategory::Other => &mut self.other,
        };
        *slot += amount;
    }
}

/// Coarse health of funding progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Maps progress (percent) to a risk bucket.
#[must_use]
pub fn risk_level_for(progress_percentage: f64) -> RiskLevel {
    if progress_percentage >= 90.0 {
        RiskLevel::Low
    } else if progress_percentage >= 70.0 {
        RiskLevel::Medium
    } else if progress_percentage >= 40.0 {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

/// Dashboard metrics across all active goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub total_target_amount: f64,
    pub total_current_amount: f64,
    pub total_funding_gap: f64,
    pub progress_percentage: f64,
    pub expense_breakdown: ExpenseBreakdown,
    pub funding_breakdown: FundingBreakdown,
    pub risk_level: RiskLevel,
    pub completion_probability: f64,
    pub recommended_actions: Vec<String>,
    pub warnings: Vec<String>,
}

/// Formats whole dollars with thousands separators, e.g. `$12,345`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, digit) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount <= -0.5 { "-" } else { "" };
    format!("{sign}${grouped}")
}

const LARGE_GAP_THRESHOLD: f64 = 50_000.0;
const MIN_HEALTHY_APPLICATIONS: u64 = 5;

fn is_family_source(name: &str, source_type: &str) -> bool {
    name.to_lowercase().contains("family") || source_type.to_lowercase().contains("family")
}

#[allow(clippy::cast_precision_loss)]
fn completion_probability(stats: &ScholarshipStats, has_overdue_goal: bool) -> f64 {
    let won_score = (stats.funding.won / 1000.0 * 5.0).min(25.0);
    let potential_score = (stats.funding.potential / 1000.0 * 2.0).min(15.0);
    let application_score = (stats.applications.total as f64 * 2.0).min(10.0);
    let penalty = if has_overdue_goal { 10.0 } else { 0.0 };
    (50.0 + won_score + potential_score + application_score - penalty).clamp(0.0, 100.0)
}

fn recommended_actions(risk: RiskLevel, gap: f64, stats: &ScholarshipStats) -> Vec<String> {
    let mut actions: Vec<&str> = Vec::new();
    match risk {
        RiskLevel::Critical => actions.extend([
            "Apply to at least five more scholarships this month",
            "Meet with a financial aid counselor to review your options",
            "Complete or update your FAFSA to unlock federal aid",
        ]),
        RiskLevel::High => actions.extend([
            "Look for local and community scholarships with fewer applicants",
            "Ask your school about institutional grants and work-study",
        ]),
        RiskLevel::Medium => {
            actions.push("Keep applying to scholarships that match your profile");
        }
        RiskLevel::Low => {}
    }
    if stats.applications.total < MIN_HEALTHY_APPLICATIONS {
        actions.push("Submit more applications; you have fewer than five on record");
    }
    if stats.funding.potential > 0.0 && stats.funding.won <= 0.0 {
        actions.push("Follow up on your pending applications");
    }
    if risk == RiskLevel::Low && gap <= 0.0 {
        actions.push("You're fully funded; consider setting a stretch goal");
    }
    actions.into_iter().map(str::to_string).collect()
}

/// Computes dashboard metrics from the user's goals and scholarship stats.
///
/// Only goals with status `active` count. `today` decides which deadlines
/// have passed.
#[must_use]
pub fn calculate_financial_metrics(
    goals: &[GoalWithItems],
    stats: &ScholarshipStats,
    today: NaiveDate,
) -> FinancialMetrics {
    let active: Vec<&GoalWithItems> = goals
        .iter()
        .filter(|g| g.goal.status == GoalStatus::Active)
        .collect();

    let mut expense_breakdown = ExpenseBreakdown::default();
    let mut funding_breakdown = FundingBreakdown::default();
    let mut family_funding = 0.0;
    for goal in &active {
        for expense in &goal.expenses {
            expense_breakdown.add(classify_expense(&expense.name), expense.amount);
        }
        for source in &goal.funding_sources {
            funding_breakdown.add(classify_funding(&source.source_type), source.amount);
            if is_family_source(&source.name, &source.source_type) {
                family_funding += source.amount;
            }
        }
    }

    let total_target_amount: f64 = active.iter().map(|g| g.goal.target_amount).sum();
    let total_current_amount = stats.funding.won + family_funding;
    let total_funding_gap = (total_target_amount - total_current_amount).max(0.0);
    let progress_percentage = if total_target_amount > 0.0 {
        total_current_amount / total_target_amount * 100.0
    } else {
        0.0
    };
    let risk_level = risk_level_for(progress_percentage);

    let overdue: Vec<&str> = active
        .iter()
        .filter(|g| g.goal.deadline.is_some_and(|d| d < today))
        .map(|g| g.goal.title.as_str())
        .collect();

    let mut warnings = Vec::new();
    if total_funding_gap > LARGE_GAP_THRESHOLD {
        warnings.push(format!(
            "Your funding gap of {} is over $50,000; consider loans or additional aid",
            format_currency(total_funding_gap)
        ));
    }
    if stats.applications.submitted > 0 && stats.funding.won <= 0.0 {
        warnings.push(
            "You have submitted applications but have not won any funding yet".to_string(),
        );
    }
    warnings.extend(
        overdue
            .iter()
            .map(|title| format!("Goal \"{title}\" has passed its deadline")),
    );

    FinancialMetrics {
        total_target_amount,
        total_current_amount,
        total_funding_gap,
        progress_percentage,
        expense_breakdown,
        funding_breakdown,
        risk_level,
        completion_probability: completion_probability(stats, !overdue.is_empty()),
        recommended_actions: recommended_actions(risk_level, total_funding_gap, stats),
        warnings,
    }
}
