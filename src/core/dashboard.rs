//! Dashboard aggregation - scholarship statistics plus everything the home
//! page shows in one payload.

use crate::{
    core::{
        analytics::{self, FinancialMetrics, ScholarshipStats},
        application::{self, ApplicationWithScholarship},
        goal, notification, scholarship,
    },
    entities::{
        Application, Scholarship, application as application_entity,
        scholarship as scholarship_entity, sea_orm_active_enums::ApplicationStatus, user,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Days ahead shown in the upcoming-deadlines panel
pub const UPCOMING_DEADLINE_DAYS: i64 = 30;
/// Applications shown in the recent-activity panel
pub const RECENT_APPLICATION_LIMIT: u64 = 5;

/// Everything the dashboard renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub user: user::Model,
    pub stats: ScholarshipStats,
    pub upcoming_deadlines: Vec<scholarship_entity::Model>,
    pub recent_applications: Vec<ApplicationWithScholarship>,
    pub financial_metrics: FinancialMetrics,
    pub unread_notifications: u64,
}

/// Summarizes the user's applications.
///
/// `won` uses the recorded award, falling back to the scholarship amount
/// when an accepted application has none. `potential` sums scholarships still
/// awaiting a decision.
pub async fn scholarship_stats<C>(db: &C, user_id: i64) -> Result<ScholarshipStats>
where
    C: ConnectionTrait,
{
    let rows = Application::find()
        .filter(application_entity::Column::UserId.eq(user_id))
        .find_also_related(Scholarship)
        .all(db)
        .await?;

    let mut stats = ScholarshipStats::default();
    for (app, scholarship) in rows {
        let listed_amount = scholarship.map_or(0.0, |s| s.amount);
        stats.applications.total += 1;
        if app.status != ApplicationStatus::Draft {
            stats.applications.submitted += 1;
        }
        match app.status {
            ApplicationStatus::Accepted => {
                stats.applications.accepted += 1;
                stats.funding.won += app.award_amount.unwrap_or(listed_amount);
            }
            ApplicationStatus::Rejected => stats.applications.rejected += 1,
            status if status.is_pending_decision() => stats.funding.potential += listed_amount,
            _ => {}
        }
    }
    Ok(stats)
}

/// Builds the dashboard for `user`. `today` anchors deadline checks.
pub async fn load_dashboard(
    db: &DatabaseConnection,
    user: user::Model,
    today: NaiveDate,
) -> Result<DashboardSummary> {
    let user_id = user.id;
    let stats = scholarship_stats(db, user_id).await?;
    let upcoming_deadlines =
        scholarship::upcoming_deadlines(db, user_id, today, UPCOMING_DEADLINE_DAYS).await?;
    let recent_applications =
        application::list_applications(db, user_id, Some(RECENT_APPLICATION_LIMIT)).await?;
    let goals = goal::list_active_goals_with_items(db, user_id).await?;
    let financial_metrics = analytics::calculate_financial_metrics(&goals, &stats, today);
    let unread_notifications = notification::unread_count(db, user_id).await?;

    debug!(
        user_id,
        applications = stats.applications.total,
        goals = goals.len(),
        "Built dashboard"
    );
    Ok(DashboardSummary {
        user,
        stats,
        upcoming_deadlines,
        recent_applications,
        financial_metrics,
        unread_notifications,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::analytics::{ApplicationStats, FundingStats};
    use crate::core::application::{StatusUpdate, update_application_status};
    use crate::core::scholarship::create_scholarship;
    use crate::test_utils::*;
    use chrono::Duration;

    async fn advance(
        db: &DatabaseConnection,
        user_id: i64,
        app_id: i64,
        path: &[ApplicationStatus],
        award: Option<f64>,
    ) -> Result<()> {
        for (i, status) in path.iter().enumerate() {
            let award_amount = if i + 1 == path.len() { award } else { None };
            update_application_status(
                db,
                user_id,
                app_id,
                StatusUpdate {
                    status: *status,
                    award_amount,
                    notes: None,
                },
            )
            .await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_scholarship_stats() -> Result<()> {
        use ApplicationStatus as S;
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "stats@example.com").await?;

        // Each test scholarship is worth 1000
        let awarded = create_test_application(&db, user.id, "Awarded").await?;
        advance(&db, user.id, awarded.id, &[S::Submitted, S::UnderReview, S::Accepted], Some(750.0))
            .await?;
        let full = create_test_application(&db, user.id, "Full").await?;
        advance(&db, user.id, full.id, &[S::Submitted, S::UnderReview, S::Accepted], None).await?;
        let pending = create_test_application(&db, user.id, "Pending").await?;
        advance(&db, user.id, pending.id, &[S::Submitted], None).await?;
        let waiting = create_test_application(&db, user.id, "Waiting").await?;
        advance(&db, user.id, waiting.id, &[S::Submitted, S::UnderReview, S::Waitlisted], None)
            .await?;
        let denied = create_test_application(&db, user.id, "Denied").await?;
        advance(&db, user.id, denied.id, &[S::Submitted, S::UnderReview, S::Rejected], None)
            .await?;
        create_test_application(&db, user.id, "Drafting").await?;

        let stats = scholarship_stats(&db, user.id).await?;
        assert_eq!(
            stats.applications,
            ApplicationStats {
                total: 6,
                submitted: 5,
                accepted: 2,
                rejected: 1,
            }
        );
        assert_eq!(
            stats.funding,
            FundingStats {
                won: 1750.0,
                potential: 2000.0,
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_load_dashboard() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "dash@example.com").await?;
        let today = chrono::Utc::now().date_naive();

        let mut soon = test_new_scholarship("Due soon");
        soon.deadline = Some(today + Duration::days(3));
        soon.create_application = true;
        create_scholarship(&db, user.id, soon).await?;
        create_test_goal(&db, user.id, "First year").await?;

        let summary = load_dashboard(&db, user.clone(), today).await?;
        assert_eq!(summary.user.id, user.id);
        assert_eq!(summary.upcoming_deadlines.len(), 1);
        assert_eq!(summary.recent_applications.len(), 1);
        assert_eq!(summary.stats.applications.total, 1);
        assert_eq!(summary.financial_metrics.total_target_amount, 10_000.0);
        assert_eq!(summary.unread_notifications, 0);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["financialMetrics"]["riskLevel"].is_string());
        assert!(json["user"].get("passwordHash").is_none());
        Ok(())
    }
}
