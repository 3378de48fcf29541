//! Application business logic - applying to scholarships and moving an
//! application through its statuses.
//!
//! Status changes only move forward (see `ApplicationStatus::can_transition_to`).
//! Each change notifies the applicant. The applicant can edit their own
//! applications. A connected counselor or parent needs the
//! `manage_applications` permission.

use crate::{
    core::{connection, notification},
    entities::{
        Application, Scholarship, application, scholarship,
        sea_orm_active_enums::{ApplicationStatus, NotificationKind},
    },
    errors::{Error, Result, ensure_amount},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Permission flag that lets a connected user edit applications
pub const MANAGE_APPLICATIONS: &str = "manage_applications";

/// Request body for creating an application
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub scholarship_id: i64,
    /// Defaults to `draft`
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub award_amount: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for a status change
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub award_amount: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An application with its scholarship for list views
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithScholarship {
    #[serde(flatten)]
    pub application: application::Model,
    pub scholarship: Option<scholarship::Model>,
}

fn check_award(status: ApplicationStatus, award_amount: Option<f64>) -> Result<()> {
    if let Some(amount) = award_amount {
        ensure_amount(amount)?;
        if status != ApplicationStatus::Accepted {
            return Err(Error::field(
                "awardAmount",
                "An award amount can only be recorded on an accepted application",
            ));
        }
    }
    Ok(())
}

/// Inserts an application on any connection, including an open transaction.
///
/// The scholarship must belong to `user_id`, and a user applies to a given
/// scholarship at most once.
pub async fn insert_application<C>(
    db: &C,
    user_id: i64,
    input: NewApplication,
) -> Result<application::Model>
where
    C: ConnectionTrait,
{
    let status = input.status.unwrap_or(ApplicationStatus::Draft);
    check_award(status, input.award_amount)?;

    Scholarship::find_by_id(input.scholarship_id)
        .filter(scholarship::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Scholarship", input.scholarship_id))?;

    let existing = Application::find()
        .filter(application::Column::UserId.eq(user_id))
        .filter(application::Column::ScholarshipId.eq(input.scholarship_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict {
            message: "You already have an application for this scholarship".to_string(),
        });
    }

    let now = Utc::now();
    let model = application::ActiveModel {
        user_id: Set(user_id),
        scholarship_id: Set(input.scholarship_id),
        status: Set(status),
        award_amount: Set(input.award_amount),
        submitted_at: Set((status != ApplicationStatus::Draft).then_some(now)),
        notes: Set(input.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Creates an application for one of the user's scholarships.
pub async fn create_application(
    db: &DatabaseConnection,
    user_id: i64,
    input: NewApplication,
) -> Result<application::Model> {
    let created = insert_application(db, user_id, input).await?;
    info!(user_id, application_id = created.id, "Created application");
    Ok(created)
}

/// Lists a user's applications, most recently updated first.
pub async fn list_applications(
    db: &DatabaseConnection,
    user_id: i64,
    limit: Option<u64>,
) -> Result<Vec<ApplicationWithScholarship>> {
    let mut query = Application::find()
        .filter(application::Column::UserId.eq(user_id))
        .order_by_desc(application::Column::UpdatedAt)
        .order_by_desc(application::Column::Id);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    Ok(query
        .find_also_related(Scholarship)
        .all(db)
        .await?
        .into_iter()
        .map(|(application, scholarship)| ApplicationWithScholarship {
            application,
            scholarship,
        })
        .collect())
}

/// Lists `owner_id`'s applications for `viewer_id`.
///
/// A viewer other than the owner needs an accepted connection granting
/// `view_applications`, otherwise `Error::Forbidden`.
pub async fn list_applications_for(
    db: &DatabaseConnection,
    viewer_id: i64,
    owner_id: i64,
    limit: Option<u64>,
) -> Result<Vec<ApplicationWithScholarship>> {
    if !connection::has_permission(db, viewer_id, owner_id, connection::VIEW_APPLICATIONS).await?
    {
        return Err(Error::Forbidden {
            message: "You do not have access to this user's applications".to_string(),
        });
    }
    list_applications(db, owner_id, limit).await
}

/// Changes an application's status.
///
/// `actor_id` may be the applicant or a connected user holding
/// [`MANAGE_APPLICATIONS`]. Backward moves fail with
/// `Error::InvalidStatusTransition`. Reaching `submitted` for the first time
/// stamps `submitted_at`. The applicant is notified of every real change.
pub async fn update_application_status(
    db: &DatabaseConnection,
    actor_id: i64,
    application_id: i64,
    update: StatusUpdate,
) -> Result<application::Model> {
    let txn = db.begin().await?;

    let (found, scholarship) = Application::find_by_id(application_id)
        .find_also_related(Scholarship)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Application", application_id))?;

    if found.user_id != actor_id
        && !connection::has_permission(&txn, actor_id, found.user_id, MANAGE_APPLICATIONS)
            .await?
    {
        return Err(Error::not_found("Application", application_id));
    }

    let previous = found.status;
    if !previous.can_transition_to(update.status) {
        return Err(Error::InvalidStatusTransition {
            from: previous.to_string(),
            to: update.status.to_string(),
        });
    }
    check_award(update.status, update.award_amount)?;

    let now = Utc::now();
    let applicant_id = found.user_id;
    let had_submitted_at = found.submitted_at.is_some();
    let mut model: application::ActiveModel = found.into();
    model.status = Set(update.status);
    if update.status == ApplicationStatus::Submitted && !had_submitted_at {
        model.submitted_at = Set(Some(now));
    }
    if update.award_amount.is_some() {
        model.award_amount = Set(update.award_amount);
    }
    if update.notes.is_some() {
        model.notes = Set(update.notes);
    }
    model.updated_at = Set(now);
    let updated = model.update(&txn).await?;

    if previous != update.status {
        let title = scholarship.map_or_else(|| "your scholarship".to_string(), |s| s.title);
        notification::create_notification(
            &txn,
            applicant_id,
            NotificationKind::ApplicationUpdate,
            "Application status updated",
            format!(
                "Your application for {title} moved from {previous} to {}",
                update.status
            ),
        )
        .await?;
    }

    txn.commit().await?;
    info!(
        actor_id,
        application_id,
        from = %previous,
        to = %update.status,
        "Updated application status"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::notification::list_notifications;
    use crate::core::connection::VIEW_APPLICATIONS;
    use crate::entities::sea_orm_active_enums::ConnectionRelationship;
    use crate::test_utils::*;

    fn to(status: ApplicationStatus) -> StatusUpdate {
        StatusUpdate {
            status,
            award_amount: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_application_rules() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "a@example.com").await?;
        let other = create_test_user(&db, "b@example.com").await?;
        let s = create_test_scholarship(&db, user.id, "Fund").await?;

        let app = create_application(
            &db,
            user.id,
            NewApplication {
                scholarship_id: s.id,
                status: None,
                award_amount: None,
                notes: Some("essay drafted".into()),
            },
        )
        .await?;
        assert_eq!(app.status, ApplicationStatus::Draft);
        assert!(app.submitted_at.is_none());

        let duplicate = create_application(
            &db,
            user.id,
            NewApplication {
                scholarship_id: s.id,
                status: None,
                award_amount: None,
                notes: None,
            },
        )
        .await;
        assert!(matches!(duplicate, Err(Error::Conflict { .. })));

        let foreign = create_application(
            &db,
            other.id,
            NewApplication {
                scholarship_id: s.id,
                status: None,
                award_amount: None,
                notes: None,
            },
        )
        .await;
        assert!(matches!(foreign, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_moves_forward_and_notifies() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "f@example.com").await?;
        let app = create_test_application(&db, user.id, "Forward Fund").await?;

        let submitted =
            update_application_status(&db, user.id, app.id, to(ApplicationStatus::Submitted))
                .await?;
        assert!(submitted.submitted_at.is_some());

        update_application_status(&db, user.id, app.id, to(ApplicationStatus::UnderReview))
            .await?;

        let backwards =
            update_application_status(&db, user.id, app.id, to(ApplicationStatus::Draft)).await;
        assert!(matches!(
            backwards,
            Err(Error::InvalidStatusTransition { .. })
        ));

        let accepted = update_application_status(
            &db,
            user.id,
            app.id,
            StatusUpdate {
                status: ApplicationStatus::Accepted,
                award_amount: Some(1500.0),
                notes: None,
            },
        )
        .await?;
        assert_eq!(accepted.award_amount, Some(1500.0));
        assert_eq!(accepted.submitted_at, submitted.submitted_at);

        let notes = list_notifications(&db, user.id, false, None).await?;
        assert_eq!(notes.len(), 3);
        assert!(notes[0].message.contains("under_review to accepted"));
        Ok(())
    }

    #[tokio::test]
    async fn test_award_requires_accepted() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "w@example.com").await?;
        let app = create_test_application(&db, user.id, "Award Fund").await?;

        let result = update_application_status(
            &db,
            user.id,
            app.id,
            StatusUpdate {
                status: ApplicationStatus::Submitted,
                award_amount: Some(100.0),
                notes: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_counselor_needs_permission() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_user(&db, "stu@example.com").await?;
        let counselor = create_test_user(&db, "coun@example.com").await?;
        let app = create_test_application(&db, student.id, "Guided Fund").await?;

        let denied = update_application_status(
            &db,
            counselor.id,
            app.id,
            to(ApplicationStatus::Submitted),
        )
        .await;
        assert!(matches!(denied, Err(Error::NotFound { .. })));

        connect_users(
            &db,
            counselor.id,
            student.id,
            ConnectionRelationship::CounselorStudent,
            serde_json::json!({ MANAGE_APPLICATIONS: true }),
        )
        .await?;

        let allowed = update_application_status(
            &db,
            counselor.id,
            app.id,
            to(ApplicationStatus::Submitted),
        )
        .await?;
        assert_eq!(allowed.status, ApplicationStatus::Submitted);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_applications_includes_scholarship() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "li@example.com").await?;
        create_test_application(&db, user.id, "One").await?;
        create_test_application(&db, user.id, "Two").await?;

        let listed = list_applications(&db, user.id, Some(1)).await?;
        assert_eq!(listed.len(), 1);
        assert!(listed[0].scholarship.is_some());
        assert_eq!(list_applications(&db, user.id, None).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_viewing_another_users_applications_needs_permission() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_user(&db, "kid@example.com").await?;
        let parent = create_test_user(&db, "parent@example.com").await?;
        create_test_application(&db, student.id, "Family Fund").await?;

        let denied = list_applications_for(&db, parent.id, student.id, None).await;
        assert!(matches!(denied, Err(Error::Forbidden { .. })));

        connect_users(
            &db,
            parent.id,
            student.id,
            ConnectionRelationship::ParentChild,
            serde_json::json!({ VIEW_APPLICATIONS: true }),
        )
        .await?;

        let listed = list_applications_for(&db, parent.id, student.id, None).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].application.user_id, student.id);
        assert_eq!(
            list_applications_for(&db, student.id, student.id, None)
                .await?
                .len(),
            1
        );
        Ok(())
    }
}
