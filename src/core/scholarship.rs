//! Scholarship business logic - tracking, quick-add and listing.
//!
//! Scholarships belong to the user who added them. Quick-add creates the
//! scholarship and the caller's application together in one database
//! transaction.

use crate::{
    core::application::{self, NewApplication},
    entities::{
        Application, Scholarship, application as application_entity, scholarship,
        sea_orm_active_enums::{ApplicationStatus, ScholarshipStatus},
    },
    errors::{Error, Result, ensure_amount},
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Request body for adding a scholarship
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScholarship {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub provider: String,
    #[serde(default)]
    pub eligibility: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<ScholarshipStatus>,
    /// Also create the caller's application (quick-add)
    #[serde(default)]
    pub create_application: bool,
    /// Initial application status when `create_application` is set
    #[serde(default)]
    pub application_status: Option<ApplicationStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Listing filters from the query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipFilter {
    pub status: Option<ScholarshipStatus>,
    /// Case-insensitive match on title or provider
    pub search: Option<String>,
}

/// A scholarship with the owner's application, if any
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipWithApplication {
    #[serde(flatten)]
    pub scholarship: scholarship::Model,
    pub application: Option<application_entity::Model>,
}

fn validate_new_scholarship(input: &NewScholarship) -> Result<String> {
    if input.title.trim().is_empty() {
        return Err(Error::field("title", "This field is required"));
    }
    if input.provider.trim().is_empty() {
        return Err(Error::field("provider", "This field is required"));
    }
    ensure_amount(input.amount)?;

    let currency = input
        .currency
        .as_deref()
        .map_or_else(|| "USD".to_string(), |c| c.trim().to_uppercase());
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::field(
            "currency",
            "Currency must be a three-letter code",
        ));
    }
    Ok(currency)
}

/// Adds a scholarship and, when requested, the owner's application.
///
/// Both rows are written in one transaction, so a failed application insert
/// leaves no orphan scholarship behind.
pub async fn create_scholarship(
    db: &DatabaseConnection,
    user_id: i64,
    input: NewScholarship,
) -> Result<ScholarshipWithApplication> {
    let currency = validate_new_scholarship(&input)?;
    let now = Utc::now();

    let txn = db.begin().await?;

    let scholarship = scholarship::ActiveModel {
        user_id: Set(user_id),
        title: Set(input.title.trim().to_string()),
        description: Set(input.description),
        amount: Set(input.amount),
        currency: Set(currency),
        provider: Set(input.provider.trim().to_string()),
        eligibility: Set(input.eligibility),
        deadline: Set(input.deadline),
        url: Set(input.url),
        status: Set(input.status.unwrap_or(ScholarshipStatus::Active)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let application = if input.create_application {
        Some(
            application::insert_application(
                &txn,
                user_id,
                NewApplication {
                    scholarship_id: scholarship.id,
                    status: input.application_status,
                    award_amount: None,
                    notes: input.notes,
                },
            )
            .await?,
        )
    } else {
        None
    };

    txn.commit().await?;

    info!(
        user_id,
        scholarship_id = scholarship.id,
        with_application = application.is_some(),
        "Created scholarship"
    );
    Ok(ScholarshipWithApplication {
        scholarship,
        application,
    })
}

/// Finds one of the user's scholarships.
pub async fn get_scholarship_for_user<C>(
    db: &C,
    user_id: i64,
    scholarship_id: i64,
) -> Result<scholarship::Model>
where
    C: ConnectionTrait,
{
    Scholarship::find_by_id(scholarship_id)
        .filter(scholarship::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Scholarship", scholarship_id))
}

/// Lists the user's scholarships, soonest deadline first, each with the
/// user's application attached.
pub async fn list_scholarships(
    db: &DatabaseConnection,
    user_id: i64,
    filter: &ScholarshipFilter,
) -> Result<Vec<ScholarshipWithApplication>> {
    let mut query = Scholarship::find().filter(scholarship::Column::UserId.eq(user_id));

    if let Some(status) = filter.status {
        query = query.filter(scholarship::Column::Status.eq(status));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(scholarship::Column::Title.contains(search))
                .add(scholarship::Column::Provider.contains(search)),
        );
    }

    let scholarships = query
        .order_by_asc(scholarship::Column::Deadline)
        .order_by_asc(scholarship::Column::Title)
        .all(db)
        .await?;

    let ids: Vec<i64> = scholarships.iter().map(|s| s.id).collect();
    let mut applications: HashMap<i64, application_entity::Model> = Application::find()
        .filter(application_entity::Column::UserId.eq(user_id))
        .filter(application_entity::Column::ScholarshipId.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.scholarship_id, a))
        .collect();

    Ok(scholarships
        .into_iter()
        .map(|scholarship| ScholarshipWithApplication {
            application: applications.remove(&scholarship.id),
            scholarship,
        })
        .collect())
}

/// Sets the listing status of one of the user's scholarships.
pub async fn update_scholarship_status(
    db: &DatabaseConnection,
    user_id: i64,
    scholarship_id: i64,
    status: ScholarshipStatus,
) -> Result<scholarship::Model> {
    let found = get_scholarship_for_user(db, user_id, scholarship_id).await?;
    let mut model: scholarship::ActiveModel = found.into();
    model.status = Set(status);
    model.updated_at = Set(Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Deletes one of the user's scholarships together with its applications.
pub async fn delete_scholarship(
    db: &DatabaseConnection,
    user_id: i64,
    scholarship_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;
    let found = get_scholarship_for_user(&txn, user_id, scholarship_id).await?;

    Application::delete_many()
        .filter(application_entity::Column::ScholarshipId.eq(found.id))
        .exec(&txn)
        .await?;
    found.delete(&txn).await?;

    txn.commit().await?;
    info!(user_id, scholarship_id, "Deleted scholarship");
    Ok(())
}

/// Active scholarships whose deadline falls within `days` of `today`, inclusive.
pub async fn upcoming_deadlines(
    db: &DatabaseConnection,
    user_id: i64,
    today: NaiveDate,
    days: i64,
) -> Result<Vec<scholarship::Model>> {
    Scholarship::find()
        .filter(scholarship::Column::UserId.eq(user_id))
        .filter(scholarship::Column::Status.eq(ScholarshipStatus::Active))
        .filter(scholarship::Column::Deadline.gte(today))
        .filter(scholarship::Column::Deadline.lte(today + Duration::days(days)))
        .order_by_asc(scholarship::Column::Deadline)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_scholarship_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut input = test_new_scholarship("  ");
        assert!(matches!(
            create_scholarship(&db, 1, input.clone()).await,
            Err(Error::Validation { .. })
        ));

        input.title = "Valid".into();
        input.amount = -5.0;
        assert!(matches!(
            create_scholarship(&db, 1, input.clone()).await,
            Err(Error::InvalidAmount { .. })
        ));

        input.amount = 100.0;
        input.currency = Some("dollars".into());
        assert!(matches!(
            create_scholarship(&db, 1, input).await,
            Err(Error::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_quick_add_creates_application() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "q@example.com").await?;

        let mut input = test_new_scholarship("Quick Add Fund");
        input.currency = Some("eur".into());
        input.create_application = true;
        input.application_status = Some(ApplicationStatus::Submitted);

        let created = create_scholarship(&db, user.id, input).await?;
        assert_eq!(created.scholarship.currency, "EUR");
        assert_eq!(created.scholarship.status, ScholarshipStatus::Active);
        let app = created.application.unwrap();
        assert_eq!(app.status, ApplicationStatus::Submitted);
        assert!(app.submitted_at.is_some());
        assert_eq!(app.scholarship_id, created.scholarship.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_filters_and_scopes_to_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "l@example.com").await?;
        let other = create_test_user(&db, "m@example.com").await?;

        let stem = create_test_scholarship(&db, user.id, "STEM Award").await?;
        let arts = create_test_scholarship(&db, user.id, "Arts Grant").await?;
        create_test_scholarship(&db, other.id, "STEM Elsewhere").await?;
        update_scholarship_status(&db, user.id, arts.id, ScholarshipStatus::Closed).await?;

        let all = list_scholarships(&db, user.id, &ScholarshipFilter::default()).await?;
        assert_eq!(all.len(), 2);

        let active = list_scholarships(
            &db,
            user.id,
            &ScholarshipFilter {
                status: Some(ScholarshipStatus::Active),
                search: None,
            },
        )
        .await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].scholarship.id, stem.id);

        let searched = list_scholarships(
            &db,
            user.id,
            &ScholarshipFilter {
                status: None,
                search: Some("stem".into()),
            },
        )
        .await?;
        assert_eq!(searched.len(), 1);
        assert!(searched[0].application.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_other_users_cannot_touch_scholarship() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "own@example.com").await?;
        let intruder = create_test_user(&db, "in@example.com").await?;
        let s = create_test_scholarship(&db, owner.id, "Mine").await?;

        assert!(matches!(
            update_scholarship_status(&db, intruder.id, s.id, ScholarshipStatus::Closed).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            delete_scholarship(&db, intruder.id, s.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_removes_applications() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "d@example.com").await?;
        let mut input = test_new_scholarship("Doomed");
        input.create_application = true;
        let created = create_scholarship(&db, user.id, input).await?;

        delete_scholarship(&db, user.id, created.scholarship.id).await?;

        assert!(Scholarship::find_by_id(created.scholarship.id).one(&db).await?.is_none());
        assert!(Application::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_upcoming_deadlines_window() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "u@example.com").await?;
        let today = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();

        for (title, offset) in [("Past", -1), ("Today", 0), ("Soon", 20), ("Later", 45)] {
            let mut input = test_new_scholarship(title);
            input.deadline = Some(today + Duration::days(offset));
            create_scholarship(&db, user.id, input).await?;
        }

        let upcoming = upcoming_deadlines(&db, user.id, today, 30).await?;
        let titles: Vec<&str> = upcoming.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Today", "Soon"]);
        Ok(())
    }
}
