//! User business logic - registration, credentials and account settings.
//!
//! Passwords are stored as argon2 PHC strings. Accounts are soft-deleted:
//! every lookup here filters out rows with `deleted_at` set.

use crate::{
    core::{forms, session},
    entities::{
        User,
        sea_orm_active_enums::{EducationLevel, UserRole},
        user,
    },
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Registration request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[serde(default)]
    pub education_level: Option<EducationLevel>,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
}

/// Editable profile fields from the settings page
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub education_level: Option<EducationLevel>,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Hashes a password with argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })
}

/// Checks `candidate` against a stored hash. A mismatch is `Ok(false)`.
pub fn verify_password(password_hash: &str, candidate: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| Error::PasswordHash {
        message: format!("Stored password hash is invalid: {e}"),
    })?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(other) => Err(Error::PasswordHash {
            message: other.to_string(),
        }),
    }
}

/// Finds a user by id, ignoring soft-deleted accounts.
pub async fn get_active_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by email (case-insensitive), ignoring soft-deleted accounts.
pub async fn get_active_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Whether any account, active or soft-deleted, already uses `email`.
pub async fn email_registered<C>(db: &C, email: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let found = User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?;
    Ok(found.is_some())
}

/// Creates an account after validating the registration form.
///
/// Emails are unique across all accounts, including soft-deleted ones, so a
/// deleted address cannot be re-registered.
pub async fn register_user(db: &DatabaseConnection, input: NewUser) -> Result<user::Model> {
    forms::validate_registration(&input)?;

    let email = normalize_email(&input.email);
    if email_registered(db, &email).await? {
        return Err(Error::Conflict {
            message: "An account with this email already exists".to_string(),
        });
    }

    let now = Utc::now();
    let model = user::ActiveModel {
        email: Set(email),
        password_hash: Set(hash_password(&input.password)?),
        first_name: Set(input.first_name.trim().to_string()),
        last_name: Set(input.last_name.trim().to_string()),
        role: Set(input.role),
        education_level: Set(input.education_level),
        gpa: Set(input.gpa),
        school: Set(trimmed(input.school)),
        major: Set(trimmed(input.major)),
        graduation_year: Set(input.graduation_year),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };

    let user = model.insert(db).await?;
    info!(user_id = user.id, role = %user.role, "Registered new user");
    Ok(user)
}

/// Verifies login credentials.
///
/// Unknown emails, wrong passwords and deleted accounts all return
/// `Error::Unauthorized`, so callers cannot tell which one failed.
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let Some(user) = get_active_user_by_email(db, email).await? else {
        return Err(Error::Unauthorized);
    };
    if verify_password(&user.password_hash, password)? {
        Ok(user)
    } else {
        Err(Error::Unauthorized)
    }
}

/// Applies a settings profile update.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i64,
    update: ProfileUpdate,
) -> Result<user::Model> {
    forms::validate_profile(&update)?;

    let user = get_active_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?;

    let mut model: user::ActiveModel = user.into();
    model.first_name = Set(update.first_name.trim().to_string());
    model.last_name = Set(update.last_name.trim().to_string());
    model.education_level = Set(update.education_level);
    model.gpa = Set(update.gpa);
    model.school = Set(trimmed(update.school));
    model.major = Set(trimmed(update.major));
    model.graduation_year = Set(update.graduation_year);
    model.updated_at = Set(Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Changes the password after checking the current one.
///
/// All other sessions are revoked; `keep_token` (the caller's session) survives.
pub async fn change_password(
    db: &DatabaseConnection,
    user_id: i64,
    current_password: &str,
    new_password: &str,
    keep_token: Option<&str>,
) -> Result<()> {
    forms::validate_new_password(new_password)?;

    let user = get_active_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?;

    if !verify_password(&user.password_hash, current_password)? {
        return Err(Error::field(
            "currentPassword",
            "Current password is incorrect",
        ));
    }

    let mut model: user::ActiveModel = user.into();
    model.password_hash = Set(hash_password(new_password)?);
    model.updated_at = Set(Utc::now());
    model.update(db).await?;

    let revoked = session::revoke_other_sessions(db, user_id, keep_token).await?;
    info!(user_id, revoked, "Password changed");
    Ok(())
}

/// Soft-deletes the account and revokes all of its sessions.
pub async fn soft_delete_user(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    let user = get_active_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?;

    let now = Utc::now();
    let mut model: user::ActiveModel = user.into();
    model.deleted_at = Set(Some(now));
    model.updated_at = Set(now);
    model.update(db).await?;

    session::revoke_other_sessions(db, user_id, None).await?;
    info!(user_id, "Soft-deleted user account");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse battery").unwrap());
        assert!(!verify_password(&hash, "wrong").unwrap());
        assert!(matches!(
            verify_password("not-a-hash", "x"),
            Err(Error::PasswordHash { .. })
        ));
    }

    #[tokio::test]
    async fn test_register_validation_runs_before_queries() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let mut input = test_new_user("a@example.com");
        input.password = "short".into();

        let result = register_user(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn test_register_and_authenticate() -> Result<()> {
        let db = setup_test_db().await?;
        let user = register_user(&db, test_new_user("  Jo@Example.com ")).await?;
        assert_eq!(user.email, "jo@example.com");
        assert_eq!(user.role, UserRole::Student);

        let logged_in = authenticate(&db, "JO@example.com", TEST_PASSWORD).await?;
        assert_eq!(logged_in.id, user.id);

        assert!(matches!(
            authenticate(&db, "jo@example.com", "nope-nope").await,
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            authenticate(&db, "ghost@example.com", TEST_PASSWORD).await,
            Err(Error::Unauthorized)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        register_user(&db, test_new_user("dup@example.com")).await?;
        let result = register_user(&db, test_new_user("DUP@example.com")).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "p@example.com").await?;

        let updated = update_profile(
            &db,
            user.id,
            ProfileUpdate {
                first_name: " Pat ".into(),
                last_name: "Kim".into(),
                education_level: Some(EducationLevel::Undergraduate),
                gpa: Some(3.4),
                school: Some("State U".into()),
                major: Some("   ".into()),
                graduation_year: Some(2028),
            },
        )
        .await?;

        assert_eq!(updated.first_name, "Pat");
        assert_eq!(updated.gpa, Some(3.4));
        assert_eq!(updated.major, None);
        assert_eq!(updated.education_level, Some(EducationLevel::Undergraduate));
        Ok(())
    }

    #[tokio::test]
    async fn test_change_password_requires_current() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "c@example.com").await?;

        let wrong = change_password(&db, user.id, "not-it", "new-password-1", None).await;
        assert!(matches!(wrong, Err(Error::Validation { .. })));

        change_password(&db, user.id, TEST_PASSWORD, "new-password-1", None).await?;
        assert!(authenticate(&db, "c@example.com", "new-password-1").await.is_ok());
        assert!(authenticate(&db, "c@example.com", TEST_PASSWORD).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_soft_delete_hides_user_and_blocks_login() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "gone@example.com").await?;
        let token = session::create_session(&db, user.id, 24).await?.token;

        soft_delete_user(&db, user.id).await?;

        assert!(get_active_user_by_id(&db, user.id).await?.is_none());
        assert!(authenticate(&db, "gone@example.com", TEST_PASSWORD).await.is_err());
        assert!(session::validate_session(&db, &token).await?.is_none());

        // Row is still there
        let raw = User::find_by_id(user.id).one(&db).await?.unwrap();
        assert!(raw.deleted_at.is_some());
        Ok(())
    }
}
