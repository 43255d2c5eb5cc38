use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::{ApiError, Violation};
use crate::users::repo::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Constraint checks on a registration payload, every violation collected.
pub(crate) fn registration_violations(email: &str, password: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    if !is_valid_email(email) {
        violations.push(Violation::new("email", "email must be a valid address"));
    }
    if password.len() < 8 {
        violations.push(Violation::new(
            "password",
            "password must be at least 8 characters",
        ));
    }
    violations
}

/// Create a user. The plaintext password is hashed exactly once, here,
/// before the insert; no other code path ever rewrites the hash.
pub async fn register_user(db: &PgPool, email: &str, password: &str) -> Result<User, ApiError> {
    let email = email.trim().to_lowercase();

    let violations = registration_violations(&email, password);
    if !violations.is_empty() {
        return Err(ApiError::Validation(violations));
    }

    if User::find_by_email(db, &email).await?.is_some() {
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let hash = hash_password(password).map_err(ApiError::Internal)?;
    let user = User::create(db, &email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Change a user's email. Deliberately narrow: the password hash column is
/// not part of the statement, so re-saving a user cannot re-hash it.
pub async fn change_email(db: &PgPool, id: Uuid, email: &str) -> Result<User, ApiError> {
    let email = email.trim().to_lowercase();

    if !is_valid_email(&email) {
        return Err(ApiError::Validation(vec![Violation::new(
            "email",
            "email must be a valid address",
        )]));
    }

    if let Some(existing) = User::find_by_email(db, &email).await? {
        if existing.id != id {
            return Err(ApiError::Conflict("email already registered".into()));
        }
    }

    let user = User::update_email(db, id, &email).await?;
    info!(user_id = %user.id, email = %user.email, "user email updated");
    Ok(user)
}
