//! Authentication and authorization logic.
//!
//! Provides credential hashing, access token issuing/verification, the
//! process-wide token cache, and the per-request auth gate and role guard
//! shared by every protected route in `halo_api`.

pub mod cache;
pub mod gate;
pub mod jwt;
pub mod password;

use sqlx::PgPool;
use thiserror::Error;

use crate::models::user::Identity;
use crate::users::{self, UserRow};
use password::PasswordHasher;

/// Login and token-issuing errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    NotFound,

    #[error("Invalid password")]
    BadSecret,

    #[error("Access not allowed")]
    AccessNotAllowed,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reasons a request fails the auth gate. Messages are short and fixed; they
/// never echo the token or key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("Missing access token")]
    MissingToken,

    /// Outside the token's `nbf`..`exp` window.
    #[error("Access token expired")]
    Expired,

    #[error("Invalid access token")]
    BadSignature,

    #[error("Malformed access token")]
    Malformed,
}

/// The resolved identity's role does not match the route's required role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Access not allowed for this role")]
pub struct Forbidden;

/// Look up a staff member by NIP and check the supplied password.
pub async fn verify_identity(
    pool: &PgPool,
    hasher: &dyn PasswordHasher,
    nip: &str,
    secret: &str,
) -> Result<Identity, AuthError> {
    let user = users::find_by_nip(pool, nip).await?;
    check_credentials(user.as_ref(), hasher, secret)
}

/// Nurses without a password hash have not been granted access yet and are
/// rejected before any hash comparison.
pub fn check_credentials(
    user: Option<&UserRow>,
    hasher: &dyn PasswordHasher,
    secret: &str,
) -> Result<Identity, AuthError> {
    let user = user.ok_or(AuthError::NotFound)?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or(AuthError::AccessNotAllowed)?;

    if !hasher.verify(secret, hash)? {
        return Err(AuthError::BadSecret);
    }

    Ok(user.identity())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::user::Role;
    use password::Bcrypt;

    fn nurse(password_hash: Option<String>) -> UserRow {
        UserRow {
            id: Uuid::now_v7(),
            nip: "3031200101234".into(),
            name: "Nurse Joy".into(),
            password_hash,
            is_it: false,
            img_url: Some("https://cdn.example.com/card.jpg".into()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unknown_nip_is_not_found() {
        let hasher = Bcrypt::new(4);
        assert!(matches!(
            check_credentials(None, &hasher, "secret"),
            Err(AuthError::NotFound)
        ));
    }

    #[test]
    fn nurse_without_access_is_rejected_before_hashing() {
        let hasher = Bcrypt::new(4);
        assert!(matches!(
            check_credentials(Some(&nurse(None)), &hasher, "secret"),
            Err(AuthError::AccessNotAllowed)
        ));
    }

    #[test]
    fn wrong_password_is_bad_secret() {
        let hasher = Bcrypt::new(4);
        let user = nurse(Some(hasher.hash("right").unwrap()));
        assert!(matches!(
            check_credentials(Some(&user), &hasher, "wrong"),
            Err(AuthError::BadSecret)
        ));
    }

    #[test]
    fn matching_password_yields_identity() {
        let hasher = Bcrypt::new(4);
        let user = nurse(Some(hasher.hash("right").unwrap()));
        let identity = check_credentials(Some(&user), &hasher, "right").unwrap();
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.role, Role::Nurse);
    }
}
