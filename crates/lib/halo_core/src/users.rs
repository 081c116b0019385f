//! Staff persistence: registration, nurse management, and the user list.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::filter::maps::USER_FILTERS;
use crate::filter::{FilterSpec, bind_params, render};
use crate::models::user::{Identity, Nip, Role};
use crate::ids;

const USER_COLUMNS: &str = "id, nip, name, password_hash, is_it, img_url, created_at";

/// Row returned by user queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub nip: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub is_it: bool,
    pub img_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn role(&self) -> Role {
        if self.is_it { Role::It } else { Role::Nurse }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            nip: self.nip.clone(),
            name: self.name.clone(),
            role: self.role(),
        }
    }
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("NIP already registered")]
    DuplicateNip,

    #[error("User not found")]
    NotFound,

    #[error("User not found or is not a nurse")]
    NotFoundOrNotNurse,

    #[error("Database error: {0}")]
    DbError(sqlx::Error),
}

impl From<sqlx::Error> for UserError {
    fn from(e: sqlx::Error) -> Self {
        if e.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            UserError::DuplicateNip
        } else {
            UserError::DbError(e)
        }
    }
}

/// Insert a staff member. IT staff register with a password hash; nurses are
/// created without one and carry an identity card image URL.
pub async fn register(
    pool: &PgPool,
    nip: &Nip,
    name: &str,
    password_hash: Option<&str>,
    img_url: Option<&str>,
) -> Result<UserRow, UserError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (id, nip, name, password_hash, is_it, img_url) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
    ))
    .bind(ids::staff_id())
    .bind(nip.as_str())
    .bind(name)
    .bind(password_hash)
    .bind(nip.role() == Role::It)
    .bind(img_url)
    .fetch_one(pool)
    .await?;

    debug!(user_id = %row.id, role = %row.role(), "user registered");
    Ok(row)
}

/// Fetch a user by NIP.
pub async fn find_by_nip(pool: &PgPool, nip: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE nip = $1"
    ))
    .bind(nip)
    .fetch_optional(pool)
    .await
}

/// Change a nurse's NIP and name.
pub async fn update_nurse(
    pool: &PgPool,
    user_id: Uuid,
    nip: &Nip,
    name: &str,
) -> Result<(), UserError> {
    let result =
        sqlx::query("UPDATE users SET nip = $2, name = $3 WHERE id = $1 AND is_it = FALSE")
            .bind(user_id)
            .bind(nip.as_str())
            .bind(name)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(UserError::NotFound);
    }
    Ok(())
}

/// Nurse-only statements filter on `is_it = FALSE`, so zero affected rows
/// covers both an unknown id and an IT account.
fn nurse_row_affected(rows: u64) -> Result<(), UserError> {
    if rows == 0 {
        Err(UserError::NotFoundOrNotNurse)
    } else {
        Ok(())
    }
}

/// Remove a nurse.
pub async fn delete_nurse(pool: &PgPool, user_id: Uuid) -> Result<(), UserError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1 AND is_it = FALSE")
        .bind(user_id)
        .execute(pool)
        .await?;

    nurse_row_affected(result.rows_affected())
}

/// Grant a nurse login access by setting their password hash.
pub async fn update_access(
    pool: &PgPool,
    user_id: Uuid,
    password_hash: &str,
) -> Result<(), UserError> {
    let result =
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1 AND is_it = FALSE")
            .bind(user_id)
            .bind(password_hash)
            .execute(pool)
            .await?;

    nurse_row_affected(result.rows_affected())
}

/// List users matching `spec`.
pub async fn list_users(pool: &PgPool, spec: &FilterSpec) -> Result<Vec<UserRow>, UserError> {
    let rendered = render(spec, USER_FILTERS);
    let sql = format!("SELECT {USER_COLUMNS} FROM users{}", rendered.fragment);
    let rows = bind_params(sqlx::query_as::<_, UserRow>(&sql), &rendered.params)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(is_it: bool) -> UserRow {
        UserRow {
            id: Uuid::nil(),
            nip: "3031200101234".into(),
            name: "Nurse Joy".into(),
            password_hash: None,
            is_it,
            img_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn role_follows_is_it_flag() {
        assert_eq!(row(true).role(), Role::It);
        assert_eq!(row(false).role(), Role::Nurse);
    }

    #[test]
    fn identity_copies_row_fields() {
        let identity = row(false).identity();
        assert_eq!(identity.id, Uuid::nil());
        assert_eq!(identity.nip, "3031200101234");
        assert_eq!(identity.role, Role::Nurse);
    }

    #[test]
    fn non_database_errors_stay_db_errors() {
        assert!(matches!(
            UserError::from(sqlx::Error::RowNotFound),
            UserError::DbError(_)
        ));
    }

    #[test]
    fn nurse_only_statement_touching_no_rows_is_not_found_or_not_nurse() {
        assert!(matches!(
            nurse_row_affected(0),
            Err(UserError::NotFoundOrNotNurse)
        ));
        assert!(nurse_row_affected(1).is_ok());
        assert_eq!(
            UserError::NotFoundOrNotNurse.to_string(),
            "User not found or is not a nurse"
        );
    }
}
