//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use halo_core::auth::{AuthError, AuthFailure, Forbidden};
use halo_core::medical::MedicalError;
use halo_core::models::user::NipError;
use halo_core::users::UserError;

use crate::blob::BlobError;
use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Deadline exceeded")]
    Timeout,

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                "Request took too long",
            ),
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".into()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthFailure> for AppError {
    fn from(e: AuthFailure) -> Self {
        AppError::Unauthorized(e.to_string())
    }
}

impl From<Forbidden> for AppError {
    fn from(e: Forbidden) -> Self {
        AppError::Forbidden(e.to_string())
    }
}

impl From<NipError> for AppError {
    fn from(e: NipError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::NotFound => AppError::NotFound(e.to_string()),
            AuthError::BadSecret | AuthError::AccessNotAllowed => {
                AppError::Validation(e.to_string())
            }
            AuthError::TokenError(msg) | AuthError::Internal(msg) => AppError::Internal(msg),
            AuthError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::DuplicateNip => AppError::Conflict(e.to_string()),
            UserError::NotFound => AppError::NotFound(e.to_string()),
            UserError::NotFoundOrNotNurse => AppError::Validation(e.to_string()),
            UserError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<MedicalError> for AppError {
    fn from(e: MedicalError) -> Self {
        match e {
            MedicalError::DuplicatePatient => AppError::Conflict(e.to_string()),
            MedicalError::PatientNotFound => AppError::NotFound(e.to_string()),
            MedicalError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<BlobError> for AppError {
    fn from(e: BlobError) -> Self {
        AppError::Internal(e.to_string())
    }
}
