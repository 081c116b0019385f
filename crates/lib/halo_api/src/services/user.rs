//! Staff service: IT registration, login, and nurse management.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use halo_core::auth::verify_identity;
use halo_core::filter::build_filter;
use halo_core::filter::maps::USER_FILTERS;
use halo_core::models::user::{Nip, Role};
use halo_core::users;

use super::with_deadline;
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{AuthUserResponse, UserResponse};

/// Register an IT staff member and log them straight in.
pub async fn register_it(
    state: &AppState,
    nip: &Nip,
    name: &str,
    password: &str,
) -> AppResult<AuthUserResponse> {
    let hash = state.hasher.hash(password)?;
    let row = with_deadline(
        state.config.context_timeout(),
        users::register(&state.pool, nip, name, Some(&hash), None),
    )
    .await?;

    let identity = row.identity();
    let token = state.authenticator.issue(&identity)?;
    info!(user_id = %identity.id, "IT staff registered");

    Ok(AuthUserResponse::new(
        identity.id,
        &identity.nip,
        &identity.name,
        Some(token),
    ))
}

/// Log in through the route for `role`. A NIP of another role is reported as
/// an unknown NIP.
pub async fn login(
    state: &AppState,
    nip: &Nip,
    password: &str,
    role: Role,
) -> AppResult<AuthUserResponse> {
    if nip.role() != role {
        return Err(AppError::NotFound("Invalid NIP".into()));
    }

    let identity = with_deadline(
        state.config.context_timeout(),
        verify_identity(&state.pool, state.hasher.as_ref(), nip.as_str(), password),
    )
    .await?;

    let token = state.authenticator.issue(&identity)?;
    info!(user_id = %identity.id, role = %identity.role, "staff logged in");

    Ok(AuthUserResponse::new(
        identity.id,
        &identity.nip,
        &identity.name,
        Some(token),
    ))
}

pub async fn register_nurse(
    state: &AppState,
    nip: &Nip,
    name: &str,
    img_url: &str,
) -> AppResult<AuthUserResponse> {
    let row = with_deadline(
        state.config.context_timeout(),
        users::register(&state.pool, nip, name, None, Some(img_url)),
    )
    .await?;
    Ok(AuthUserResponse::new(row.id, &row.nip, &row.name, None))
}

pub async fn update_nurse(state: &AppState, user_id: Uuid, nip: &Nip, name: &str) -> AppResult<()> {
    with_deadline(
        state.config.context_timeout(),
        users::update_nurse(&state.pool, user_id, nip, name),
    )
    .await
}

pub async fn delete_nurse(state: &AppState, user_id: Uuid) -> AppResult<()> {
    with_deadline(
        state.config.context_timeout(),
        users::delete_nurse(&state.pool, user_id),
    )
    .await
}

/// Give a nurse a password so they can log in.
pub async fn grant_access(state: &AppState, user_id: Uuid, password: &str) -> AppResult<()> {
    let hash = state.hasher.hash(password)?;
    with_deadline(
        state.config.context_timeout(),
        users::update_access(&state.pool, user_id, &hash),
    )
    .await
}

pub async fn list_users(
    state: &AppState,
    params: &HashMap<String, String>,
) -> AppResult<Vec<UserResponse>> {
    let spec = build_filter(params, USER_FILTERS);
    let rows = with_deadline(
        state.config.context_timeout(),
        users::list_users(&state.pool, &spec),
    )
    .await?;
    Ok(rows.into_iter().map(UserResponse::from).collect())
}
