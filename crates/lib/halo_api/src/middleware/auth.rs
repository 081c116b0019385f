//! Auth gate and role guard middleware.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use halo_core::auth::AuthFailure;
use halo_core::auth::gate::authorize;
use halo_core::models::user::{Identity, Role};

use crate::AppState;
use crate::error::AppError;

/// Identity resolved by [`require_auth`], stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

/// Resolves `Authorization: Bearer <token>` through the token cache (or
/// signature verification on a miss) and injects [`AuthenticatedUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let identity = state.authenticator.authenticate(header).map_err(|failure| {
        debug!(reason = %failure, path = %request.uri().path(), "request rejected by auth gate");
        AppError::from(failure)
    })?;

    request.extensions_mut().insert(AuthenticatedUser(identity));

    Ok(next.run(request).await)
}

/// Rejects the request with 403 unless the authenticated identity holds the
/// role this layer was built with. Must be layered inside [`require_auth`].
pub async fn require_role(
    State(required): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or(AuthFailure::MissingToken)?;

    if let Err(forbidden) = authorize(&user.0, required) {
        debug!(user_id = %user.0.id, role = %user.0.role, %required, "role guard rejected request");
        return Err(forbidden.into());
    }

    Ok(next.run(request).await)
}
