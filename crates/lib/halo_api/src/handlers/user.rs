//! Staff request handlers.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use halo_core::models::user::Role;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{
    ApiResponse, AuthUserResponse, LoginRequest, RegisterItRequest, RegisterNurseRequest,
    UpdateAccessRequest, UpdateNurseRequest, UserResponse,
};
use crate::services::user;

fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("userId must be a valid id".into()))
}

/// `POST /v1/user/it/register`
pub async fn register_it_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterItRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthUserResponse>>)> {
    let nip = body.validate()?;
    let data = user::register_it(&state, &nip, &body.name, &body.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data("User registered successfully", data)),
    ))
}

/// `POST /v1/user/it/login`
pub async fn login_it_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthUserResponse>>> {
    let nip = body.validate()?;
    let data = user::login(&state, &nip, &body.password, Role::It).await?;
    Ok(Json(ApiResponse::with_data("User logged in successfully", data)))
}

/// `POST /v1/user/nurse/login`
pub async fn login_nurse_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthUserResponse>>> {
    let nip = body.validate()?;
    let data = user::login(&state, &nip, &body.password, Role::Nurse).await?;
    Ok(Json(ApiResponse::with_data("User logged in successfully", data)))
}

/// `GET /v1/user`. IT only.
pub async fn list_users_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let data = user::list_users(&state, &params).await?;
    Ok(Json(ApiResponse::with_data("Users retrieved successfully", data)))
}

/// `POST /v1/user/nurse/register`. IT only.
pub async fn register_nurse_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterNurseRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthUserResponse>>)> {
    let nip = body.validate()?;
    let data = user::register_nurse(&state, &nip, &body.name, &body.identity_card_scan_img).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data("User registered successfully", data)),
    ))
}

/// `PUT /v1/user/nurse/{user_id}`. IT only.
pub async fn update_nurse_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateNurseRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let user_id = parse_user_id(&user_id)?;
    let nip = body.validate()?;
    user::update_nurse(&state, user_id, &nip, &body.name).await?;
    Ok(Json(ApiResponse::message("User updated successfully")))
}

/// `DELETE /v1/user/nurse/{user_id}`. IT only.
pub async fn delete_nurse_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let user_id = parse_user_id(&user_id)?;
    user::delete_nurse(&state, user_id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

/// `POST /v1/user/nurse/{user_id}/access`. IT only.
pub async fn grant_access_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateAccessRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let user_id = parse_user_id(&user_id)?;
    body.validate()?;
    user::grant_access(&state, user_id, &body.password).await?;
    Ok(Json(ApiResponse::message("Access updated successfully")))
}
