//! # halo_api
//!
//! HTTP API library for Halo.
//!
//! Routes fall into three groups, each with its own middleware stack:
//!
//! - public: registration, login, info
//! - IT only: [`require_auth`] then [`require_role`] with [`Role::It`]
//! - any authenticated role: [`require_auth`]
//!
//! [`require_auth`]: middleware::auth::require_auth
//! [`require_role`]: middleware::auth::require_role

pub mod blob;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use halo_core::auth::gate::Authenticator;
use halo_core::auth::password::PasswordHasher;
use halo_core::models::user::Role;

use crate::blob::BlobStore;
use crate::config::ApiConfig;
use crate::handlers::{image, info, medical, user};
use crate::services::image::MAX_IMAGE_BYTES;

/// Multipart framing on top of the largest accepted image.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Token issuer, verifier, and cache.
    pub authenticator: Arc<Authenticator>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub blob_store: Arc<dyn BlobStore>,
}

/// Run embedded database migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    halo_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route(routes::POST_USER_IT_REGISTER, post(user::register_it_handler))
        .route(routes::POST_USER_IT_LOGIN, post(user::login_it_handler))
        .route(routes::POST_USER_NURSE_LOGIN, post(user::login_nurse_handler))
        .route(routes::GET_INFO_VERSION, get(info::version_handler))
        .route(routes::GET_INFO_HEALTH, get(info::health_handler));

    // Layers run bottom-up: the auth gate resolves the identity before the
    // role guard inspects it.
    let it_only = Router::new()
        .route(routes::GET_USER, get(user::list_users_handler))
        .route(
            routes::POST_USER_NURSE_REGISTER,
            post(user::register_nurse_handler),
        )
        .route(
            routes::USER_NURSE_ID,
            put(user::update_nurse_handler).delete(user::delete_nurse_handler),
        )
        .route(
            routes::POST_USER_NURSE_ID_ACCESS,
            post(user::grant_access_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            Role::It,
            middleware::auth::require_role,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let any_role = Router::new()
        .route(
            routes::MEDICAL_PATIENT,
            post(medical::record_patient_handler).get(medical::list_patients_handler),
        )
        .route(
            routes::MEDICAL_RECORD,
            post(medical::save_medical_record_handler)
                .get(medical::list_medical_records_handler),
        )
        .route(
            routes::POST_IMAGE,
            post(image::upload_image_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .merge(public)
        .merge(it_only)
        .merge(any_role)
        .nest_service(routes::UPLOADS, uploads)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
