//! Version and health endpoints.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::models::{ApiResponse, HealthResponse, VersionResponse};

/// `GET /v1/info/version`
pub async fn version_handler() -> Json<ApiResponse<VersionResponse>> {
    Json(ApiResponse::with_data(
        "API version",
        VersionResponse {
            version: halo_core::version().to_string(),
        },
    ))
}

/// `GET /v1/info/health`: reports connection pool usage.
pub async fn health_handler(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let pool = &state.pool;
    Json(ApiResponse::with_data(
        "API up and running",
        HealthResponse {
            status: "ok".into(),
            idle_conns: pool.num_idle(),
            total_conns: pool.size(),
            max_conns: pool.options().get_max_connections(),
        },
    ))
}
