//! Image upload handler.

use axum::Json;
use axum::extract::{Multipart, State};
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ApiResponse, ImageUploadResponse};
use crate::services::image;

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

/// `POST /v1/image`: multipart `file`, JPEG only.
pub async fn upload_image_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<ImageUploadResponse>>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        debug!(size = bytes.len(), content_type = ?content_type, "image received");

        let data = image::upload_image(&state, content_type.as_deref(), &bytes).await?;
        return Ok(Json(ApiResponse::with_data("File uploaded successfully", data)));
    }

    Err(AppError::Validation("file is required".into()))
}
