//! Image upload service.

use super::with_deadline;
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::ImageUploadResponse;

pub const MIN_IMAGE_BYTES: usize = 10 * 1024;
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const ACCEPTED_CONTENT_TYPE: &str = "image/jpeg";

/// Check an upload's size and declared content type.
pub fn validate_image(content_type: Option<&str>, size: usize) -> AppResult<()> {
    if !(MIN_IMAGE_BYTES..=MAX_IMAGE_BYTES).contains(&size) {
        return Err(AppError::Validation(
            "file size must be between 10KB and 2MB".into(),
        ));
    }
    if content_type != Some(ACCEPTED_CONTENT_TYPE) {
        return Err(AppError::Validation("file type must be image/jpeg".into()));
    }
    Ok(())
}

pub async fn upload_image(
    state: &AppState,
    content_type: Option<&str>,
    bytes: &[u8],
) -> AppResult<ImageUploadResponse> {
    validate_image(content_type, bytes.len())?;
    let image_url = with_deadline(
        state.config.context_timeout(),
        state.blob_store.put(bytes, "jpg"),
    )
    .await?;
    Ok(ImageUploadResponse { image_url })
}
