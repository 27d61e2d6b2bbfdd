use std::path::Path;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tripnote_types::UploadResponse;
use uuid::Uuid;

use super::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart field carrying the file
const IMAGE_FIELD: &str = "image";

/// Slack on top of the file limit for multipart framing
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("File exceeds the upload size limit".to_string())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

/// Extension of the client file name, lowercased, or empty when it has none
fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn stored_name(file_name: Option<&str>) -> String {
    format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension_of(file_name)
    )
}

/// POST /api/upload - Store one image and return its public URL
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let is_image = field
            .content_type()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            return Err(ApiError::BadRequest("Only image files are allowed".to_string()));
        }

        let name = stored_name(field.file_name());
        let bytes = field.bytes().await?;
        if bytes.len() > state.max_upload_bytes {
            return Err(ApiError::PayloadTooLarge(
                "File exceeds the upload size limit".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&state.upload_dir)
            .await
            .map_err(|e| ApiError::InternalError(format!("Failed to create upload dir: {e}")))?;
        tokio::fs::write(state.upload_dir.join(&name), &bytes)
            .await
            .map_err(|e| ApiError::InternalError(format!("Failed to store upload: {e}")))?;

        tracing::info!(size = bytes.len(), "stored upload {}", name);
        return Ok(Json(UploadResponse {
            image_url: format!("/uploads/{name}"),
        }));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}
