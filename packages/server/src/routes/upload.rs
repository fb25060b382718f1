//! Image upload handler.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use api::state::AppState;
use api::UploadedFile;

use crate::error::AppError;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let original_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;

        tracing::debug!(
            "upload_image: content_type={} name_len={} bytes={}",
            content_type,
            original_name.len(),
            bytes.len()
        );
        file = Some(UploadedFile::new(bytes.to_vec(), content_type, original_name));
        break;
    }

    let image_url = state.uploads.store(file).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { image_url })))
}

/// Bodies over the route limit surface here rather than in `Uploads::store`.
fn multipart_error(e: MultipartError) -> api::Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        api::Error::validation("file too large")
    } else {
        api::Error::validation(e.body_text())
    }
}
