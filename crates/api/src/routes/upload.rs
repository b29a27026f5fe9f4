//! Image upload route.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    routing::post,
};
use pixdrop_core::storage::ImageUpload;
use serde::Serialize;
use tracing::warn;

use crate::{AppState, error::ApiError};

/// Multipart field carrying the file.
pub const IMAGE_FIELD: &str = "image";

/// Response for a stored upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Absolute URL of the stored asset.
    pub link: String,
}

/// Creates the upload route with the given body limit.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// POST `/upload`
/// Store the multipart `image` file and return its public link.
async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        warn!(error = %e, "Upload is not a multipart body");
        ApiError::upload_failed()
    })?;

    let upload = read_image_field(&mut multipart).await?;
    let asset = state.storage.store(upload).await?;

    Ok(Json(UploadResponse { link: asset.link }))
}

/// Reads the first `image` part that carries a filename.
async fn read_image_field(multipart: &mut Multipart) -> Result<ImageUpload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "Malformed multipart body");
        ApiError::upload_failed()
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().filter(|n| !n.is_empty()).map(str::to_owned)
        else {
            continue;
        };

        let bytes = field.bytes().await.map_err(|e| {
            warn!(error = %e, "Failed to read image field");
            ApiError::upload_failed()
        })?;
        return Ok(ImageUpload::new(filename, bytes));
    }

    Err(ApiError::upload_failed())
}
