//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pixdrop_core::storage::StorageError;
use pixdrop_shared::AppError;
use serde::Serialize;
use tracing::{error, warn};

/// Message returned when the request carries no usable `image` file.
pub const UPLOAD_FAILED: &str = "File upload failed";

/// Error body: a single `error` string.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human readable message.
    pub error: String,
}

/// Handler error, rendered as `{"error": "..."}` with the matching status.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// The request had no usable `image` file.
    #[must_use]
    pub fn upload_failed() -> Self {
        Self(AppError::Validation(UPLOAD_FAILED.to_string()))
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::InvalidKey(key) => AppError::Validation(format!("Invalid image name: {key}")),
            e if e.is_upstream() => AppError::BadGateway(e.to_string()),
            e => AppError::Storage(e.to_string()),
        };
        Self(app)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_server_error() {
            error!(code = self.0.error_code(), error = %self.0, "Request failed");
        } else {
            warn!(code = self.0.error_code(), error = %self.0, "Request rejected");
        }

        let body = ErrorBody {
            error: self.0.public_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
