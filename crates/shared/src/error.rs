//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request did not carry a usable upload.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Writing or forwarding the asset failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The upstream image host failed or answered with a non-200 status.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Invalid or missing startup configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::BadGateway(_) => 502,
            Self::Storage(_) | Self::Configuration(_) => 500,
        }
    }

    /// Returns the error code used in logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::BadGateway(_) => "BAD_GATEWAY",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Message safe to show to API callers.
    ///
    /// Client errors carry their own message; server errors use a fixed one.
    #[must_use]
    pub fn public_message(&self) -> &str {
        match self {
            Self::Validation(msg) => msg,
            Self::Storage(_) => "Failed to save file",
            Self::BadGateway(_) => "Failed to fetch image",
            Self::Configuration(_) => "Internal server error",
        }
    }

    /// Returns `true` for 5xx errors.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}
