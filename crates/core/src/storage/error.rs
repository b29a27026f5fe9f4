//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing the asset to the local directory failed.
    #[error("failed to write asset: {0}")]
    Write(String),

    /// The upload request to the provider could not be completed.
    #[error("upload to storage provider failed: {0}")]
    Upload(String),

    /// The provider rejected the upload.
    #[error("storage provider returned {status}: {message}")]
    Provider {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error message.
        message: String,
    },

    /// Fetching an image from the delivery host failed.
    #[error("failed to fetch image: {0}")]
    Fetch(String),

    /// The delivery host answered with something other than 200.
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    /// The requested filename cannot be mapped onto a delivery path.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Create a provider rejection error.
    #[must_use]
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid key error.
    #[must_use]
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Returns `true` when the failure happened while proxying from the delivery host.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::UpstreamStatus(_))
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        Self::Write(err.to_string())
    }
}
