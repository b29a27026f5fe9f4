//! Storage configuration types.

use std::path::PathBuf;

use pixdrop_shared::CloudinaryConfig;

/// Storage provider configuration.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// Local filesystem, served back under `/uploads`.
    LocalFs {
        /// Root directory path.
        root: PathBuf,
        /// Public origin prepended to generated links.
        public_base_url: String,
    },
    /// Cloudinary image storage.
    Cloudinary(CloudinaryConfig),
}

impl StorageProvider {
    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self::LocalFs {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Create Cloudinary provider.
    #[must_use]
    pub fn cloudinary(config: CloudinaryConfig) -> Self {
        Self::Cloudinary(config)
    }
}
