//! Storage service facade over the configured backend.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use super::cloudinary::{CloudinaryStore, RemoteImage};
use super::config::StorageProvider;
use super::error::StorageError;
use super::id::{IdGenerator, ShortUuid};
use super::local::LocalStore;

/// An uploaded image, fully received.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Filename as sent by the client.
    pub filename: String,
    /// File contents.
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Create a new upload.
    #[must_use]
    pub fn new(filename: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }
}

/// Reference to a stored asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Backend identifier: local file name or provider public id.
    pub key: String,
    /// Absolute public URL.
    pub link: String,
    /// Size in bytes.
    pub size: u64,
}

enum Backend {
    Local(LocalStore),
    Cloudinary(CloudinaryStore),
}

/// Storage service for uploaded images.
pub struct StorageService {
    backend: Backend,
}

impl StorageService {
    /// Create a storage service using random short identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized.
    pub fn from_provider(provider: StorageProvider) -> Result<Self, StorageError> {
        Self::with_id_generator(provider, Arc::new(ShortUuid))
    }

    /// Create a storage service with a custom identifier source.
    ///
    /// The generator is only consulted by the local backend; Cloudinary
    /// assigns its own identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized.
    pub fn with_id_generator(
        provider: StorageProvider,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, StorageError> {
        let backend = match provider {
            StorageProvider::LocalFs {
                root,
                public_base_url,
            } => Backend::Local(LocalStore::new(root, public_base_url, ids)?),
            StorageProvider::Cloudinary(config) => Backend::Cloudinary(CloudinaryStore::new(config)?),
        };
        Ok(Self { backend })
    }

    /// Store an upload and return its public reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or the provider call fails.
    pub async fn store(&self, upload: ImageUpload) -> Result<StoredAsset, StorageError> {
        let asset = match &self.backend {
            Backend::Local(store) => store.store(upload).await?,
            Backend::Cloudinary(store) => store.upload(upload).await?,
        };

        info!(
            backend = self.provider_name(),
            key = %asset.key,
            bytes = asset.size,
            "Asset stored"
        );
        Ok(asset)
    }

    /// Open a streaming fetch of a remote image.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] on the local backend, which
    /// serves its directory statically instead.
    pub async fn fetch_image(&self, filename: &str) -> Result<RemoteImage, StorageError> {
        match &self.backend {
            Backend::Local(_) => Err(StorageError::configuration(
                "image proxy requires the cloudinary backend",
            )),
            Backend::Cloudinary(store) => store.fetch(filename).await,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        match self.backend {
            Backend::Local(_) => "local",
            Backend::Cloudinary(_) => "cloudinary",
        }
    }

    /// Directory served under `/uploads`, for the local backend.
    #[must_use]
    pub fn local_root(&self) -> Option<&Path> {
        match &self.backend {
            Backend::Local(store) => Some(store.root()),
            Backend::Cloudinary(_) => None,
        }
    }

    /// Returns `true` when assets are forwarded to a remote provider.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self.backend, Backend::Cloudinary(_))
    }
}
