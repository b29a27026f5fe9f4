//! Local filesystem backend using Apache OpenDAL.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use opendal::{Operator, services};

use super::error::StorageError;
use super::id::{IdGenerator, asset_file_name};
use super::service::{ImageUpload, StoredAsset};

/// Writes uploads into a directory that is served back under `/uploads`.
pub struct LocalStore {
    operator: Operator,
    root: PathBuf,
    public_base_url: String,
    ids: Arc<dyn IdGenerator>,
}

impl LocalStore {
    /// Route prefix the upload directory is served under.
    pub const ROUTE_PREFIX: &'static str = "/uploads";

    /// Create the store, creating `root` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the operator
    /// cannot be built.
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::configuration(format!("cannot create {}: {e}", root.display()))
        })?;
        let root = std::fs::canonicalize(&root).map_err(|e| {
            StorageError::configuration(format!("cannot resolve {}: {e}", root.display()))
        })?;

        let builder = services::Fs::default().root(
            root.to_str()
                .ok_or_else(|| StorageError::configuration("invalid path"))?,
        );
        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self {
            operator,
            root,
            public_base_url: public_base_url.into(),
            ids,
        })
    }

    /// Write the upload under a fresh `{id}{ext}` name.
    ///
    /// A failed write may leave a partial file behind.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the file cannot be written.
    pub async fn store(&self, upload: ImageUpload) -> Result<StoredAsset, StorageError> {
        let key = asset_file_name(&self.ids.generate(), &upload.filename);
        let size = upload.size();

        self.operator.write(&key, upload.bytes).await?;

        Ok(StoredAsset {
            link: self.link_for(&key),
            key,
            size,
        })
    }

    /// Public link for a stored key.
    ///
    /// The key is not percent-encoded, so an extension such as `.j#g`
    /// yields a link that does not resolve.
    #[must_use]
    pub fn link_for(&self, key: &str) -> String {
        format!(
            "{}{}/{key}",
            self.public_base_url.trim_end_matches('/'),
            Self::ROUTE_PREFIX
        )
    }

    /// Directory assets are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
