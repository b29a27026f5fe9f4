//! Asset storage for uploaded images.
//!
//! Two mutually exclusive backends sit behind [`StorageService`]:
//! - Local filesystem through an Apache OpenDAL `Fs` operator
//! - Cloudinary, through its signed upload API and public delivery host
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       StorageService                         │
//! ├──────────────────────────────┬───────────────────────────────┤
//! │ LocalStore                   │ CloudinaryStore               │
//! │ op.write("{id}{ext}", bytes) │ POST /{cloud}/image/upload    │
//! │ link: {base}/uploads/{key}   │ GET  /{cloud}/image/upload/.. │
//! └──────────────────────────────┴───────────────────────────────┘
//! ```

mod cloudinary;
mod config;
mod error;
mod id;
mod local;
mod service;

pub use cloudinary::{CloudinaryStore, DEFAULT_CONTENT_TYPE, RemoteImage, sign_params};
pub use config::StorageProvider;
pub use error::StorageError;
pub use id::{IdGenerator, SequenceIds, ShortUuid, asset_file_name, file_extension};
pub use local::LocalStore;
pub use service::{ImageUpload, StorageService, StoredAsset};
