//! Shared configuration and error types for Pixdrop.
//!
//! This crate provides common types used across all other crates:
//! - Layered application configuration
//! - Storage provider credentials
//! - Application-wide error types

pub mod config;
pub mod error;

pub use config::{AppConfig, CloudinaryConfig, CorsConfig, StorageBackend};
pub use error::{AppError, AppResult};
