//! Storage backends for Pixdrop.
//!
//! This crate owns everything that touches asset bytes, with no web framework
//! dependencies. Handlers in `pixdrop-api` call into it.
//!
//! # Modules
//!
//! - `storage` - Local filesystem and Cloudinary backends, short asset identifiers

pub mod storage;
