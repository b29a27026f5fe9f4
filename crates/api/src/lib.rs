//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The upload route and, per backend, the static or proxy read route
//! - The cross-origin policy for the remote backend
//! - JSON error responses

pub mod cors;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use pixdrop_core::storage::{LocalStore, StorageService};
use pixdrop_shared::{AppConfig, AppResult};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend for uploaded images.
    pub storage: Arc<StorageService>,
}

/// Creates the main application router.
///
/// The local backend serves its upload directory under `/uploads`; the remote
/// backend exposes `/images/{filename}` and the cross-origin policy instead.
///
/// # Errors
///
/// Returns a configuration error if the CORS policy cannot be built.
pub fn create_router(state: AppState, config: &AppConfig) -> AppResult<Router> {
    let mut router = routes::api_routes(&state, config.storage.max_upload_bytes);

    if let Some(root) = state.storage.local_root() {
        router = router.nest_service(LocalStore::ROUTE_PREFIX, ServeDir::new(root));
    }

    router = router.layer(TraceLayer::new_for_http());

    if state.storage.is_remote() {
        router = router.layer(cors::cors_layer(&config.cors)?);
    }

    Ok(router.with_state(state))
}
