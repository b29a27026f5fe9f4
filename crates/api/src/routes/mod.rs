//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod images;
pub mod upload;

/// Creates the API router for the configured backend.
pub fn api_routes(state: &AppState, max_upload_bytes: usize) -> Router<AppState> {
    let router = Router::new()
        .merge(health::routes())
        .merge(upload::routes(max_upload_bytes));

    if state.storage.is_remote() {
        router.merge(images::routes())
    } else {
        router
    }
}
