//! Image proxy route for the remote backend.

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{AppState, error::ApiError};

/// Creates the image proxy route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/images/{filename}", get(proxy_image))
}

/// GET `/images/{filename}`
/// Stream an image from the delivery host, chunk by chunk.
///
/// Content-Length is forwarded when upstream sent one; otherwise the reply
/// is chunked.
async fn proxy_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let image = state.storage.fetch_image(&filename).await?;

    let mut response = (
        [(header::CONTENT_TYPE, image.content_type)],
        Body::from_stream(image.body),
    )
        .into_response();
    if let Some(len) = image.content_length {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }
    Ok(response)
}
