//! Route definitions for the image-processing endpoint.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::process;
use crate::state::AppState;

/// Canvas exports run a few MB each; cap the whole upload at 32 MiB.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Image-processing routes.
///
/// ```text
/// POST /process-images -> process_images
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/process-images",
        post(process::process_images).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
}
