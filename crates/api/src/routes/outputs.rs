//! Route definitions for result file retrieval.

use axum::routing::get;
use axum::Router;

use crate::handlers::outputs;
use crate::state::AppState;

/// Result retrieval routes.
///
/// ```text
/// GET /processed-images/{filename} -> get_processed_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/processed-images/{filename}",
        get(outputs::get_processed_image),
    )
}
