pub mod health;
pub mod outputs;
pub mod process;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// POST /process-images               relay an upload through the engine
/// GET  /processed-images/{filename}  fetch a result file
/// ```
///
/// `/health` is mounted at root level by the entrypoint, not here.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(process::router())
        .merge(outputs::router())
}
