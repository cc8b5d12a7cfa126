use std::sync::Arc;

use atelier_comfyui::api::ComfyUIApi;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the inner pieces are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server and relay configuration.
    pub config: Arc<ServerConfig>,
    /// HTTP client for the engine (shared connection pool).
    pub engine: Arc<ComfyUIApi>,
}
