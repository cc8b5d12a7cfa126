use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use atelier_comfyui::api::ComfyUIApiError;
use atelier_comfyui::watcher::WatchError;
use atelier_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain and engine error types and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON
/// error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `atelier_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The engine rejected or never received the workflow.
    #[error("Engine error: {0}")]
    Engine(#[from] ComfyUIApiError),

    /// The output watcher failed or gave up.
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, name } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{name}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Template(msg) => {
                    tracing::error!(error = %msg, "Workflow template error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "TEMPLATE_ERROR",
                        "Workflow template is misconfigured".to_string(),
                    )
                }
            },

            // --- Engine errors ---
            AppError::Engine(err) => {
                tracing::error!(error = %err, "Engine request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "ENGINE_ERROR",
                    "Image processing failed".to_string(),
                )
            }

            // --- Watcher errors ---
            AppError::Watch(WatchError::Timeout { .. }) => (
                StatusCode::GATEWAY_TIMEOUT,
                "OUTPUT_TIMEOUT",
                "Processed image not found within the timeout".to_string(),
            ),
            AppError::Watch(err @ WatchError::Snapshot { .. }) => {
                tracing::error!(error = %err, "Output directory snapshot failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
