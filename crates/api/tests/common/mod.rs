//! Shared helpers for API integration tests.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use atelier_api::config::{RelayConfig, ServerConfig};
use atelier_api::routes;
use atelier_api::state::AppState;
use atelier_comfyui::api::ComfyUIApi;
use atelier_core::workflow::parse_slots;

/// Build a test `ServerConfig` rooted at `root` and pointed at `engine_url`.
///
/// The engine's input/output directories and the workflow template all
/// live under `root` (normally a tempdir). Polling is tightened to a
/// 1-second interval and timeout so failure paths don't stall the suite.
pub fn test_config(root: &Path, engine_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        relay: RelayConfig {
            engine_url: engine_url.to_string(),
            input_dir: root.join("input"),
            output_dir: root.join("output"),
            workflow_path: root.join("workflow_api.json"),
            input_slots: parse_slots("image_1:8,image_4:12").unwrap(),
            save_node: "152".to_string(),
            output_prefix: "output".to_string(),
            poll_interval_secs: 1,
            poll_timeout_secs: 1,
        },
    }
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` (including engine
/// directory creation) so integration tests exercise the same middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery) that
/// production uses.
pub fn build_test_app(config: ServerConfig) -> Router {
    std::fs::create_dir_all(&config.relay.input_dir).unwrap();
    std::fs::create_dir_all(&config.relay.output_dir).unwrap();

    let engine = Arc::new(ComfyUIApi::new(config.relay.engine_url.clone()));
    let state = AppState {
        config: Arc::new(config),
        engine,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Send a GET request to the app and return the raw response.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
