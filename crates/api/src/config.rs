use std::path::PathBuf;

use atelier_core::workflow::{parse_slots, InputSlot};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`).
    ///
    /// Must exceed `POLL_TIMEOUT_SECS`: the processing request holds the
    /// connection open for the entire generation.
    pub request_timeout_secs: u64,
    /// Relay settings (engine endpoint, directories, workflow template).
    pub relay: RelayConfig,
}

/// Settings for the engine relay flow.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Engine HTTP base URL (default: `http://127.0.0.1:8188`).
    pub engine_url: String,
    /// Directory the engine reads input images from.
    pub input_dir: PathBuf,
    /// Directory the engine writes result files to.
    pub output_dir: PathBuf,
    /// Path of the workflow template JSON (engine API export format).
    pub workflow_path: PathBuf,
    /// Multipart field name to workflow node bindings.
    pub input_slots: Vec<InputSlot>,
    /// Node id of the save node that controls result naming.
    pub save_node: String,
    /// Filename prefix the save node stamps on results.
    pub output_prefix: String,
    /// Seconds between output directory scans (default: `5`, must be non-zero).
    pub poll_interval_secs: u64,
    /// Seconds to wait for a result before giving up (default: `180`).
    pub poll_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                     |
    /// |------------------------|---------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                   |
    /// | `PORT`                 | `5000`                                      |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                     |
    /// | `REQUEST_TIMEOUT_SECS` | `300`                                       |
    /// | `COMFYUI_URL`          | `http://127.0.0.1:8188`                     |
    /// | `COMFYUI_INPUT_DIR`    | `comfyui/input`                             |
    /// | `COMFYUI_OUTPUT_DIR`   | `comfyui/output`                            |
    /// | `WORKFLOW_PATH`        | `workflow_api.json`                         |
    /// | `WORKFLOW_INPUT_SLOTS` | `image_1:8,image_4:12,image_8:1,image_12:4` |
    /// | `WORKFLOW_SAVE_NODE`   | `152`                                       |
    /// | `OUTPUT_PREFIX`        | `output`                                    |
    /// | `POLL_INTERVAL_SECS`   | `5`                                         |
    /// | `POLL_TIMEOUT_SECS`    | `180`                                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            relay: RelayConfig::from_env(),
        }
    }
}

impl RelayConfig {
    /// Load relay settings from environment variables with defaults.
    ///
    /// Panics on malformed values -- misconfiguration should fail at
    /// startup, not on the first request.
    pub fn from_env() -> Self {
        let engine_url =
            std::env::var("COMFYUI_URL").unwrap_or_else(|_| "http://127.0.0.1:8188".into());

        let input_dir = PathBuf::from(
            std::env::var("COMFYUI_INPUT_DIR").unwrap_or_else(|_| "comfyui/input".into()),
        );
        let output_dir = PathBuf::from(
            std::env::var("COMFYUI_OUTPUT_DIR").unwrap_or_else(|_| "comfyui/output".into()),
        );
        let workflow_path = PathBuf::from(
            std::env::var("WORKFLOW_PATH").unwrap_or_else(|_| "workflow_api.json".into()),
        );

        let slots_spec = std::env::var("WORKFLOW_INPUT_SLOTS")
            .unwrap_or_else(|_| "image_1:8,image_4:12,image_8:1,image_12:4".into());
        let input_slots = parse_slots(&slots_spec)
            .unwrap_or_else(|e| panic!("Invalid WORKFLOW_INPUT_SLOTS: {e}"));

        let save_node = std::env::var("WORKFLOW_SAVE_NODE").unwrap_or_else(|_| "152".into());
        let output_prefix = std::env::var("OUTPUT_PREFIX").unwrap_or_else(|_| "output".into());

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");
        assert!(poll_interval_secs > 0, "POLL_INTERVAL_SECS must be non-zero");

        let poll_timeout_secs: u64 = std::env::var("POLL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "180".into())
            .parse()
            .expect("POLL_TIMEOUT_SECS must be a valid u64");

        Self {
            engine_url,
            input_dir,
            output_dir,
            workflow_path,
            input_slots,
            save_node,
            output_prefix,
            poll_interval_secs,
            poll_timeout_secs,
        }
    }
}
