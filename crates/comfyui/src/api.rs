//! REST client for the engine's HTTP endpoints.
//!
//! The relay needs exactly two calls: queueing a workflow
//! (`POST /prompt`) and a cheap liveness ping (`GET /system_stats`)
//! for the health endpoint.

use serde::Deserialize;

/// HTTP client for a single ComfyUI instance.
///
/// Construct once at startup and share via application state; the inner
/// [`reqwest::Client`] pools connections across requests.
pub struct ComfyUIApi {
    client: reqwest::Client,
    base_url: String,
}

/// Response from `POST /prompt` after the workflow is queued.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the queued prompt.
    pub prompt_id: String,
    /// Position in the engine's execution queue.
    pub number: i32,
}

/// Errors from the engine REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ComfyUIApiError {
    /// Transport-level failure (connection refused, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The engine answered with a non-2xx status.
    #[error("ComfyUI returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body, kept for the logs.
        body: String,
    },
}

impl ComfyUIApi {
    /// Create a client for the engine at `base_url`
    /// (e.g. `http://127.0.0.1:8188`). A trailing slash is tolerated.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Queue a workflow for execution.
    ///
    /// Sends `POST /prompt` with `{"prompt": <workflow>, "client_id": ..}`.
    /// The returned `prompt_id` identifies the job inside the engine; the
    /// relay only logs it, since results are picked up from the output
    /// directory rather than correlated through the engine.
    pub async fn submit_workflow(
        &self,
        workflow: &serde_json::Value,
        client_id: &str,
    ) -> Result<SubmitResponse, ComfyUIApiError> {
        let body = serde_json::json!({
            "prompt": workflow,
            "client_id": client_id,
        });

        let response = self
            .client
            .post(format!("{}/prompt", self.base_url))
            .json(&body)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let submitted: SubmitResponse = response.json().await?;
        tracing::debug!(
            prompt_id = %submitted.prompt_id,
            queue_number = submitted.number,
            "Workflow queued on ComfyUI",
        );
        Ok(submitted)
    }

    /// Ping the engine with `GET /system_stats`.
    ///
    /// `Ok(())` means the engine answered 2xx. Used by the health
    /// endpoint to report reachability.
    pub async fn ping(&self) -> Result<(), ComfyUIApiError> {
        let response = self
            .client
            .get(format!("{}/system_stats", self.base_url))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Check for a success status, turning non-2xx responses into
    /// [`ComfyUIApiError::Api`] with the body text attached.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ComfyUIApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ComfyUIApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = ComfyUIApi::new("http://127.0.0.1:8188/");
        assert_eq!(api.base_url, "http://127.0.0.1:8188");
    }

    #[test]
    fn submit_response_deserializes() {
        let raw = r#"{"prompt_id":"9fb0073f-6c57-4d31-9629-1d1a078f4d06","number":3,"node_errors":{}}"#;
        let parsed: SubmitResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.prompt_id, "9fb0073f-6c57-4d31-9629-1d1a078f4d06");
        assert_eq!(parsed.number, 3);
    }
}
