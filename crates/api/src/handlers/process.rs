//! Handler for the image-processing endpoint.
//!
//! One request performs the whole relay sequence: save the uploaded
//! images into the engine's input directory, fill the workflow template
//! with their paths, queue the workflow on the engine, then watch the
//! output directory until the result file lands.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use atelier_comfyui::watcher::OutputWatcher;
use atelier_core::naming;
use atelier_core::workflow::WorkflowTemplate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Payload returned once the engine has produced a result.
#[derive(Debug, Serialize)]
pub struct ProcessResult {
    /// Bare filename of the result inside the output directory; fetch it
    /// via `GET /api/v1/processed-images/{image}`.
    pub image: String,
}

/// POST /api/v1/process-images
///
/// Multipart upload with one file part per configured input slot. Blocks
/// until the engine writes the result or the poll timeout expires.
pub async fn process_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ProcessResult>>> {
    let relay = &state.config.relay;

    let saved = save_uploads(&state, multipart).await?;

    let mut template = load_template(&state).await?;
    for slot in &relay.input_slots {
        let path = saved.get(slot.field.as_str()).ok_or_else(|| {
            AppError::BadRequest(format!("Missing file part '{}'", slot.field))
        })?;
        template.set_input_image(&slot.node_id, path)?;
    }
    template.set_filename_prefix(&relay.save_node, &relay.output_prefix)?;

    let watcher = OutputWatcher::new(
        &relay.output_dir,
        &relay.output_prefix,
        Duration::from_secs(relay.poll_interval_secs),
        Duration::from_secs(relay.poll_timeout_secs),
    );

    // Snapshot before submitting: a result written faster than the first
    // poll cycle must still count as new.
    let snapshot = watcher.snapshot().await?;

    let client_id = uuid::Uuid::new_v4().to_string();
    let submitted = state
        .engine
        .submit_workflow(&template.into_value(), &client_id)
        .await?;
    tracing::info!(
        prompt_id = %submitted.prompt_id,
        queue_number = submitted.number,
        "Workflow submitted to ComfyUI",
    );

    let image = watcher.wait_for_output(&snapshot).await?;

    Ok(Json(DataResponse {
        data: ProcessResult { image },
    }))
}

/// Save every file part whose name matches a configured input slot.
///
/// Returns field name -> absolute saved path. Parts that do not match a
/// slot (e.g. auxiliary text fields sent by the frontend) are skipped.
async fn save_uploads(
    state: &AppState,
    mut multipart: Multipart,
) -> AppResult<HashMap<String, String>> {
    let relay = &state.config.relay;
    let mut saved = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };
        if !relay.input_slots.iter().any(|s| s.field == field_name) {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| AppError::BadRequest(format!("Part '{field_name}' has no filename")))?
            .to_string();
        naming::validate_basename(&filename)?;

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let dest = relay.input_dir.join(&filename);
        tokio::fs::write(&dest, &data)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to save upload: {e}")))?;

        // The engine resolves relative paths against its own working
        // directory, so hand it an absolute one.
        let absolute = tokio::fs::canonicalize(&dest)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to resolve upload path: {e}")))?
            .to_string_lossy()
            .into_owned();

        tracing::debug!(field = %field_name, file = %filename, "Upload saved");
        saved.insert(field_name, absolute);
    }

    if saved.is_empty() {
        return Err(AppError::BadRequest(
            "No files received in multipart upload".to_string(),
        ));
    }

    Ok(saved)
}

/// Read and parse the workflow template from disk.
///
/// Read per request so an operator can swap the template file without
/// restarting the relay.
async fn load_template(state: &AppState) -> AppResult<WorkflowTemplate> {
    let path = &state.config.relay.workflow_path;

    let raw = tokio::fs::read(path).await.map_err(|e| {
        AppError::InternalError(format!(
            "Failed to read workflow template {}: {e}",
            path.display()
        ))
    })?;
    let root: serde_json::Value = serde_json::from_slice(&raw).map_err(|e| {
        AppError::InternalError(format!(
            "Workflow template {} is not valid JSON: {e}",
            path.display()
        ))
    })?;

    Ok(WorkflowTemplate::new(root)?)
}
