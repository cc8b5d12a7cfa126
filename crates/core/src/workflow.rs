//! Workflow template slot filling.
//!
//! A workflow is an opaque JSON object keyed by node id, as exported by
//! the engine's "Save (API format)" action. The relay touches exactly two
//! kinds of nodes: image-input nodes, whose `inputs.image` receives an
//! uploaded file path, and the save node, whose `inputs.filename_prefix`
//! controls how result files are named.

use serde_json::Value;

use crate::error::CoreError;

/// Binding between a multipart field name and the workflow node whose
/// `inputs.image` it fills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSlot {
    /// Part name expected in the upload (e.g. `image_1`).
    pub field: String,
    /// Node id in the workflow object (e.g. `"8"`).
    pub node_id: String,
}

/// Parse a comma-separated `field:node_id` slot list.
///
/// Example: `image_1:8,image_4:12` binds part `image_1` to node `"8"`
/// and part `image_4` to node `"12"`. Whitespace around entries is
/// ignored; an empty list is an error.
pub fn parse_slots(spec: &str) -> Result<Vec<InputSlot>, CoreError> {
    let mut slots = Vec::new();
    for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (field, node_id) = entry
            .split_once(':')
            .map(|(f, n)| (f.trim(), n.trim()))
            .filter(|(f, n)| !f.is_empty() && !n.is_empty())
            .ok_or_else(|| {
                CoreError::Validation(format!("Slot '{entry}' must be 'field:node_id'"))
            })?;
        slots.push(InputSlot {
            field: field.to_string(),
            node_id: node_id.to_string(),
        });
    }
    if slots.is_empty() {
        return Err(CoreError::Validation(
            "At least one input slot is required".to_string(),
        ));
    }
    Ok(slots)
}

/// A workflow document whose node inputs can be filled by id.
#[derive(Debug, Clone)]
pub struct WorkflowTemplate {
    root: Value,
}

impl WorkflowTemplate {
    /// Wrap a parsed workflow, verifying the top level is an object.
    pub fn new(root: Value) -> Result<Self, CoreError> {
        if !root.is_object() {
            return Err(CoreError::Template(
                "Workflow root must be a JSON object keyed by node id".to_string(),
            ));
        }
        Ok(Self { root })
    }

    /// Set `inputs.image` on the given node to an uploaded file path.
    pub fn set_input_image(&mut self, node_id: &str, path: &str) -> Result<(), CoreError> {
        *self.input_field(node_id, "image")? = Value::String(path.to_string());
        Ok(())
    }

    /// Set `inputs.filename_prefix` on the save node.
    pub fn set_filename_prefix(&mut self, node_id: &str, prefix: &str) -> Result<(), CoreError> {
        *self.input_field(node_id, "filename_prefix")? = Value::String(prefix.to_string());
        Ok(())
    }

    /// Consume the template, yielding the filled workflow JSON.
    pub fn into_value(self) -> Value {
        self.root
    }

    /// Mutable handle to `nodes[node_id].inputs[field]`, creating the
    /// field if absent. The node and its `inputs` object must exist.
    fn input_field(&mut self, node_id: &str, field: &str) -> Result<&mut Value, CoreError> {
        let node = self
            .root
            .get_mut(node_id)
            .ok_or_else(|| CoreError::Template(format!("Workflow has no node '{node_id}'")))?;
        let inputs = node
            .get_mut("inputs")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                CoreError::Template(format!("Node '{node_id}' has no 'inputs' object"))
            })?;
        Ok(inputs.entry(field.to_string()).or_insert(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_workflow() -> Value {
        json!({
            "8": { "class_type": "LoadImage", "inputs": { "image": "placeholder.png" } },
            "12": { "class_type": "LoadImage", "inputs": { "image": "placeholder.png" } },
            "152": { "class_type": "SaveImage", "inputs": { "filename_prefix": "ComfyUI", "images": ["151", 0] } },
            "7": { "class_type": "CLIPTextEncode" }
        })
    }

    #[test]
    fn fills_input_image_by_node_id() {
        let mut template = WorkflowTemplate::new(sample_workflow()).unwrap();
        template.set_input_image("8", "/input/a.png").unwrap();

        let filled = template.into_value();
        assert_eq!(filled["8"]["inputs"]["image"], "/input/a.png");
        // Other nodes are untouched.
        assert_eq!(filled["12"]["inputs"]["image"], "placeholder.png");
    }

    #[test]
    fn sets_filename_prefix_on_save_node() {
        let mut template = WorkflowTemplate::new(sample_workflow()).unwrap();
        template.set_filename_prefix("152", "output").unwrap();

        let filled = template.into_value();
        assert_eq!(filled["152"]["inputs"]["filename_prefix"], "output");
        // Sibling inputs survive the edit.
        assert_eq!(filled["152"]["inputs"]["images"], json!(["151", 0]));
    }

    #[test]
    fn creates_missing_input_field() {
        let mut template = WorkflowTemplate::new(json!({
            "3": { "inputs": {} }
        }))
        .unwrap();
        template.set_input_image("3", "/input/b.png").unwrap();
        assert_eq!(template.into_value()["3"]["inputs"]["image"], "/input/b.png");
    }

    #[test]
    fn unknown_node_is_a_template_error() {
        let mut template = WorkflowTemplate::new(sample_workflow()).unwrap();
        let err = template.set_input_image("999", "/input/a.png").unwrap_err();
        assert!(matches!(err, CoreError::Template(_)));
    }

    #[test]
    fn node_without_inputs_is_a_template_error() {
        let mut template = WorkflowTemplate::new(sample_workflow()).unwrap();
        let err = template.set_input_image("7", "/input/a.png").unwrap_err();
        assert!(matches!(err, CoreError::Template(_)));
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(WorkflowTemplate::new(json!([1, 2, 3])).is_err());
        assert!(WorkflowTemplate::new(json!("workflow")).is_err());
    }

    #[test]
    fn parses_slot_list() {
        let slots = parse_slots("image_1:8, image_4:12").unwrap();
        assert_eq!(
            slots,
            vec![
                InputSlot {
                    field: "image_1".to_string(),
                    node_id: "8".to_string()
                },
                InputSlot {
                    field: "image_4".to_string(),
                    node_id: "12".to_string()
                },
            ]
        );
    }

    #[test]
    fn rejects_malformed_slots() {
        assert!(parse_slots("image_1").is_err());
        assert!(parse_slots("image_1:").is_err());
        assert!(parse_slots(":8").is_err());
        assert!(parse_slots("").is_err());
        assert!(parse_slots(" , ,").is_err());
    }
}
