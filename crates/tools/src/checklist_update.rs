//! Checklist item toggle — marks one item complete or incomplete on the
//! patient's active enrollment.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use trialpilot_core::error::ToolError;
use trialpilot_core::paths;
use trialpilot_core::store::DocumentStore;
use trialpilot_core::tool::{Tool, ToolResult};

use crate::common::{find_active_enrollment, require_str, require_u32};

pub struct UpdateChecklistItemTool {
    store: Arc<dyn DocumentStore>,
}

impl UpdateChecklistItemTool {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for UpdateChecklistItemTool {
    fn name(&self) -> &str {
        "update_checklist_item"
    }

    fn description(&self) -> &str {
        "Marks a checklist item on the patient's active enrollment as complete \
         or incomplete. The item name is free text matching the protocol's checklist."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "patient_id": {
                    "type": "string",
                    "description": "The patient's identifier"
                },
                "stage_number": {
                    "type": "integer",
                    "description": "The stage the item belongs to"
                },
                "item_name": {
                    "type": "string",
                    "description": "The checklist item's name, as written in the protocol"
                },
                "completed": {
                    "type": "boolean",
                    "description": "True to mark complete, false to mark incomplete"
                }
            },
            "required": ["patient_id", "stage_number", "item_name", "completed"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let patient_id = require_str(&arguments, "patient_id")?;
        let stage_number = require_u32(&arguments, "stage_number")?;
        let item_name = require_str(&arguments, "item_name")?;
        let completed = arguments["completed"].as_bool().ok_or_else(|| {
            ToolError::InvalidArguments("Missing or invalid 'completed' argument".to_string())
        })?;
        // Item names become the final path segment of the progress entry;
        // a '/' would split into nested keys instead of one flat entry.
        if item_name.contains('/') {
            return Ok(ToolResult::failed(format!(
                "Error updating checklist item: item name '{item_name}' contains '/', \
                 which is not allowed."
            )));
        }
        debug!(patient_id, stage_number, item_name, completed, "Updating checklist item");

        let enrollment_id = match find_active_enrollment(self.store.as_ref(), patient_id).await {
            Ok(Some((id, _))) => id,
            Ok(None) => {
                return Ok(ToolResult::ok(format!(
                    "No active enrollment found for patient '{patient_id}'."
                )));
            }
            Err(e) => {
                return Ok(ToolResult::failed(format!(
                    "Error updating checklist item: {e}"
                )));
            }
        };

        let path = paths::checklist_item(&enrollment_id, stage_number, item_name);
        match self.store.set(&path, serde_json::json!(completed)).await {
            Ok(()) => {
                info!(patient_id, stage_number, item_name, completed, "Checklist item updated");
                let state = if completed { "complete" } else { "incomplete" };
                Ok(ToolResult::ok(format!(
                    "Checklist item '{item_name}' for stage {stage_number} was successfully marked as {state}."
                )))
            }
            Err(e) => Ok(ToolResult::failed(format!(
                "Error updating checklist item: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trialpilot_store::InMemoryStore;

    fn seeded_store() -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::with_data(json!({
            "enrollments": {
                "e1": {
                    "patientId": "p1",
                    "trialId": "htn-04",
                    "isActive": true,
                    "currentStage": 1,
                    "checklistProgress": {
                        "stage1": {"Sign consent form": false}
                    }
                }
            }
        })))
    }

    #[tokio::test]
    async fn marks_item_complete() {
        let store = seeded_store();
        let tool = UpdateChecklistItemTool::new(store.clone());

        let result = tool
            .execute(json!({
                "patient_id": "p1",
                "stage_number": 1,
                "item_name": "Sign consent form",
                "completed": true
            }))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(
            result.output,
            "Checklist item 'Sign consent form' for stage 1 was successfully marked as complete."
        );

        let flag = store
            .get("enrollments/e1/checklistProgress/stage1/Sign consent form")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(flag, json!(true));
    }

    #[tokio::test]
    async fn marks_item_incomplete() {
        let store = seeded_store();
        let tool = UpdateChecklistItemTool::new(store);

        let result = tool
            .execute(json!({
                "patient_id": "p1",
                "stage_number": 1,
                "item_name": "Sign consent form",
                "completed": false
            }))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.ends_with("marked as incomplete."));
    }

    #[tokio::test]
    async fn no_active_enrollment() {
        let tool = UpdateChecklistItemTool::new(Arc::new(InMemoryStore::new()));
        let result = tool
            .execute(json!({
                "patient_id": "p9",
                "stage_number": 1,
                "item_name": "Sign consent form",
                "completed": true
            }))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "No active enrollment found for patient 'p9'.");
    }

    #[tokio::test]
    async fn slash_in_item_name_is_rejected() {
        let store = seeded_store();
        let tool = UpdateChecklistItemTool::new(store.clone());

        let result = tool
            .execute(json!({
                "patient_id": "p1",
                "stage_number": 1,
                "item_name": "Take 10mg/day of study drug",
                "completed": true
            }))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("contains '/'"));

        // The progress map keeps its flat shape, nothing nested was written
        let stage = store
            .get("enrollments/e1/checklistProgress/stage1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stage, json!({"Sign consent form": false}));
    }

    #[tokio::test]
    async fn free_text_item_creates_key() {
        // Item names are not validated against the protocol checklist;
        // an unknown name simply lands as a new key.
        let store = seeded_store();
        let tool = UpdateChecklistItemTool::new(store.clone());

        let result = tool
            .execute(json!({
                "patient_id": "p1",
                "stage_number": 2,
                "item_name": "Fast for 12 hours",
                "completed": true
            }))
            .await
            .unwrap();
        assert!(result.success);

        let flag = store
            .get("enrollments/e1/checklistProgress/stage2/Fast for 12 hours")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(flag, json!(true));
    }
}
