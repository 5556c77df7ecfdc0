//! Stage summary edits — scoped so a capability can never touch stage
//! structure, only the human-readable summary text.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use trialpilot_core::error::ToolError;
use trialpilot_core::paths;
use trialpilot_core::store::DocumentStore;
use trialpilot_core::tool::{Tool, ToolResult};

use crate::common::{require_str, require_u32};

pub struct UpdateTrialProtocolTool {
    store: Arc<dyn DocumentStore>,
}

impl UpdateTrialProtocolTool {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for UpdateTrialProtocolTool {
    fn name(&self) -> &str {
        "update_trial_protocol"
    }

    fn description(&self) -> &str {
        "Replaces the summary text of one stage of a trial's protocol. \
         Cannot add, remove, or restructure stages."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "trial_id": {
                    "type": "string",
                    "description": "The trial's identifier"
                },
                "stage_number": {
                    "type": "integer",
                    "description": "The stage whose summary to replace"
                },
                "new_summary": {
                    "type": "string",
                    "description": "The replacement summary text"
                }
            },
            "required": ["trial_id", "stage_number", "new_summary"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let trial_id = require_str(&arguments, "trial_id")?;
        let stage_number = require_u32(&arguments, "stage_number")?;
        let new_summary = require_str(&arguments, "new_summary")?;
        debug!(trial_id, stage_number, "Updating trial protocol summary");

        // The stage must already exist; this tool never creates stages.
        match self.store.get(&paths::trial_stage(trial_id, stage_number)).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(ToolResult::ok(format!(
                    "No stage {stage_number} found for trial '{trial_id}'."
                )));
            }
            Err(e) => {
                return Ok(ToolResult::failed(format!(
                    "Error updating trial protocol: {e}"
                )));
            }
        }

        match self
            .store
            .set(
                &paths::trial_stage_summary(trial_id, stage_number),
                serde_json::json!(new_summary),
            )
            .await
        {
            Ok(()) => {
                info!(trial_id, stage_number, "Trial protocol summary replaced");
                Ok(ToolResult::ok("Trial protocol changes made successfully."))
            }
            Err(e) => Ok(ToolResult::failed(format!(
                "Error updating trial protocol: {e}"
            ))),
        }
    }
}
