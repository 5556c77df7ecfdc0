//! Trial lookup — whole-trial or single-stage info, read-only.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use trialpilot_core::error::ToolError;
use trialpilot_core::paths;
use trialpilot_core::store::DocumentStore;
use trialpilot_core::tool::{Tool, ToolResult};

use crate::common::require_str;

pub struct GetTrialInfoTool {
    store: Arc<dyn DocumentStore>,
}

impl GetTrialInfoTool {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetTrialInfoTool {
    fn name(&self) -> &str {
        "get_trial_info"
    }

    fn description(&self) -> &str {
        "Provides information about a clinical trial. If stage_number is given, \
         provides stage-specific info; otherwise the whole trial."
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
                    "description": "Optional stage number for stage-specific info"
                }
            },
            "required": ["trial_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let trial_id = require_str(&arguments, "trial_id")?;
        let stage_number = arguments["stage_number"]
            .as_u64()
            .and_then(|n| u32::try_from(n).ok());
        debug!(trial_id, ?stage_number, "Fetching trial info");

        let path = match stage_number {
            Some(n) => paths::trial_stage(trial_id, n),
            None => paths::trial(trial_id),
        };

        match self.store.get(&path).await {
            Ok(Some(info)) => Ok(ToolResult::ok(info.to_string())),
            Ok(None) => Ok(ToolResult::ok(format!(
                "No info found for trial '{trial_id}'."
            ))),
            Err(e) => Ok(ToolResult::failed(format!("Error fetching trial info: {e}"))),
        }
    }
}
