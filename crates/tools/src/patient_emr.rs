//! EMR read — the patient's sensitive clinical record.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use trialpilot_core::error::ToolError;
use trialpilot_core::paths;
use trialpilot_core::store::DocumentStore;
use trialpilot_core::tool::{Tool, ToolResult};

use crate::common::require_str;

pub struct GetPatientEmrTool {
    store: Arc<dyn DocumentStore>,
}

impl GetPatientEmrTool {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetPatientEmrTool {
    fn name(&self) -> &str {
        "get_patient_emr"
    }

    fn description(&self) -> &str {
        "Retrieves the patient's medical record (EMR): conditions, medications, \
         status flags, and the running log of entries."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "patient_id": {
                    "type": "string",
                    "description": "The patient's identifier"
                }
            },
            "required": ["patient_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let patient_id = require_str(&arguments, "patient_id")?;
        debug!(patient_id, "Fetching patient EMR");

        match self.store.get(&paths::patient_emr(patient_id)).await {
            Ok(Some(record)) => Ok(ToolResult::ok(record.to_string())),
            Ok(None) => Ok(ToolResult::ok(format!(
                "No EMR found for patient '{patient_id}'."
            ))),
            Err(e) => Ok(ToolResult::failed(format!("Error fetching EMR: {e}"))),
        }
    }
}
