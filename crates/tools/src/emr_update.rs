//! EMR append — adds one entry to the patient's log.
//!
//! The log is append-only and monotonically growing: this tool never
//! overwrites prior entries, and a store failure comes back as a
//! distinguishable failure string rather than an error, so the calling
//! capability can relay it conversationally.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use trialpilot_core::error::ToolError;
use trialpilot_core::paths;
use trialpilot_core::store::DocumentStore;
use trialpilot_core::tool::{Tool, ToolResult};

use crate::common::require_str;

pub struct UpdatePatientEmrTool {
    store: Arc<dyn DocumentStore>,
}

impl UpdatePatientEmrTool {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for UpdatePatientEmrTool {
    fn name(&self) -> &str {
        "update_patient_emr"
    }

    fn description(&self) -> &str {
        "Appends a new entry (e.g., a reported side effect or completed activity) \
         to the patient's EMR log. Never modifies existing entries."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "patient_id": {
                    "type": "string",
                    "description": "The patient's identifier"
                },
                "entry": {
                    "type": "string",
                    "description": "The log entry to append"
                }
            },
            "required": ["patient_id", "entry"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let patient_id = require_str(&arguments, "patient_id")?;
        let entry = require_str(&arguments, "entry")?;
        debug!(patient_id, "Appending EMR log entry");

        match self
            .store
            .append(&paths::patient_emr_log(patient_id), serde_json::json!(entry))
            .await
        {
            Ok(()) => Ok(ToolResult::ok("EMR updated successfully.")),
            Err(e) => Ok(ToolResult::failed(format!("Error updating EMR: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trialpilot_store::InMemoryStore;

    #[tokio::test]
    async fn appends_are_monotonic() {
        let store = Arc::new(InMemoryStore::with_data(json!({
            "emr_records": {"p1": {"log": ["Initial consultation."]}}
        })));
        let tool = UpdatePatientEmrTool::new(store.clone());

        for entry in ["Completed daily walk.", "Reported mild headache."] {
            let result = tool
                .execute(json!({"patient_id": "p1", "entry": entry}))
                .await
                .unwrap();
            assert!(result.success);
            assert_eq!(result.output, "EMR updated successfully.");
        }

        let log = store.get("emr_records/p1/log").await.unwrap().unwrap();
        let log = log.as_array().unwrap().clone();
        assert_eq!(log.len(), 3);
        // Prior entries preserved unchanged
        assert_eq!(log[0], "Initial consultation.");
        assert_eq!(log[2], "Reported mild headache.");
    }

    #[tokio::test]
    async fn creates_log_for_new_patient() {
        let store = Arc::new(InMemoryStore::new());
        let tool = UpdatePatientEmrTool::new(store.clone());

        let result = tool
            .execute(json!({"patient_id": "p2", "entry": "Enrolled in trial HTN-04."}))
            .await
            .unwrap();
        assert!(result.success);

        let log = store.get("emr_records/p2/log").await.unwrap().unwrap();
        assert_eq!(log.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn store_failure_becomes_failure_string() {
        // A log that is not an array makes the append fail at the store
        let store = Arc::new(InMemoryStore::with_data(json!({
            "emr_records": {"p1": {"log": "corrupted"}}
        })));
        let tool = UpdatePatientEmrTool::new(store);

        let result = tool
            .execute(json!({"patient_id": "p1", "entry": "entry"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.starts_with("Error updating EMR:"));
    }
}
