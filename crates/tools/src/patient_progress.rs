//! Cross-patient progress lookup for site administrators.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use trialpilot_core::error::ToolError;
use trialpilot_core::store::DocumentStore;
use trialpilot_core::tool::{Tool, ToolResult};

use crate::common::{find_active_enrollment, require_str};

pub struct GetPatientProgressTool {
    store: Arc<dyn DocumentStore>,
}

impl GetPatientProgressTool {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetPatientProgressTool {
    fn name(&self) -> &str {
        "get_patient_progress"
    }

    fn description(&self) -> &str {
        "Retrieves a patient's progress in their active trial: current stage and \
         per-stage checklist completion."
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
        debug!(patient_id, "Fetching patient progress");

        match find_active_enrollment(self.store.as_ref(), patient_id).await {
            Ok(Some((_, enrollment))) => Ok(ToolResult::ok(enrollment.to_string())),
            Ok(None) => Ok(ToolResult::ok(format!(
                "No active enrollment found for patient '{patient_id}'."
            ))),
            Err(e) => Ok(ToolResult::failed(format!(
                "Error fetching patient progress: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trialpilot_store::InMemoryStore;

    #[tokio::test]
    async fn returns_active_enrollment() {
        let store = Arc::new(InMemoryStore::with_data(json!({
            "enrollments": {
                "e1": {
                    "patientId": "p1",
                    "trialId": "htn-04",
                    "isActive": true,
                    "currentStage": 2,
                    "checklistProgress": {
                        "stage1": {"Sign consent form": true},
                        "stage2": {"Schedule baseline visit": false}
                    }
                },
                "e2": {"patientId": "p1", "trialId": "old-01", "isActive": false}
            }
        })));
        let tool = GetPatientProgressTool::new(store);

        let result = tool.execute(json!({"patient_id": "p1"})).await.unwrap();
        assert!(result.success);
        assert!(result.output.contains("htn-04"));
        assert!(!result.output.contains("old-01"));
    }

    #[tokio::test]
    async fn inactive_only_is_no_enrollment() {
        let store = Arc::new(InMemoryStore::with_data(json!({
            "enrollments": {
                "e1": {"patientId": "p1", "trialId": "old-01", "isActive": false}
            }
        })));
        let tool = GetPatientProgressTool::new(store);

        let result = tool.execute(json!({"patient_id": "p1"})).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "No active enrollment found for patient 'p1'.");
    }
}
