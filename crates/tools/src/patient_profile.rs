//! Patient profile lookup — demographic, non-sensitive data.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use trialpilot_core::error::ToolError;
use trialpilot_core::paths;
use trialpilot_core::store::DocumentStore;
use trialpilot_core::tool::{Tool, ToolResult};

use crate::common::require_str;

pub struct GetPatientProfileTool {
    store: Arc<dyn DocumentStore>,
}

impl GetPatientProfileTool {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetPatientProfileTool {
    fn name(&self) -> &str {
        "get_patient_profile"
    }

    fn description(&self) -> &str {
        "Retrieves a patient's personal profile, like first name, last name, and email. \
         Use this for questions about who a patient is, not their medical history."
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
        debug!(patient_id, "Fetching patient profile");

        match self.store.get(&paths::patient_profile(patient_id)).await {
            Ok(Some(profile)) => Ok(ToolResult::ok(profile.to_string())),
            Ok(None) => Ok(ToolResult::ok(format!(
                "No profile found for patient '{patient_id}'."
            ))),
            Err(e) => Ok(ToolResult::failed(format!("Error fetching profile: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trialpilot_store::InMemoryStore;

    #[tokio::test]
    async fn returns_profile_json() {
        let store = Arc::new(InMemoryStore::with_data(json!({
            "users": {"patient-xyz-123": {"firstName": "John", "lastName": "Smith"}}
        })));
        let tool = GetPatientProfileTool::new(store);

        let result = tool
            .execute(json!({"patient_id": "patient-xyz-123"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("John"));
    }

    #[tokio::test]
    async fn missing_patient_is_conversational() {
        let tool = GetPatientProfileTool::new(Arc::new(InMemoryStore::new()));
        let result = tool.execute(json!({"patient_id": "p9"})).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "No profile found for patient 'p9'.");
    }

    #[tokio::test]
    async fn missing_argument_is_invalid() {
        let tool = GetPatientProfileTool::new(Arc::new(InMemoryStore::new()));
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
