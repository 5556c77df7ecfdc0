//! Helpers shared between tools.

use serde_json::Value;
use trialpilot_core::error::StoreError;
use trialpilot_core::paths;
use trialpilot_core::store::DocumentStore;

/// Scan the enrollment collection for the patient's active enrollment.
///
/// Returns the first active match in store iteration order (child keys
/// sorted). If the upstream invariant of at most one active enrollment
/// per patient is violated, this is deterministic for a given store
/// content but otherwise arbitrary.
pub(crate) async fn find_active_enrollment(
    store: &dyn DocumentStore,
    patient_id: &str,
) -> Result<Option<(String, Value)>, StoreError> {
    for key in store.list(paths::enrollments()).await? {
        let Some(doc) = store.get(&paths::enrollment(&key)).await? else {
            continue;
        };
        let matches = doc["patientId"].as_str() == Some(patient_id)
            && doc["isActive"].as_bool() == Some(true);
        if matches {
            return Ok(Some((key, doc)));
        }
    }
    Ok(None)
}

/// Pull a required string argument.
pub(crate) fn require_str<'a>(
    arguments: &'a Value,
    key: &str,
) -> Result<&'a str, trialpilot_core::error::ToolError> {
    arguments[key].as_str().ok_or_else(|| {
        trialpilot_core::error::ToolError::InvalidArguments(format!("Missing '{key}' argument"))
    })
}

/// Pull a required unsigned-integer argument.
pub(crate) fn require_u32(
    arguments: &Value,
    key: &str,
) -> Result<u32, trialpilot_core::error::ToolError> {
    arguments[key]
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            trialpilot_core::error::ToolError::InvalidArguments(format!(
                "Missing or invalid '{key}' argument"
            ))
        })
}
