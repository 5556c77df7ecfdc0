//! # trialpilot Tools
//!
//! The seven clinical tools, each reading or writing one or more paths in
//! the hierarchical document store. Reads are idempotent; writes are
//! at-most-once from the orchestrator's perspective (no internal retry).
//!
//! Store-level failures never escape as errors — each tool folds them
//! into a descriptive output string so the calling capability can relay
//! the failure conversationally.

mod checklist_update;
mod common;
mod emr_update;
mod patient_emr;
mod patient_profile;
mod patient_progress;
mod protocol_update;
mod trial_info;

pub use checklist_update::UpdateChecklistItemTool;
pub use emr_update::UpdatePatientEmrTool;
pub use patient_emr::GetPatientEmrTool;
pub use patient_profile::GetPatientProfileTool;
pub use patient_progress::GetPatientProgressTool;
pub use protocol_update::UpdateTrialProtocolTool;
pub use trial_info::GetTrialInfoTool;

use std::sync::Arc;
use trialpilot_core::store::DocumentStore;
use trialpilot_core::tool::ToolRegistry;

/// Tools for the records-management capability: patient profiles, EMR
/// reads and appends, checklist updates.
pub fn records_registry(store: Arc<dyn DocumentStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(GetPatientProfileTool::new(store.clone())));
    registry.register(Box::new(GetPatientEmrTool::new(store.clone())));
    registry.register(Box::new(UpdatePatientEmrTool::new(store.clone())));
    registry.register(Box::new(UpdateChecklistItemTool::new(store)));
    registry
}

/// Tools for the trial-information capability: read-only trial lookup.
pub fn trial_info_registry(store: Arc<dyn DocumentStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(GetTrialInfoTool::new(store)));
    registry
}

/// Tools for the site-coordination capability: progress queries, protocol
/// edits, checklist edits.
pub fn site_admin_registry(store: Arc<dyn DocumentStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(GetPatientProgressTool::new(store.clone())));
    registry.register(Box::new(UpdateTrialProtocolTool::new(store.clone())));
    registry.register(Box::new(UpdateChecklistItemTool::new(store)));
    registry
}
