//! Trial protocol and enrollment domain types.
//!
//! The protocol's source of truth is the document store; the
//! personalization pipeline reads it and produces a derived, parallel
//! structure without ever mutating the original.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One stage of a trial protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolStage {
    /// Stage name (e.g., "Screening", "Dose Escalation").
    pub name: String,

    /// Free-text duration (e.g., "2 weeks").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Stage summary — the field both `update_trial_protocol` and the
    /// personalization pipeline rewrite.
    pub summary: String,

    /// Ordered task descriptions. Order and cardinality are part of the
    /// protocol's shape and must be preserved by personalization.
    #[serde(default)]
    pub checklist: Vec<String>,
}

/// A trial's full staged protocol, keyed by stage number.
///
/// `BTreeMap` keeps stages in numeric order regardless of the order the
/// store returns child keys in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialProtocol {
    pub trial_id: String,
    pub stages: BTreeMap<u32, ProtocolStage>,
}

impl TrialProtocol {
    /// Checklist length per stage, used to validate personalized output.
    pub fn checklist_cardinality(&self) -> BTreeMap<u32, usize> {
        self.stages
            .iter()
            .map(|(n, s)| (*n, s.checklist.len()))
            .collect()
    }
}

/// A protocol rewritten for one patient. Same shape as the template:
/// same stage keys, same checklist ordering and cardinality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalizedProtocol {
    pub trial_id: String,
    pub patient_id: String,
    pub stages: BTreeMap<u32, ProtocolStage>,
}

/// The relationship record linking a patient to a trial.
///
/// Owned by an external collaborator; the core reads it through the
/// document store and updates only the nested checklist bits. At most one
/// active enrollment per (patient, trial) is assumed enforced upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub patient_id: String,
    pub trial_id: String,
    pub is_active: bool,

    #[serde(default)]
    pub current_stage: u32,

    /// `stage{n}` → item description → completed.
    #[serde(default)]
    pub checklist_progress: BTreeMap<String, BTreeMap<String, bool>>,
}
