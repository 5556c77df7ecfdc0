//! Capability profiles — the three specialist configurations a turn can
//! be routed to.
//!
//! A capability is not a process or a long-lived agent; it is a named
//! bundle of (description, system prompt, tool registry) that the turn
//! executor dispatches to. Profiles are built once at startup and are
//! immutable afterwards.

use std::sync::Arc;
use trialpilot_core::store::DocumentStore;
use trialpilot_core::tool::ToolRegistry;

/// The closed set of capabilities.
///
/// Dispatch goes through this enum rather than string lookup, so an
/// unknown capability is unrepresentable past the router boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// Patient-specific data: profiles, EMR reads and appends, checklists.
    Records,
    /// Read-only trial explanations for patients.
    TrialInfo,
    /// Staff-facing progress queries and administrative updates.
    SiteAdmin,
}

impl CapabilityKind {
    /// All kinds, in presentation order.
    pub const ALL: [CapabilityKind; 3] = [
        CapabilityKind::Records,
        CapabilityKind::TrialInfo,
        CapabilityKind::SiteAdmin,
    ];

    /// The wire name used in router prompts and checkpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Records => "records_management",
            CapabilityKind::TrialInfo => "trial_information",
            CapabilityKind::SiteAdmin => "site_coordination",
        }
    }

    /// Parse a router reply (or checkpoint value) into a kind.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| normalized.contains(kind.as_str()))
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability profile: what the router sees (name + description) and
/// what the loop runs with (prompt + tools).
pub struct CapabilityProfile {
    pub kind: CapabilityKind,
    pub description: String,
    pub prompt: String,
    pub tools: ToolRegistry,
}

impl CapabilityProfile {
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }
}

/// The immutable set of built-in capability profiles.
pub struct CapabilitySet {
    profiles: Vec<CapabilityProfile>,
}

impl CapabilitySet {
    /// Build the three built-in capabilities over a shared document store.
    pub fn builtin(store: Arc<dyn DocumentStore>) -> Self {
        let profiles = vec![
            CapabilityProfile {
                kind: CapabilityKind::Records,
                description: "Manages all patient-specific data, including both personal \
                    profiles (name, email), sensitive medical records (EMR), and checklist \
                    items. Use this for any task related to reading, writing, or updating \
                    any of a patient's data."
                    .into(),
                prompt: "You are a diligent patient data assistant. You handle both \
                    personal and medical records with accuracy. Always confirm when an \
                    update is complete."
                    .into(),
                tools: trialpilot_tools::records_registry(store.clone()),
            },
            CapabilityProfile {
                kind: CapabilityKind::TrialInfo,
                description: "Provides information to patients about the clinical trial. \
                    Use this to answer questions about the trial's purpose, specific \
                    stages, or what to expect next."
                    .into(),
                prompt: "You are a helpful and clear communicator. Your job is to explain \
                    the clinical trial to patients in an easy-to-understand way."
                    .into(),
                tools: trialpilot_tools::trial_info_registry(store.clone()),
            },
            CapabilityProfile {
                kind: CapabilityKind::SiteAdmin,
                description: "An assistant for the clinical trial organization staff. Use \
                    this to query patient progress, update checklists, or make \
                    administrative updates to the trial protocol."
                    .into(),
                prompt: "You are an administrative assistant for the clinical trial staff. \
                    Be precise and formal. Confirm all administrative changes."
                    .into(),
                tools: trialpilot_tools::site_admin_registry(store),
            },
        ];
        Self { profiles }
    }

    /// Look up a profile by kind.
    pub fn get(&self, kind: CapabilityKind) -> &CapabilityProfile {
        // builtin() constructs one profile per kind, so this always finds one
        self.profiles
            .iter()
            .find(|p| p.kind == kind)
            .unwrap_or(&self.profiles[0])
    }

    /// All profiles, in presentation order.
    pub fn profiles(&self) -> &[CapabilityProfile] {
        &self.profiles
    }
}
