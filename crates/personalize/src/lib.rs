//! Protocol personalization — rewrite a generic trial protocol for one
//! patient.
//!
//! Stateless pipeline, independent of the conversation machinery: fetch
//! the patient's EMR and the trial's staged protocol from the document
//! store, ask the completion model to rewrite every stage summary and
//! checklist item for this patient, and validate that the output keeps
//! the template's exact shape (same stage keys, same checklist length
//! per stage). The generic protocol in the store is never mutated.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use trialpilot_core::error::{ProviderError, StoreError};
use trialpilot_core::event::{DomainEvent, EventBus};
use trialpilot_core::message::Message;
use trialpilot_core::paths;
use trialpilot_core::protocol::{PersonalizedProtocol, ProtocolStage, TrialProtocol};
use trialpilot_core::provider::{Provider, ProviderRequest};
use trialpilot_core::store::DocumentStore;

/// Personalization failures, distinguished so callers can map them to
/// distinct user-facing responses.
#[derive(Debug, Error)]
pub enum PersonalizeError {
    #[error("No EMR found for patient '{0}'")]
    NoRecord(String),

    #[error("No protocol found for trial '{0}'")]
    NoProtocol(String),

    #[error("Stage {1} of trial '{0}' is malformed: {2}")]
    MalformedStage(String, u32, String),

    #[error("Personalized output did not match the protocol shape: {0}")]
    Generation(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Personalizer {
    store: Arc<dyn DocumentStore>,
    provider: Arc<dyn Provider>,
    model: String,
    event_bus: Arc<EventBus>,
}

impl Personalizer {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            store,
            provider,
            model: model.into(),
            event_bus,
        }
    }

    /// Produce a personalized protocol for one (patient, trial) pair.
    pub async fn personalize(
        &self,
        patient_id: &str,
        trial_id: &str,
    ) -> Result<PersonalizedProtocol, PersonalizeError> {
        let emr = self
            .store
            .get(&paths::patient_emr(patient_id))
            .await?
            .ok_or_else(|| PersonalizeError::NoRecord(patient_id.to_string()))?;

        let template = self.load_protocol(trial_id).await?;
        debug!(patient_id, trial_id, stages = template.stages.len(), "Personalizing protocol");

        let prompt = Self::merge_prompt(&emr, &template);
        let request = ProviderRequest::text_only(&self.model, vec![Message::system(prompt)]);
        let response = self.provider.complete(request).await?;

        let stages = Self::parse_reply(&response.message.content, &template)?;

        info!(patient_id, trial_id, stages = stages.len(), "Protocol personalized");
        self.event_bus.publish(DomainEvent::ProtocolPersonalized {
            patient_id: patient_id.to_string(),
            trial_id: trial_id.to_string(),
            stages: stages.len(),
            timestamp: chrono::Utc::now(),
        });

        Ok(PersonalizedProtocol {
            trial_id: trial_id.to_string(),
            patient_id: patient_id.to_string(),
            stages,
        })
    }

    /// Read the trial's stages out of the store into a typed template.
    async fn load_protocol(&self, trial_id: &str) -> Result<TrialProtocol, PersonalizeError> {
        let mut stages = BTreeMap::new();
        for key in self.store.list(&paths::trial_stages(trial_id)).await? {
            let Ok(n) = key.parse::<u32>() else {
                warn!(trial_id, key, "Skipping non-numeric stage key");
                continue;
            };
            let Some(value) = self.store.get(&paths::trial_stage(trial_id, n)).await? else {
                continue;
            };
            // A stage that fails to deserialize would silently shrink the
            // template, so it fails the whole personalization instead.
            let stage = serde_json::from_value::<ProtocolStage>(value).map_err(|e| {
                PersonalizeError::MalformedStage(trial_id.to_string(), n, e.to_string())
            })?;
            stages.insert(n, stage);
        }

        if stages.is_empty() {
            return Err(PersonalizeError::NoProtocol(trial_id.to_string()));
        }

        Ok(TrialProtocol {
            trial_id: trial_id.to_string(),
            stages,
        })
    }

    fn merge_prompt(emr: &serde_json::Value, template: &TrialProtocol) -> String {
        let emr_json = serde_json::to_string_pretty(emr).unwrap_or_default();
        let protocol_json = serde_json::to_string_pretty(&template.stages).unwrap_or_default();

        format!(
            "You are a helpful clinical trial assistant with deep medical expertise. \
             Your task is to personalize a generic clinical trial protocol for a \
             specific patient based on their EMR.\n\n\
             Patient's EMR:\n{emr_json}\n\n\
             Generic Trial Protocol (stage number -> stage):\n{protocol_json}\n\n\
             Instructions:\n\
             Rewrite the generic protocol to be personalized for this patient. For each stage, you MUST:\n\
             1. Rewrite the 'summary' to include specific advice relevant to the patient's conditions.\n\
             2. Rewrite each 'checklist' item from a generic instruction to a specific, tailored \
             actionable task for THIS patient, such as mentioning their exact medications where \
             applicable (e.g., \"Discontinue blood thinners\" becomes \"Stop taking your Aspirin 81mg\").\n\
             3. Return ONLY a single, valid JSON object that has the same structure as the generic \
             protocol: the same stage keys, each stage keeping its 'name' and 'duration' with the \
             personalized 'summary' and 'checklist' fields, and each checklist keeping the same \
             number of items in the same order."
        )
    }

    /// Strip code fences, parse, and validate the personalized stages
    /// against the template's shape.
    fn parse_reply(
        reply: &str,
        template: &TrialProtocol,
    ) -> Result<BTreeMap<u32, ProtocolStage>, PersonalizeError> {
        let cleaned = reply.trim().replace("```json", "").replace("```", "");

        let raw: BTreeMap<String, ProtocolStage> = serde_json::from_str(cleaned.trim())
            .map_err(|e| PersonalizeError::Generation(format!("invalid JSON: {e}")))?;

        let mut stages = BTreeMap::new();
        for (key, stage) in raw {
            let n: u32 = key
                .parse()
                .map_err(|_| PersonalizeError::Generation(format!("non-numeric stage key '{key}'")))?;
            stages.insert(n, stage);
        }

        let template_keys: Vec<u32> = template.stages.keys().copied().collect();
        let output_keys: Vec<u32> = stages.keys().copied().collect();
        if template_keys != output_keys {
            return Err(PersonalizeError::Generation(format!(
                "stage keys changed: expected {template_keys:?}, got {output_keys:?}"
            )));
        }

        for (n, expected_len) in template.checklist_cardinality() {
            let got = stages[&n].checklist.len();
            if got != expected_len {
                return Err(PersonalizeError::Generation(format!(
                    "stage {n} checklist has {got} items, template has {expected_len}"
                )));
            }
        }

        Ok(stages)
    }
}
