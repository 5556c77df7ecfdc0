//! The capability router.
//!
//! One classification completion call per turn: the model sees only the
//! capability names and descriptions (never their tools), a window of
//! recent conversation, and the previous turn's capability as a
//! continuity hint. The reply is parsed into a `CapabilityKind`; anything
//! unrecognizable falls back to the records capability so a turn always
//! has somewhere to go.

use std::sync::Arc;
use tracing::{debug, warn};
use trialpilot_core::event::{DomainEvent, EventBus};
use trialpilot_core::message::{Message, ThreadId};
use trialpilot_core::provider::{Provider, ProviderRequest};
use trialpilot_core::thread::ThreadState;

use crate::capability::{CapabilityKind, CapabilitySet};

/// How many trailing messages of history the router sees.
const CONTEXT_WINDOW: usize = 6;

pub struct Router {
    provider: Arc<dyn Provider>,
    model: String,
    event_bus: Arc<EventBus>,
}

impl Router {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, event_bus: Arc<EventBus>) -> Self {
        Self {
            provider,
            model: model.into(),
            event_bus,
        }
    }

    /// Select a capability for the incoming user message.
    pub async fn route(
        &self,
        thread_id: &ThreadId,
        state: &ThreadState,
        user_text: &str,
        capabilities: &CapabilitySet,
    ) -> Result<CapabilityKind, trialpilot_core::Error> {
        let prompt = Self::classification_prompt(state, user_text, capabilities);

        let request = ProviderRequest::text_only(&self.model, vec![Message::system(prompt)]);
        let response = self.provider.complete(request).await?;
        let reply = response.message.content.trim().to_string();

        let kind = match CapabilityKind::parse(&reply) {
            Some(kind) => kind,
            None => {
                warn!(thread_id = %thread_id, reply = %reply, "Unparseable router reply, falling back");
                CapabilityKind::Records
            }
        };

        debug!(thread_id = %thread_id, capability = %kind, "Capability selected");
        self.event_bus.publish(DomainEvent::CapabilitySelected {
            thread_id: thread_id.to_string(),
            capability: kind.as_str().to_string(),
            timestamp: chrono::Utc::now(),
        });

        Ok(kind)
    }

    fn classification_prompt(
        state: &ThreadState,
        user_text: &str,
        capabilities: &CapabilitySet,
    ) -> String {
        let capability_list: String = capabilities
            .profiles()
            .iter()
            .map(|p| format!("- {}: {}", p.name(), p.description))
            .collect::<Vec<_>>()
            .join("\n");

        let context: String = state
            .messages
            .iter()
            .rev()
            .take(CONTEXT_WINDOW)
            .filter(|m| {
                matches!(
                    m.role,
                    trialpilot_core::message::Role::User | trialpilot_core::message::Role::Assistant
                )
            })
            .map(|m| {
                let role = match m.role {
                    trialpilot_core::message::Role::User => "user",
                    _ => "assistant",
                };
                format!("{role}: {}", m.content)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n");

        let hint = state
            .checkpoint
            .as_ref()
            .and_then(|c| c["last_capability"].as_str())
            .map(|cap| format!("\nThe previous turn was handled by: {cap}\n"))
            .unwrap_or_default();

        format!(
            "You are the central router for a clinical trial chat system. Select the \
             single capability best suited to handle the user's message.\n\n\
             Available capabilities:\n{capability_list}\n\n\
             Recent conversation:\n{context}\n{hint}\n\
             User message: {user_text}\n\n\
             Respond with exactly one capability name and nothing else."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use trialpilot_store::InMemoryStore;

    fn set() -> CapabilitySet {
        CapabilitySet::builtin(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn routes_to_named_capability() {
        let provider = Arc::new(SequentialMockProvider::single_text("trial_information"));
        let router = Router::new(provider, "mock-model", Arc::new(EventBus::default()));

        let kind = router
            .route(
                &ThreadId::from("t1"),
                &ThreadState::new(),
                "What is stage 2 of trial 'htn-04'?",
                &set(),
            )
            .await
            .unwrap();
        assert_eq!(kind, CapabilityKind::TrialInfo);
    }

    #[tokio::test]
    async fn unparseable_reply_falls_back_to_records() {
        let provider = Arc::new(SequentialMockProvider::single_text(
            "I am not sure which one to pick.",
        ));
        let router = Router::new(provider, "mock-model", Arc::new(EventBus::default()));

        let kind = router
            .route(&ThreadId::from("t1"), &ThreadState::new(), "hello", &set())
            .await
            .unwrap();
        assert_eq!(kind, CapabilityKind::Records);
    }

    #[tokio::test]
    async fn router_emits_selection_event() {
        let provider = Arc::new(SequentialMockProvider::single_text("site_coordination"));
        let event_bus = Arc::new(EventBus::default());
        let mut rx = event_bus.subscribe();
        let router = Router::new(provider, "mock-model", event_bus);

        router
            .route(
                &ThreadId::from("t1"),
                &ThreadState::new(),
                "Show me progress for patient 'p1'",
                &set(),
            )
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::CapabilitySelected { capability, .. } => {
                assert_eq!(capability, "site_coordination");
            }
            other => panic!("Expected CapabilitySelected, got {other:?}"),
        }
    }

    #[test]
    fn prompt_includes_checkpoint_hint() {
        let mut state = ThreadState::new();
        state.checkpoint = Some(serde_json::json!({"last_capability": "trial_information"}));
        let prompt = Router::classification_prompt(&state, "and stage 3?", &set());
        assert!(prompt.contains("previous turn was handled by: trial_information"));
        assert!(prompt.contains("records_management"));
        assert!(prompt.contains("and stage 3?"));
    }

    #[test]
    fn prompt_never_mentions_tools() {
        let prompt = Router::classification_prompt(&ThreadState::new(), "hi", &set());
        assert!(!prompt.contains("get_patient_emr"));
        assert!(!prompt.contains("update_trial_protocol"));
    }
}
