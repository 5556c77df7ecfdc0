//! The turn executor — one user message in, one reply out.
//!
//! A turn moves through the phases: state loaded → routed → capability
//! loop → answered → persisted. The whole turn runs under a wall-clock
//! timeout; when it fires, the caller gets a fixed degraded reply and the
//! thread's state is not persisted for that turn. Any other failure also
//! degrades to a fixed reply, logged internally, never propagated.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use trialpilot_core::event::{DomainEvent, EventBus};
use trialpilot_core::message::{Message, ThreadId};
use trialpilot_core::thread::ThreadStore;

use crate::capability::CapabilitySet;
use crate::loop_runner::CapabilityLoop;
use crate::router::Router;

/// Reply when the turn exceeds its wall-clock budget.
pub const TIMEOUT_REPLY: &str =
    "I'm sorry, this is taking longer than expected. Please try again in a moment.";

/// Reply when anything else goes wrong inside the turn.
pub const FAILURE_REPLY: &str =
    "I'm sorry, I'm having technical difficulties right now. Please try again later.";

/// One incoming user message.
pub struct TurnRequest {
    pub thread_id: ThreadId,
    pub text: String,
    /// The patient this message acts on behalf of, when known. Carried
    /// as message metadata; the capability still receives IDs in-text.
    pub acting_patient: Option<String>,
}

pub struct TurnExecutor {
    router: Router,
    capabilities: CapabilitySet,
    runner: CapabilityLoop,
    threads: Arc<dyn ThreadStore>,
    timeout: Duration,
    event_bus: Arc<EventBus>,
}

impl TurnExecutor {
    pub fn new(
        router: Router,
        capabilities: CapabilitySet,
        runner: CapabilityLoop,
        threads: Arc<dyn ThreadStore>,
        timeout: Duration,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            router,
            capabilities,
            runner,
            threads,
            timeout,
            event_bus,
        }
    }

    /// Execute one turn. Always returns a reply string; degraded replies
    /// stand in for timeouts and internal failures.
    pub async fn invoke_turn(&self, request: TurnRequest) -> String {
        let thread_id = request.thread_id.clone();
        let start = std::time::Instant::now();

        let outcome = tokio::time::timeout(self.timeout, self.run_turn(request)).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let (reply, outcome_label) = match outcome {
            Ok(Ok(reply)) => (reply, "answered"),
            Ok(Err(e)) => {
                warn!(thread_id = %thread_id, error = %e, "Turn failed");
                self.event_bus.publish(DomainEvent::ErrorOccurred {
                    context: format!("turn:{thread_id}"),
                    error_message: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                (FAILURE_REPLY.to_string(), "failed")
            }
            Err(_elapsed) => {
                warn!(thread_id = %thread_id, timeout_secs = self.timeout.as_secs(), "Turn timed out");
                (TIMEOUT_REPLY.to_string(), "timed_out")
            }
        };

        info!(thread_id = %thread_id, outcome = outcome_label, duration_ms, "Turn completed");
        self.event_bus.publish(DomainEvent::TurnCompleted {
            thread_id: thread_id.to_string(),
            outcome: outcome_label.to_string(),
            duration_ms,
            timestamp: chrono::Utc::now(),
        });

        reply
    }

    async fn run_turn(&self, request: TurnRequest) -> Result<String, trialpilot_core::Error> {
        let mut state = self.threads.load(&request.thread_id).await?;

        let mut user_message = Message::user(&request.text);
        if let Some(patient_id) = &request.acting_patient {
            user_message = user_message.with_metadata("patient_id", serde_json::json!(patient_id));
        }

        let kind = self
            .router
            .route(&request.thread_id, &state, &request.text, &self.capabilities)
            .await?;

        state.push(user_message);

        let profile = self.capabilities.get(kind);
        let (reply, iterations) = self.runner.run(profile, &mut state).await?;

        state.checkpoint = Some(serde_json::json!({
            "last_capability": kind.as_str(),
            "iterations": iterations,
        }));

        self.threads.save(&request.thread_id, &state).await?;

        Ok(reply)
    }
}
