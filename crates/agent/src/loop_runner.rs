//! The capability tool-calling loop.
//!
//! Runs the selected capability against the conversation: call the model
//! with the capability's tool definitions, execute any requested tools,
//! feed the results back, and repeat until the model answers in plain
//! text. There is no iteration cap; the turn executor's wall-clock
//! timeout is the only bound.

use std::sync::Arc;
use tracing::{debug, warn};
use trialpilot_core::event::{DomainEvent, EventBus};
use trialpilot_core::message::{Message, Role};
use trialpilot_core::provider::{Provider, ProviderRequest};
use trialpilot_core::thread::ThreadState;
use trialpilot_core::tool::ToolCall;

use crate::capability::CapabilityProfile;

pub struct CapabilityLoop {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    event_bus: Arc<EventBus>,
}

impl CapabilityLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            event_bus,
        }
    }

    /// Set the max tokens per completion.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Run the capability over the thread until the model produces a
    /// plain-text answer. Returns the answer and the iteration count.
    pub async fn run(
        &self,
        profile: &CapabilityProfile,
        state: &mut ThreadState,
    ) -> Result<(String, u32), trialpilot_core::Error> {
        // The capability's prompt owns the system slot. A thread can be
        // handled by different capabilities on different turns, so the
        // slot is overwritten rather than appended.
        if state.messages.first().is_some_and(|m| m.role == Role::System) {
            state.messages[0] = Message::system(&profile.prompt);
        } else {
            state.messages.insert(0, Message::system(&profile.prompt));
        }

        let tool_definitions = profile.tools.definitions();
        let mut iteration: u32 = 0;

        loop {
            iteration += 1;
            debug!(capability = profile.name(), iteration, "Capability loop iteration");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: state.messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            let response = self.provider.complete(request).await?;

            if response.message.tool_calls.is_empty() {
                let answer = response.message.content.clone();
                state.push(response.message);
                return Ok((answer, iteration));
            }

            let tool_calls = response.message.tool_calls.clone();
            state.push(response.message);

            for tc in &tool_calls {
                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
                };

                let start = std::time::Instant::now();
                let result = profile.tools.execute(&call).await;
                let duration_ms = start.elapsed().as_millis() as u64;

                match result {
                    Ok(tool_result) => {
                        self.event_bus.publish(DomainEvent::ToolExecuted {
                            tool_name: tc.name.clone(),
                            success: tool_result.success,
                            duration_ms,
                            timestamp: chrono::Utc::now(),
                        });
                        state.push(Message::tool_result(&tool_result.call_id, &tool_result.output));
                    }
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Tool execution failed");
                        self.event_bus.publish(DomainEvent::ToolExecuted {
                            tool_name: tc.name.clone(),
                            success: false,
                            duration_ms,
                            timestamp: chrono::Utc::now(),
                        });
                        // Report the error to the model so it can recover
                        state.push(Message::tool_result(&tc.id, format!("Error: {e}")));
                    }
                }
            }
        }
    }
}
