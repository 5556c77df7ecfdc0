//! ThreadStore trait — durable per-thread conversation state.
//!
//! Each conversation thread holds an ordered message history plus an
//! opaque checkpoint blob the orchestrator uses to resume reasoning
//! across turns and process restarts. Threads are logically independent;
//! no cross-thread locking is provided, and concurrent turns on the
//! *same* thread are not guaranteed mutually exclusive (last save wins).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::message::{Message, ThreadId};

/// The durable state of one conversation thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadState {
    /// Ordered message history (user/assistant/tool roles).
    pub messages: Vec<Message>,

    /// Opaque checkpoint written by the turn executor; offered back to
    /// the router as a continuity hint on the next turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<serde_json::Value>,
}

impl ThreadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the history.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The content of the last assistant message, if any.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::message::Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

/// The core ThreadStore trait.
///
/// `load` returns empty state for a never-seen thread; `save` atomically
/// replaces that thread's state.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// The backend name (e.g., "in_memory", "file").
    fn name(&self) -> &str;

    /// Load a thread's state. Empty state if the thread is new.
    async fn load(&self, thread_id: &ThreadId) -> std::result::Result<ThreadState, StateError>;

    /// Atomically replace a thread's state.
    async fn save(
        &self,
        thread_id: &ThreadId,
        state: &ThreadState,
    ) -> std::result::Result<(), StateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_has_no_messages() {
        let state = ThreadState::new();
        assert!(state.messages.is_empty());
        assert!(state.checkpoint.is_none());
        assert!(state.last_assistant_text().is_none());
    }

    #[test]
    fn last_assistant_text_skips_tool_messages() {
        let mut state = ThreadState::new();
        state.push(Message::user("What was my last log entry?"));
        state.push(Message::assistant("Your last entry was 'Completed daily walk.'"));
        state.push(Message::tool_result("call_1", "raw tool output"));
        assert_eq!(
            state.last_assistant_text(),
            Some("Your last entry was 'Completed daily walk.'")
        );
    }

    #[test]
    fn state_serialization_roundtrip() {
        let mut state = ThreadState::new();
        state.push(Message::user("hi"));
        state.checkpoint = Some(serde_json::json!({"last_capability": "trial_info"}));

        let json = serde_json::to_string(&state).unwrap();
        let back: ThreadState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.messages.len(), 1);
        assert_eq!(back.checkpoint.unwrap()["last_capability"], "trial_info");
    }
}
