//! In-memory thread store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use trialpilot_core::error::StateError;
use trialpilot_core::message::ThreadId;
use trialpilot_core::thread::{ThreadState, ThreadStore};

/// An in-memory thread store backed by a HashMap.
pub struct InMemoryThreadStore {
    threads: Arc<RwLock<HashMap<ThreadId, ThreadState>>>,
}

impl InMemoryThreadStore {
    pub fn new() -> Self {
        Self {
            threads: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of known threads — used by tests.
    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }
}

impl Default for InMemoryThreadStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThreadStore for InMemoryThreadStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn load(&self, thread_id: &ThreadId) -> Result<ThreadState, StateError> {
        let threads = self.threads.read().await;
        Ok(threads.get(thread_id).cloned().unwrap_or_default())
    }

    async fn save(&self, thread_id: &ThreadId, state: &ThreadState) -> Result<(), StateError> {
        let mut threads = self.threads.write().await;
        threads.insert(thread_id.clone(), state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trialpilot_core::message::Message;

    #[tokio::test]
    async fn unknown_thread_loads_empty() {
        let store = InMemoryThreadStore::new();
        let state = store.load(&ThreadId::from("never-seen")).await.unwrap();
        assert!(state.messages.is_empty());
        assert!(state.checkpoint.is_none());
    }

    #[tokio::test]
    async fn save_then_load_roundtrip() {
        let store = InMemoryThreadStore::new();
        let id = ThreadId::from("thread-1");

        let mut state = ThreadState::new();
        state.push(Message::user("Add to my EMR: completed daily walk."));
        state.checkpoint = Some(serde_json::json!({"last_capability": "records"}));
        store.save(&id, &state).await.unwrap();

        let loaded = store.load(&id).await.unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(
            loaded.checkpoint.unwrap()["last_capability"],
            "records"
        );
    }

    #[tokio::test]
    async fn save_replaces_whole_state() {
        let store = InMemoryThreadStore::new();
        let id = ThreadId::from("thread-1");

        let mut first = ThreadState::new();
        first.push(Message::user("one"));
        first.push(Message::assistant("two"));
        store.save(&id, &first).await.unwrap();

        let second = ThreadState::new();
        store.save(&id, &second).await.unwrap();

        let loaded = store.load(&id).await.unwrap();
        assert!(loaded.messages.is_empty());
        assert_eq!(store.thread_count().await, 1);
    }

    #[tokio::test]
    async fn threads_are_independent() {
        let store = InMemoryThreadStore::new();

        let mut a = ThreadState::new();
        a.push(Message::user("for thread a"));
        store.save(&ThreadId::from("a"), &a).await.unwrap();

        let b = store.load(&ThreadId::from("b")).await.unwrap();
        assert!(b.messages.is_empty());
    }
}
