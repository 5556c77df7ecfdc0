//! In-memory document store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use trialpilot_core::error::StoreError;
use trialpilot_core::store::DocumentStore;

use crate::tree;

/// An in-memory store holding the whole hierarchy as one JSON tree.
///
/// All mutations happen under a single write lock, which makes each
/// single-path `set`/`append` atomic.
pub struct InMemoryStore {
    root: Arc<RwLock<Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(Value::Object(serde_json::Map::new()))),
        }
    }

    /// Seed the store from a full JSON tree — handy in tests.
    pub fn with_data(root: Value) -> Self {
        Self {
            root: Arc::new(RwLock::new(root)),
        }
    }

    /// Snapshot the whole tree — used by tests to assert nothing changed.
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let root = self.root.read().await;
        Ok(tree::get(&root, path)?.cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let mut root = self.root.write().await;
        tree::set(&mut root, path, value)
    }

    async fn append(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let mut root = self.root.write().await;
        tree::append(&mut root, path, value)
    }

    async fn delete(&self, path: &str) -> Result<bool, StoreError> {
        let mut root = self.root.write().await;
        tree::delete(&mut root, path)
    }

    async fn list(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let root = self.root.read().await;
        tree::list(&root, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_and_get() {
        let store = InMemoryStore::new();
        store
            .set("users/p1", json!({"firstName": "John", "lastName": "Smith"}))
            .await
            .unwrap();

        let profile = store.get("users/p1").await.unwrap().unwrap();
        assert_eq!(profile["firstName"], "John");
        assert!(store.get("users/p2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn append_grows_log_monotonically() {
        let store = InMemoryStore::new();
        store
            .set("emr_records/p1", json!({"conditions": ["hypertension"], "log": []}))
            .await
            .unwrap();

        for entry in ["Initial consultation.", "Reported dizziness.", "Dose adjusted."] {
            store
                .append("emr_records/p1/log", json!(entry))
                .await
                .unwrap();
        }

        let log = store.get("emr_records/p1/log").await.unwrap().unwrap();
        let log = log.as_array().unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0], "Initial consultation.");
        assert_eq!(log[2], "Dose adjusted.");
    }

    #[tokio::test]
    async fn list_enrollments_sorted() {
        let store = InMemoryStore::with_data(json!({
            "enrollments": {
                "e2": {"patientId": "p2"},
                "e1": {"patientId": "p1"}
            }
        }));
        assert_eq!(store.list("enrollments").await.unwrap(), vec!["e1", "e2"]);
        assert!(store.list("users").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_writes_last_one_wins() {
        let store = Arc::new(InMemoryStore::with_data(json!({
            "enrollments": {"e1": {"patientId": "p1", "isActive": true}}
        })));

        let path = "enrollments/e1/checklistProgress/stage1/Fast for 12 hours";
        let mut handles = Vec::new();
        for complete in [true, false, true, false] {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.set(path, json!(complete)).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        // No corruption: the bit is a bool, whichever write landed last.
        let value = store.get(path).await.unwrap().unwrap();
        assert!(value.is_boolean());
    }
}
