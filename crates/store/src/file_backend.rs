//! File-based document store — a single JSON file holding the tree.
//!
//! The tree is loaded into memory on creation and flushed to disk on
//! every mutation. This gives fast reads with durable writes, and keeps
//! the data human-inspectable.

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use trialpilot_core::error::StoreError;
use trialpilot_core::store::DocumentStore;

use crate::tree;

/// A file-backed document store.
pub struct FileStore {
    path: PathBuf,
    root: Arc<RwLock<Value>>,
}

impl FileStore {
    /// Create a new file-backed store at the given path.
    ///
    /// If the file exists, the tree is loaded from it.
    /// If it does not, starts empty (file created on first write).
    pub fn new(path: PathBuf) -> Self {
        let root = Self::load_from_disk(&path);
        debug!(path = %path.display(), "File document store loaded");
        Self {
            path,
            root: Arc::new(RwLock::new(root)),
        }
    }

    /// Default path: `~/.trialpilot/data/documents.json`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".trialpilot")
            .join("data")
            .join("documents.json")
    }

    fn load_from_disk(path: &PathBuf) -> Value {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Value::Object(serde_json::Map::new()),
        };
        match serde_json::from_str(&content) {
            Ok(Value::Object(map)) => Value::Object(map),
            Ok(_) | Err(_) => {
                warn!(path = %path.display(), "Document file is not a JSON object, starting empty");
                Value::Object(serde_json::Map::new())
            }
        }
    }

    /// Flush the whole tree to disk. Called with the write lock held so
    /// mutations serialize with their own persistence.
    fn flush(&self, root: &Value) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create data directory: {e}"))
            })?;
        }
        let content = serde_json::to_string_pretty(root)
            .map_err(|e| StoreError::Storage(format!("Failed to serialize document tree: {e}")))?;
        std::fs::write(&self.path, content)
            .map_err(|e| StoreError::Storage(format!("Failed to write document file: {e}")))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let root = self.root.read().await;
        Ok(tree::get(&root, path)?.cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let mut root = self.root.write().await;
        tree::set(&mut root, path, value)?;
        self.flush(&root)
    }

    async fn append(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let mut root = self.root.write().await;
        tree::append(&mut root, path, value)?;
        self.flush(&root)
    }

    async fn delete(&self, path: &str) -> Result<bool, StoreError> {
        let mut root = self.root.write().await;
        let deleted = tree::delete(&mut root, path)?;
        if deleted {
            self.flush(&root)?;
        }
        Ok(deleted)
    }

    async fn list(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let root = self.root.read().await;
        tree::list(&root, path)
    }
}
