//! File-based thread store — persistent JSON-lines storage.
//!
//! Each line is one JSON-encoded thread record `{thread_id, state}`.
//! Records are loaded into memory on creation and the file is rewritten
//! on every save, so the latest state of every thread survives restarts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use trialpilot_core::error::StateError;
use trialpilot_core::message::ThreadId;
use trialpilot_core::thread::{ThreadState, ThreadStore};

#[derive(Serialize, Deserialize)]
struct ThreadRecord {
    thread_id: String,
    state: ThreadState,
}

/// A file-backed thread store using JSONL (one thread record per line).
pub struct FileThreadStore {
    path: PathBuf,
    threads: Arc<RwLock<HashMap<ThreadId, ThreadState>>>,
}

impl FileThreadStore {
    /// Create a new file-based thread store at the given path.
    pub fn new(path: PathBuf) -> Self {
        let threads = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = threads.len(), "File thread store loaded");
        Self {
            path,
            threads: Arc::new(RwLock::new(threads)),
        }
    }

    /// Default path: `~/.trialpilot/state/threads.jsonl`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".trialpilot")
            .join("state")
            .join("threads.jsonl")
    }

    fn load_from_disk(path: &PathBuf) -> HashMap<ThreadId, ThreadState> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return HashMap::new(),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<ThreadRecord>(line) {
                Ok(record) => Some((ThreadId(record.thread_id), record.state)),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted thread record");
                    None
                }
            })
            .collect()
    }

    /// Flush all threads to disk as JSONL. Called with the write lock held.
    fn flush(&self, threads: &HashMap<ThreadId, ThreadState>) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StateError::Storage(format!("Failed to create state directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for (id, state) in threads {
            let record = ThreadRecord {
                thread_id: id.0.clone(),
                state: state.clone(),
            };
            let line = serde_json::to_string(&record).map_err(|e| {
                StateError::Storage(format!("Failed to serialize thread record: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| StateError::Storage(format!("Failed to write thread file: {e}")))
    }
}

#[async_trait]
impl ThreadStore for FileThreadStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, thread_id: &ThreadId) -> Result<ThreadState, StateError> {
        let threads = self.threads.read().await;
        Ok(threads.get(thread_id).cloned().unwrap_or_default())
    }

    async fn save(&self, thread_id: &ThreadId, state: &ThreadState) -> Result<(), StateError> {
        let mut threads = self.threads.write().await;
        threads.insert(thread_id.clone(), state.clone());
        self.flush(&threads)
    }
}
