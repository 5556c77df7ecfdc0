//! DocumentStore trait — the abstraction over the hierarchical
//! patient/trial data store.
//!
//! The store is path-addressed JSON: `users/p1`, `emr_records/p1/log`,
//! `clinicalTrials/t1/stages/2/summary`. There are no transactions across
//! paths; `set` and `append` are atomic for a single path only, which is
//! exactly what the EMR-log append and checklist-bit set rely on.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// The core DocumentStore trait.
///
/// Implementations: in-memory (tests/ephemeral), single-file JSON tree.
/// The production document service sits behind the same contract.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The backend name (e.g., "in_memory", "file").
    fn name(&self) -> &str;

    /// Read the value at `path`. `None` if the path does not exist.
    async fn get(&self, path: &str) -> std::result::Result<Option<Value>, StoreError>;

    /// Replace the value at `path`, creating intermediate objects as needed.
    /// Atomic for the single path.
    async fn set(&self, path: &str, value: Value) -> std::result::Result<(), StoreError>;

    /// Append `value` to the array at `path`, creating the array if the
    /// path is absent. Atomic for the single path; fails with a type
    /// mismatch if the path holds a non-array.
    async fn append(&self, path: &str, value: Value) -> std::result::Result<(), StoreError>;

    /// Delete the value at `path`. Returns whether anything was removed.
    async fn delete(&self, path: &str) -> std::result::Result<bool, StoreError>;

    /// List the child keys of the object at `path`, sorted. Empty if the
    /// path is absent or holds a non-object.
    async fn list(&self, path: &str) -> std::result::Result<Vec<String>, StoreError>;
}
