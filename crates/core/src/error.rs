//! Error types for the trialpilot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all trialpilot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Document store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Conversation state errors ---
    #[error("State error: {0}")]
    State(#[from] StateError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Type mismatch at {path}: expected {expected}")]
    TypeMismatch { path: String, expected: String },
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupted thread state for '{thread_id}': {reason}")]
    Corrupted { thread_id: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::ExecutionFailed {
            tool_name: "update_patient_emr".into(),
            reason: "store unavailable".into(),
        });
        assert!(err.to_string().contains("update_patient_emr"));
        assert!(err.to_string().contains("store unavailable"));
    }

    #[test]
    fn store_error_type_mismatch() {
        let err = StoreError::TypeMismatch {
            path: "emr_records/p1/log".into(),
            expected: "array".into(),
        };
        assert!(err.to_string().contains("emr_records/p1/log"));
        assert!(err.to_string().contains("array"));
    }
}
