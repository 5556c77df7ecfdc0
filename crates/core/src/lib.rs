//! # trialpilot Core
//!
//! Domain types, traits, and error definitions for the trialpilot
//! clinical-trial orchestration layer. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod event;
pub mod message;
pub mod paths;
pub mod protocol;
pub mod provider;
pub mod store;
pub mod thread;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, MessageToolCall, Role, ThreadId};
pub use protocol::{Enrollment, PersonalizedProtocol, ProtocolStage, TrialProtocol};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use store::DocumentStore;
pub use thread::{ThreadState, ThreadStore};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
