//! # trialpilot State
//!
//! `ThreadStore` implementations — durable, thread-keyed message history
//! plus checkpoint data, enabling multi-turn memory across process
//! restarts. An in-memory backend serves tests; the file backend persists
//! every save.

mod file_backend;
mod in_memory;

pub use file_backend::FileThreadStore;
pub use in_memory::InMemoryThreadStore;
