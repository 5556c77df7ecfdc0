//! # trialpilot Store
//!
//! `DocumentStore` implementations: an in-memory JSON tree for tests and
//! ephemeral sessions, and a single-file JSON tree with flush-on-mutation
//! durability. Both share the same path-navigation rules.

mod file_backend;
mod in_memory;
mod tree;

pub use file_backend::FileStore;
pub use in_memory::InMemoryStore;
