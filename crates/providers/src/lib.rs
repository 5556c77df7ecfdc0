//! Completion-model providers for TrialPilot.
//!
//! One implementation: any OpenAI-compatible `/v1/chat/completions`
//! endpoint. The rest of the system talks to the model through the
//! `Provider` trait in `trialpilot-core`, so swapping in a different
//! backend means implementing one trait.

mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
