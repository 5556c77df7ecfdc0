//! Turn orchestration — the heart of TrialPilot.
//!
//! A turn follows a fixed cycle:
//!
//! 1. **Receive** a user message for a thread
//! 2. **Load** the thread's durable state
//! 3. **Route** the message to one of three capability profiles
//! 4. **Run** the capability's tool-calling loop against the model
//! 5. **Persist** the updated state and return the reply
//!
//! The loop continues until the model responds with text only; the only
//! bound on it is the turn's wall-clock timeout, which degrades the turn
//! to a fixed reply instead of an error.

pub mod capability;
pub mod loop_runner;
pub mod router;
pub mod turn;

pub use capability::{CapabilityKind, CapabilityProfile, CapabilitySet};
pub use loop_runner::CapabilityLoop;
pub use router::Router;
pub use turn::{FAILURE_REPLY, TIMEOUT_REPLY, TurnExecutor, TurnRequest};

#[cfg(test)]
pub(crate) mod test_helpers;
