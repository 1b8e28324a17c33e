//! # themis-core
//!
//! Heartbeat orchestration: the schedule gate, the per-case
//! evaluate-or-vote loop, and the local run state.
//!
//! ## Key Types
//!
//! - [`HeartbeatRunner`] - Runs one heartbeat cycle
//! - [`HeartbeatOptions`] - Flags for a cycle
//! - [`HeartbeatOutcome`] - How the cycle ended
//! - [`StateStore`] / [`RunState`] - Progress persisted between runs

mod context;
mod error;
mod outcome;
mod runner;
mod state;

pub use context::{CaseAction, CaseRecord, HeartbeatOptions, DEFAULT_INTERVAL};
pub use error::{CaseError, HeartbeatError};
pub use outcome::HeartbeatOutcome;
pub use runner::HeartbeatRunner;
pub use state::{RunState, StateError, StateStore, STATE_DIR_NAME, STATE_FILE_NAME};
