use thiserror::Error;
use themis_docket::ClientError;
use themis_judge::JudgeError;

use crate::state::StateError;

/// Errors that abort a heartbeat. State is left as last saved.
#[derive(Error, Debug)]
pub enum HeartbeatError {
    #[error("Case service error: {0}")]
    Client(#[from] ClientError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Evaluator error: {0}")]
    Agent(#[from] themis_agent::AgentError),
}

/// Errors confined to a single case; the loop logs them and moves on
#[derive(Error, Debug)]
pub enum CaseError {
    #[error(transparent)]
    Judge(#[from] JudgeError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
