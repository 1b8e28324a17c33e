//! # themis-docket
//!
//! Client and data model for the remote case service.
//!
//! ## Key Types
//!
//! - [`CaseService`] - The service operations the heartbeat consumes
//! - [`DocketClient`] - HTTP implementation of [`CaseService`]
//! - [`Case`], [`Docket`], [`Bench`] - What gets judged

mod client;
mod error;
mod types;

pub use client::{CaseService, DocketClient, DEFAULT_BASE_URL, USER_AGENT};
pub use error::ClientError;
pub use types::{
    AgentInfo, AgentStats, AgentStatus, AiVerdict, Bench, Case, Docket, HumanityIndex,
    VerdictReceipt,
};
