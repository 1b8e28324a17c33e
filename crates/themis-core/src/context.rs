use serde::{Deserialize, Serialize};
use std::time::Duration;
use themis_agent::AgentConfig;

/// Minimum time between unforced heartbeats
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3600);

/// Options for a single heartbeat invocation
#[derive(Debug, Clone)]
pub struct HeartbeatOptions {
    /// List unseen cases without any status check, write, or state save
    pub dry_run: bool,
    /// Run even if the interval has not elapsed
    pub force: bool,
    /// Vote on cases instead of evaluating them
    pub vote_only: bool,
    pub interval: Duration,
    /// Passed to the evaluator backend for every case
    pub agent_config: AgentConfig,
}

impl Default for HeartbeatOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            force: false,
            vote_only: false,
            interval: DEFAULT_INTERVAL,
            agent_config: AgentConfig::default(),
        }
    }
}

impl HeartbeatOptions {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_agent_config(mut self, config: AgentConfig) -> Self {
        self.agent_config = config;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn vote_only(mut self) -> Self {
        self.vote_only = true;
        self
    }
}

/// What happened to one case during a heartbeat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: String,
    #[serde(flatten)]
    pub action: CaseAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CaseAction {
    /// Verdict submitted
    Judged {
        verdict: String,
        aggregate_score: Option<f64>,
    },
    /// Agreement vote submitted on the case's bench
    Voted { bench: String },
    /// Left for a later run
    Skipped { reason: String },
    Failed { error: String },
}

impl CaseRecord {
    pub fn new(case_id: impl Into<String>, action: CaseAction) -> Self {
        Self {
            case_id: case_id.into(),
            action,
        }
    }

    /// Whether the case now counts as processed
    pub fn is_processed(&self) -> bool {
        matches!(
            self.action,
            CaseAction::Judged { .. } | CaseAction::Voted { .. }
        )
    }
}
