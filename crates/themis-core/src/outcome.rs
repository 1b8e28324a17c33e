use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::context::{CaseAction, CaseRecord};

/// How a heartbeat ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HeartbeatOutcome {
    /// Interval has not elapsed since the last run
    NotDue {
        last_heartbeat: DateTime<Utc>,
        next_due: Option<DateTime<Utc>>,
    },
    /// Agent key exists but is not active yet
    Inactive,
    /// Cases listed only
    DryRun { total: usize, unseen: Vec<String> },
    Completed {
        evaluator: String,
        cases: Vec<CaseRecord>,
        duration_secs: f64,
    },
}

impl HeartbeatOutcome {
    pub fn completed(evaluator: String, cases: Vec<CaseRecord>, duration: Duration) -> Self {
        Self::Completed {
            evaluator,
            cases,
            duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn cases(&self) -> &[CaseRecord] {
        match self {
            Self::Completed { cases, .. } => cases,
            _ => &[],
        }
    }

    pub fn judged(&self) -> usize {
        self.count(|a| matches!(a, CaseAction::Judged { .. }))
    }

    pub fn voted(&self) -> usize {
        self.count(|a| matches!(a, CaseAction::Voted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|a| matches!(a, CaseAction::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|a| matches!(a, CaseAction::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&CaseAction) -> bool) -> usize {
        self.cases().iter().filter(|r| pred(&r.action)).count()
    }

    /// True when the cycle ran to completion and state was saved
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tallies() {
        let outcome = HeartbeatOutcome::completed(
            "openai".to_string(),
            vec![
                CaseRecord::new("A", CaseAction::Judged {
                    verdict: "score 50 (1 reasons)".to_string(),
                    aggregate_score: Some(48.0),
                }),
                CaseRecord::new("B", CaseAction::Failed {
                    error: "boom".to_string(),
                }),
                CaseRecord::new("C", CaseAction::Judged {
                    verdict: "score 70 (3 reasons)".to_string(),
                    aggregate_score: None,
                }),
            ],
            Duration::from_millis(1500),
        );
        assert_eq!(outcome.judged(), 2);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.voted(), 0);
        assert!(outcome.is_completed());
    }

    #[test]
    fn test_early_exits_have_no_cases() {
        assert!(HeartbeatOutcome::Inactive.cases().is_empty());
        let json = serde_json::to_value(HeartbeatOutcome::Inactive).unwrap();
        assert_eq!(json, serde_json::json!({"status": "inactive"}));
    }
}
