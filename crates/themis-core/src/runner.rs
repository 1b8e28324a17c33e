use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use themis_agent::{Agent, AgentConfig, EvaluatorResolver, Resolution};
use themis_docket::{Case, CaseService};
use themis_judge::JudgeEvaluator;
use themis_logging::{LogEvent, Logger};

use crate::context::{CaseAction, CaseRecord, HeartbeatOptions};
use crate::error::{CaseError, HeartbeatError};
use crate::outcome::HeartbeatOutcome;
use crate::state::{RunState, StateStore};

const NO_AI_VERDICT: &str = "no evaluator and no AI verdict to vote on";

/// Orchestrates one heartbeat: gate, status, docket, evaluate, persist
pub struct HeartbeatRunner<'a> {
    service: &'a dyn CaseService,
    resolver: &'a dyn EvaluatorResolver,
    store: &'a StateStore,
    logger: Arc<Logger>,
}

impl<'a> HeartbeatRunner<'a> {
    pub fn new(
        service: &'a dyn CaseService,
        resolver: &'a dyn EvaluatorResolver,
        store: &'a StateStore,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            service,
            resolver,
            store,
            logger,
        }
    }

    /// Run one heartbeat cycle.
    ///
    /// Errors outside the per-case loop are fatal and leave the state file
    /// untouched. Per-case errors are logged and the case stays unseen.
    pub async fn run(&self, options: &HeartbeatOptions) -> Result<HeartbeatOutcome, HeartbeatError> {
        let started = Instant::now();
        let mut state = self.store.load();

        if !options.dry_run && !state.is_due(Utc::now(), options.interval, options.force) {
            if let Some(last) = state.last_heartbeat {
                self.logger.log(&LogEvent::HeartbeatNotDue {
                    last_heartbeat: last.to_rfc3339(),
                    interval_secs: options.interval.as_secs(),
                });
                return Ok(HeartbeatOutcome::NotDue {
                    last_heartbeat: last,
                    next_due: state.next_due(options.interval),
                });
            }
        }

        if !options.dry_run {
            let status = self.service.status().await?;
            if !status.is_active() {
                self.logger.log(&LogEvent::AccountInactive);
                return Ok(HeartbeatOutcome::Inactive);
            }
            self.logger.log(&LogEvent::AccountActive {
                total_votes: status.total_votes(),
            });
        }

        let docket = self.service.docket().await?;
        let total = docket.cases().len();
        let unseen = docket.unseen(|id| state.is_judged(id));
        self.logger.log(&LogEvent::DocketFetched {
            total,
            unseen: unseen.len(),
        });

        if options.dry_run {
            for case in &unseen {
                self.logger.log(&LogEvent::WouldJudge {
                    case_id: case.id.clone(),
                    title: case.title.clone(),
                    bench: case.bench().to_string(),
                });
            }
            return Ok(HeartbeatOutcome::DryRun {
                total,
                unseen: unseen.into_iter().map(|c| c.id).collect(),
            });
        }

        self.log_humanity_index().await;

        let resolution = if options.vote_only {
            debug!("Vote-only requested, skipping evaluator resolution");
            Resolution::unavailable()
        } else {
            self.resolver.resolve().await?
        };
        let evaluator = resolution.selection.to_string();
        self.logger.log(&LogEvent::EvaluatorSelected {
            evaluator: evaluator.clone(),
        });

        let mut records = Vec::with_capacity(unseen.len());
        for case in &unseen {
            let record = self
                .process_case(case, resolution.agent.as_deref(), &options.agent_config, &mut state)
                .await;
            records.push(record);
        }

        state.last_heartbeat = Some(Utc::now());
        self.store.save(&state)?;

        let outcome = HeartbeatOutcome::completed(evaluator, records, started.elapsed());
        self.logger.log(&LogEvent::HeartbeatCompleted {
            judged: outcome.judged(),
            voted: outcome.voted(),
            skipped: outcome.skipped(),
            failed: outcome.failed(),
            duration_secs: started.elapsed().as_secs_f64(),
        });
        Ok(outcome)
    }

    /// Informational only; failures never abort the cycle.
    async fn log_humanity_index(&self) {
        match self.service.humanity_index().await {
            Ok(hi) => self.logger.log(&LogEvent::HumanityIndex {
                index: hi.humanity_index,
                daily_delta: hi.daily_delta,
                hot_splits: hi.hot_split_count(),
            }),
            Err(e) => {
                debug!(error = %e, "Humanity index request failed");
                self.logger.log(&LogEvent::HumanityIndexUnavailable {
                    error: e.to_string(),
                });
            }
        }
    }

    async fn process_case(
        &self,
        case: &Case,
        agent: Option<&dyn Agent>,
        config: &AgentConfig,
        state: &mut RunState,
    ) -> CaseRecord {
        let bench = case.bench();
        self.logger.log(&LogEvent::CaseStarted {
            case_id: case.id.clone(),
            title: case.title.clone(),
            bench: bench.to_string(),
        });

        let action = match self.handle_case(case, agent, config).await {
            Ok(action) => action,
            Err(e) => {
                debug!(case_id = %case.id, error = %e, "Case failed");
                self.logger.log(&LogEvent::CaseFailed {
                    case_id: case.id.clone(),
                    error: e.to_string(),
                });
                CaseAction::Failed {
                    error: e.to_string(),
                }
            }
        };

        let record = CaseRecord::new(case.id.clone(), action);
        if record.is_processed() {
            state.mark_judged(&case.id);
        }
        record
    }

    async fn handle_case(
        &self,
        case: &Case,
        agent: Option<&dyn Agent>,
        config: &AgentConfig,
    ) -> Result<CaseAction, CaseError> {
        let bench = case.bench();

        let Some(agent) = agent else {
            if !case.has_ai_verdict() {
                self.logger.log(&LogEvent::CaseSkipped {
                    case_id: case.id.clone(),
                    title: case.title.clone(),
                    reason: NO_AI_VERDICT.to_string(),
                });
                return Ok(CaseAction::Skipped {
                    reason: NO_AI_VERDICT.to_string(),
                });
            }

            self.service.vote(&case.id, bench, true).await?;
            self.logger.log(&LogEvent::VoteSubmitted {
                case_id: case.id.clone(),
                bench: bench.to_string(),
            });
            return Ok(CaseAction::Voted {
                bench: bench.to_string(),
            });
        };

        let verdict = JudgeEvaluator::new(agent).evaluate(case, config).await?;
        let receipt = self
            .service
            .submit_verdict(&case.id, verdict.fields())
            .await?;

        info!(case_id = %case.id, score = ?verdict.score(), "Verdict accepted");
        self.logger.log(&LogEvent::VerdictSubmitted {
            case_id: case.id.clone(),
            verdict: verdict.short_description(),
            aggregate_score: receipt.aggregate_score,
        });
        Ok(CaseAction::Judged {
            verdict: verdict.short_description(),
            aggregate_score: receipt.aggregate_score,
        })
    }
}
