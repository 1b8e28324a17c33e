use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Structured log events for one heartbeat cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    HeartbeatNotDue {
        last_heartbeat: String,
        interval_secs: u64,
    },
    AccountInactive,
    AccountActive {
        total_votes: Option<u64>,
    },
    DocketFetched {
        total: usize,
        unseen: usize,
    },
    WouldJudge {
        case_id: String,
        title: String,
        bench: String,
    },
    HumanityIndex {
        index: Option<f64>,
        daily_delta: Option<f64>,
        hot_splits: usize,
    },
    HumanityIndexUnavailable {
        error: String,
    },
    EvaluatorSelected {
        evaluator: String,
    },
    CaseStarted {
        case_id: String,
        title: String,
        bench: String,
    },
    VerdictSubmitted {
        case_id: String,
        verdict: String,
        aggregate_score: Option<f64>,
    },
    VoteSubmitted {
        case_id: String,
        bench: String,
    },
    /// Left unprocessed without error; reconsidered next run
    CaseSkipped {
        case_id: String,
        title: String,
        reason: String,
    },
    CaseFailed {
        case_id: String,
        error: String,
    },
    HeartbeatCompleted {
        judged: usize,
        voted: usize,
        skipped: usize,
        failed: usize,
        duration_secs: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Info,
    Good,
    Warn,
    Bad,
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }

    /// Human-readable one-line description
    pub fn message(&self) -> String {
        match self {
            LogEvent::HeartbeatNotDue { last_heartbeat, .. } => format!(
                "Heartbeat not yet due (last run {}) — exiting. Use --force to override.",
                last_heartbeat
            ),
            LogEvent::AccountInactive => {
                "Agent key is not yet active. Retry after admin activation.".to_string()
            }
            LogEvent::AccountActive { total_votes } => format!(
                "Active. Verdicts: {}",
                total_votes.map_or_else(|| "?".to_string(), |v| v.to_string())
            ),
            LogEvent::DocketFetched { total, unseen } => {
                format!("Docket: {} case(s), {} unseen.", total, unseen)
            }
            LogEvent::WouldJudge { title, bench, .. } => {
                format!("Would judge: \"{}\" [{}]", title, bench)
            }
            LogEvent::HumanityIndex {
                index,
                daily_delta,
                hot_splits,
            } => {
                let index = index.map_or_else(|| "?".to_string(), |i| i.to_string());
                let delta = match daily_delta {
                    Some(d) if *d > 0.0 => format!(" (+{})", d),
                    Some(d) => format!(" ({})", d),
                    None => String::new(),
                };
                format!("Humanity Index: {}{}. Hot splits: {}.", index, delta, hot_splits)
            }
            LogEvent::HumanityIndexUnavailable { .. } => "Humanity index unavailable.".to_string(),
            LogEvent::EvaluatorSelected { evaluator } => format!("Evaluator: {}", evaluator),
            LogEvent::CaseStarted { title, bench, .. } => {
                format!("Evaluating: \"{}\" [{}]", title, bench)
            }
            LogEvent::VerdictSubmitted {
                verdict,
                aggregate_score,
                ..
            } => format!(
                "Verdict submitted ({}) → aggregate: {}",
                verdict,
                aggregate_score.map_or_else(|| "?".to_string(), |s| s.to_string())
            ),
            LogEvent::VoteSubmitted { bench, .. } => {
                format!("Voted agree on {} bench (vote-only mode).", bench)
            }
            LogEvent::CaseSkipped { title, reason, .. } => {
                format!("Skipping \"{}\" — {}.", title, reason)
            }
            LogEvent::CaseFailed { case_id, error } => format!("Failed for {}: {}", case_id, error),
            LogEvent::HeartbeatCompleted {
                judged,
                voted,
                skipped,
                failed,
                duration_secs,
            } => format!(
                "Heartbeat cycle complete: {} judged, {} voted, {} skipped, {} failed ({:.1}s).",
                judged, voted, skipped, failed, duration_secs
            ),
        }
    }

    fn tone(&self) -> Tone {
        match self {
            LogEvent::VerdictSubmitted { .. } | LogEvent::VoteSubmitted { .. } => Tone::Good,
            LogEvent::HeartbeatCompleted { failed, .. } if *failed == 0 => Tone::Good,
            LogEvent::HeartbeatCompleted { .. }
            | LogEvent::AccountInactive
            | LogEvent::HumanityIndexUnavailable { .. }
            | LogEvent::CaseSkipped { .. } => Tone::Warn,
            LogEvent::CaseFailed { .. } => Tone::Bad,
            _ => Tone::Info,
        }
    }

    /// Terse `tag:detail` rendering for compact logs
    fn compact(&self) -> String {
        match self {
            LogEvent::HeartbeatNotDue { interval_secs, .. } => {
                format!("gate:not-due interval={}s", interval_secs)
            }
            LogEvent::AccountInactive => "status:inactive".to_string(),
            LogEvent::AccountActive { total_votes } => {
                format!("status:active votes={}", total_votes.unwrap_or(0))
            }
            LogEvent::DocketFetched { total, unseen } => {
                format!("docket total={} unseen={}", total, unseen)
            }
            LogEvent::WouldJudge { case_id, bench, .. } => {
                format!("dry-run:{} {}", case_id, bench)
            }
            LogEvent::HumanityIndex {
                index, hot_splits, ..
            } => format!("hi:{} splits={}", index.unwrap_or(f64::NAN), hot_splits),
            LogEvent::HumanityIndexUnavailable { error } => format!("hi:unavailable {}", error),
            LogEvent::EvaluatorSelected { evaluator } => format!("evaluator:{}", evaluator),
            LogEvent::CaseStarted { case_id, bench, .. } => format!("case:{} {}", case_id, bench),
            LogEvent::VerdictSubmitted {
                case_id,
                aggregate_score,
                ..
            } => format!(
                "verdict:{} aggregate={}",
                case_id,
                aggregate_score.unwrap_or(f64::NAN)
            ),
            LogEvent::VoteSubmitted { case_id, bench } => format!("vote:{} {}", case_id, bench),
            LogEvent::CaseSkipped { case_id, .. } => format!("skip:{}", case_id),
            LogEvent::CaseFailed { case_id, error } => format!("fail:{} {}", case_id, error),
            LogEvent::HeartbeatCompleted {
                judged,
                voted,
                skipped,
                failed,
                duration_secs,
            } => format!(
                "done j={} v={} s={} f={} {:.1}s",
                judged, voted, skipped, failed, duration_secs
            ),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Timestamped, colored lines
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

/// Logger for heartbeat events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        let line = self.render(event);
        let _ = writeln!(std::io::stderr(), "{}", line);
    }

    /// Console rendering of an event in this logger's format
    pub fn render(&self, event: &LogEvent) -> String {
        match self.format {
            LogFormat::Json => event.with_timestamp().to_string(),
            LogFormat::Pretty => {
                let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
                let message = event.message();
                let styled = match event.tone() {
                    Tone::Info => message.normal(),
                    Tone::Good => message.bright_green(),
                    Tone::Warn => message.bright_yellow(),
                    Tone::Bad => message.bright_red(),
                };
                format!(
                    "{} {} {}",
                    format!("[{}]", timestamp).dimmed(),
                    "[Themis]".bright_blue().bold(),
                    styled
                )
            }
            LogFormat::Compact => {
                let timestamp = chrono::Utc::now().format("%H:%M:%S");
                format!("[{}] {}", timestamp, event.compact())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            LogEvent::DocketFetched { total: 3, unseen: 2 }.message(),
            "Docket: 3 case(s), 2 unseen."
        );
        assert_eq!(
            LogEvent::HumanityIndex {
                index: Some(61.0),
                daily_delta: Some(2.5),
                hot_splits: 4
            }
            .message(),
            "Humanity Index: 61 (+2.5). Hot splits: 4."
        );
        assert_eq!(
            LogEvent::AccountActive { total_votes: None }.message(),
            "Active. Verdicts: ?"
        );
    }

    #[test]
    fn test_json_format_tags_event() {
        colored::control::set_override(false);
        let logger = Logger::new(LogFormat::Json);
        let line = logger.render(&LogEvent::VoteSubmitted {
            case_id: "C".to_string(),
            bench: "ETHICS".to_string(),
        });
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["event"], "vote_submitted");
        assert_eq!(value["case_id"], "C");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_pretty_format_has_prefix() {
        colored::control::set_override(false);
        let line = Logger::new(LogFormat::Pretty).render(&LogEvent::AccountInactive);
        assert!(line.contains("[Themis] Agent key is not yet active."));
    }

    #[test]
    fn test_file_output_is_json_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("heartbeat.jsonl");
        let logger = Logger::with_file(LogFormat::Compact, &path).unwrap();

        logger.log(&LogEvent::EvaluatorSelected {
            evaluator: "openai".to_string(),
        });
        logger.log(&LogEvent::CaseFailed {
            case_id: "B".to_string(),
            error: "timeout".to_string(),
        });

        let content = std::fs::read_to_string(&path).unwrap();
        let events: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "evaluator_selected");
        assert_eq!(events[1]["error"], "timeout");
    }
}
