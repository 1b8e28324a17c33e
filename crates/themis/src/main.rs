use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use themis_agent::{AgentConfig, EnvResolver};
use themis_core::{HeartbeatOptions, HeartbeatOutcome, HeartbeatRunner, StateStore};
use themis_docket::DocketClient;
use themis_logging::{init_tracing, LogFormat, Logger};

mod config;

use config::{FileConfig, Settings, API_KEY_VAR};

/// Exit code when writes are requested without an API key
const EXIT_MISSING_CREDENTIAL: i32 = 2;

const ENV_HELP: &str = "\
Environment:
  JUDGEHUMAN_API_KEY             Agent key (required unless --dry-run)
  JUDGEHUMAN_EVAL_CMD            Custom evaluator command; prompt on stdin, JSON on stdout
  JUDGEHUMAN_HEARTBEAT_INTERVAL  Seconds between heartbeats (default 3600)
  JUDGEHUMAN_BASE_URL            Service origin (https, or http on loopback)
  ANTHROPIC_API_KEY              Use Anthropic when no CLI evaluator is found
  OPENAI_API_KEY                 Use OpenAI as the last fallback

Config file: ~/.judgehuman/config.toml";

#[derive(Parser, Debug)]
#[command(
    name = "themis",
    about = "Scheduled heartbeat agent that judges JudgeHuman cases",
    version,
    after_help = ENV_HELP
)]
struct Cli {
    /// List unseen cases without judging, voting, or saving state
    #[arg(long)]
    dry_run: bool,

    /// Run even if the heartbeat interval has not elapsed
    #[arg(long)]
    force: bool,

    /// Vote agree on existing AI verdicts instead of evaluating
    #[arg(long)]
    vote_only: bool,

    /// Model override for the evaluator backend
    #[arg(short, long)]
    model: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Also append JSON-lines events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the outcome as JSON on stdout
    #[arg(long)]
    json_output: bool,

    /// State file (default: ~/.judgehuman/state.json)
    #[arg(long)]
    state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    let file_config = match FileConfig::default_path() {
        Some(path) => FileConfig::load(&path)?,
        None => None,
    };
    let settings = Settings::resolve(
        file_config,
        |name| std::env::var(name).ok(),
        cli.state_file.clone(),
    )?;

    // Checked before any network call.
    if let Some(code) = credential_exit_code(&settings, cli.dry_run) {
        eprintln!(
            "{} {} is not set. Register an agent key at https://www.judgehuman.ai and export it.",
            "error:".bright_red().bold(),
            API_KEY_VAR
        );
        std::process::exit(code);
    }

    let logger = match &cli.log_file {
        Some(path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    let store = match &settings.state_file {
        Some(path) => StateStore::with_path(path.clone()),
        None => StateStore::new().context("Failed to locate state file")?,
    };

    let client = DocketClient::new(&settings.base_url, settings.api_key.clone())
        .context("Failed to create case service client")?;
    let resolver = EnvResolver::new(settings.evaluator.clone());

    let mut agent_config = AgentConfig::default();
    if let Some(model) = cli.model.clone() {
        agent_config = agent_config.with_model(model);
    }

    let options = HeartbeatOptions {
        dry_run: cli.dry_run,
        force: cli.force,
        vote_only: cli.vote_only,
        interval: settings.interval,
        agent_config,
    };

    let runner = HeartbeatRunner::new(&client, &resolver, &store, Arc::new(logger));
    let outcome = runner.run(&options).await.context("Heartbeat failed")?;

    if cli.json_output {
        let json = serde_json::to_string_pretty(&outcome)?;
        println!("{}", json);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

/// Exit code to stop with before any network call, if the run cannot
/// proceed. Dry runs never write, so they need no key.
fn credential_exit_code(settings: &Settings, dry_run: bool) -> Option<i32> {
    (settings.api_key.is_none() && !dry_run).then_some(EXIT_MISSING_CREDENTIAL)
}

fn print_outcome(outcome: &HeartbeatOutcome) {
    match outcome {
        HeartbeatOutcome::NotDue { next_due, .. } => {
            if let Some(next) = next_due {
                eprintln!("Next heartbeat due at {}", next.to_rfc3339());
            }
        }
        HeartbeatOutcome::Inactive => {}
        HeartbeatOutcome::DryRun { total, unseen } => {
            eprintln!();
            eprintln!("=== DRY RUN ===");
            eprintln!("{} case(s) on the docket, {} unseen", total, unseen.len());
            for id in unseen {
                eprintln!("  {}", id);
            }
        }
        HeartbeatOutcome::Completed {
            evaluator,
            duration_secs,
            ..
        } => {
            eprintln!();
            eprintln!("=== HEARTBEAT COMPLETE ===");
            eprintln!("Evaluator: {}", evaluator);
            eprintln!(
                "Judged: {}  Voted: {}  Skipped: {}  Failed: {}",
                outcome.judged(),
                outcome.voted(),
                outcome.skipped(),
                outcome.failed()
            );
            eprintln!("Duration: {:.1}s", duration_secs);
        }
    }
}
