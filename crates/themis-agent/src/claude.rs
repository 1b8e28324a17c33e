use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::{Agent, AgentConfig, AgentError, AgentOutput, AgentType, ProcessSpawner};

/// Environment marker set by an enclosing Claude Code session. The CLI
/// refuses to start nested sessions while it is present.
pub const SUPERVISION_MARKER: &str = "CLAUDECODE";

const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Local `claude` CLI evaluator, run single-shot with JSON output
#[derive(Debug, Clone)]
pub struct ClaudeCliAgent {
    binary_path: PathBuf,
}

impl ClaudeCliAgent {
    pub fn new() -> Self {
        Self {
            binary_path: PathBuf::from("claude"),
        }
    }

    pub fn with_binary_path(path: PathBuf) -> Self {
        Self { binary_path: path }
    }

    /// Base command with the supervision marker stripped. Every other
    /// variable is inherited.
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.env_remove(SUPERVISION_MARKER);
        cmd
    }
}

impl Default for ClaudeCliAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ClaudeCliAgent {
    fn name(&self) -> &str {
        "Claude CLI"
    }

    fn agent_type(&self) -> AgentType {
        AgentType::ClaudeCli
    }

    async fn is_available(&self) -> bool {
        let mut cmd = self.command();
        cmd.arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(VERSION_CHECK_TIMEOUT, cmd.status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                debug!(error = %e, "claude --version failed");
                false
            }
            Err(_) => {
                debug!("claude --version timed out");
                false
            }
        }
    }

    async fn execute(&self, prompt: &str, config: &AgentConfig) -> Result<AgentOutput, AgentError> {
        debug!(
            agent = self.name(),
            prompt_len = prompt.len(),
            "Executing evaluator"
        );

        let mut cmd = self.command();
        cmd.arg("-p")
            .arg(prompt)
            .arg("--output-format")
            .arg("json");

        if let Some(ref model) = config.model {
            cmd.arg("--model").arg(model);
        }

        ProcessSpawner::spawn(cmd, None, config).await
    }
}
