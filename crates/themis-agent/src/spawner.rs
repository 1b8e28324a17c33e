use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{AgentConfig, AgentError, AgentOutput};

/// Utility for spawning evaluator processes
pub struct ProcessSpawner;

impl ProcessSpawner {
    /// Run a prepared command to completion and capture its output.
    ///
    /// When `input` is given it is written to the child's stdin, which is then
    /// closed; otherwise stdin is null. The child is killed if `config.timeout`
    /// elapses first.
    pub async fn spawn(
        mut cmd: Command,
        input: Option<&str>,
        config: &AgentConfig,
    ) -> Result<AgentOutput, AgentError> {
        let start = Instant::now();

        debug!(
            program = ?cmd.as_std().get_program(),
            stdin_len = input.map(str::len).unwrap_or(0),
            timeout = ?config.timeout,
            "Spawning evaluator process"
        );

        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;

        if let Some(input) = input {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| AgentError::ExecutionFailed("stdin not captured".to_string()))?;
            let input = input.to_owned();
            // Written from a separate task so a child that fills its stdout
            // before draining stdin cannot deadlock us.
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    warn!(error = %e, "Failed to write prompt to evaluator stdin");
                }
            });
        }

        let wait = child.wait_with_output();
        let output = match config.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| AgentError::Timeout(limit))??,
            None => wait.await?,
        };

        let duration = start.elapsed();
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(
            exit_code,
            duration_ms = duration.as_millis(),
            "Evaluator process completed"
        );

        Ok(AgentOutput::new(
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
            duration,
        ))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[tokio::test]
    async fn test_pipes_input_to_stdin() {
        let output = ProcessSpawner::spawn(sh("cat"), Some("hello judge"), &AgentConfig::default())
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "hello judge");
    }

    #[tokio::test]
    async fn test_reports_nonzero_exit() {
        let output = ProcessSpawner::spawn(sh("echo nope >&2; exit 3"), None, &AgentConfig::default())
            .await
            .unwrap();
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stderr_summary(), Some("nope"));
    }

    #[tokio::test]
    async fn test_times_out() {
        let config = AgentConfig::default().with_timeout(Duration::from_millis(100));
        let err = ProcessSpawner::spawn(sh("sleep 5"), None, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let cmd = Command::new("/nonexistent/themis-evaluator");
        let err = ProcessSpawner::spawn(cmd, None, &AgentConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::SpawnFailed(_)));
    }
}
