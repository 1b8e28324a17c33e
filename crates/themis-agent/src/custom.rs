use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{Agent, AgentConfig, AgentError, AgentOutput, AgentType, ProcessSpawner};

/// User-configured evaluator command. Reads the prompt on stdin and writes
/// its verdict JSON to stdout.
#[derive(Debug, Clone)]
pub struct CustomCommandAgent {
    program: String,
    args: Vec<String>,
}

impl CustomCommandAgent {
    /// Build from a command line such as `ollama run llama3`. The line is
    /// split on whitespace; no shell quoting is interpreted.
    pub fn parse(command_line: &str) -> Result<Self, AgentError> {
        let mut parts = command_line.split_whitespace().map(String::from);
        let program = parts
            .next()
            .ok_or_else(|| AgentError::ConfigError("evaluator command is empty".to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl Agent for CustomCommandAgent {
    fn name(&self) -> &str {
        "Custom command"
    }

    fn agent_type(&self) -> AgentType {
        AgentType::CustomCommand
    }

    /// A configured command is trusted to exist; failures surface per case.
    async fn is_available(&self) -> bool {
        true
    }

    async fn execute(&self, prompt: &str, config: &AgentConfig) -> Result<AgentOutput, AgentError> {
        debug!(
            agent = self.name(),
            program = %self.program,
            prompt_len = prompt.len(),
            "Executing evaluator"
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        ProcessSpawner::spawn(cmd, Some(prompt), config).await
    }
}
