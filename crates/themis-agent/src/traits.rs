use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::AgentOutput;

/// Default wall-clock cap for subprocess evaluators
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default response length cap for hosted evaluators
pub const DEFAULT_MAX_TOKENS: u32 = 600;

/// Errors that can occur while running an evaluator
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to spawn evaluator process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Evaluator timed out after {0:?}")]
    Timeout(Duration),

    #[error("Evaluator configuration error: {0}")]
    ConfigError(String),

    #[error("Evaluator execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Request to {provider} failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error (status {status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} response missing text content")]
    MissingContent { provider: &'static str },
}

/// Per-invocation settings shared by every evaluator
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Wall-clock cap for subprocess evaluators (None = no limit)
    pub timeout: Option<Duration>,
    /// Response length cap for hosted evaluators
    pub max_tokens: u32,
    /// Model override (if the evaluator supports it)
    pub model: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            max_tokens: DEFAULT_MAX_TOKENS,
            model: None,
        }
    }
}

impl AgentConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Supported evaluator backends, in resolution priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentType {
    CustomCommand,
    ClaudeCli,
    Anthropic,
    OpenAi,
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentType::CustomCommand => write!(f, "custom"),
            AgentType::ClaudeCli => write!(f, "claude-cli"),
            AgentType::Anthropic => write!(f, "anthropic"),
            AgentType::OpenAi => write!(f, "openai"),
        }
    }
}

/// A judgment backend: turns a prompt into raw model output
#[async_trait]
pub trait Agent: Send + Sync {
    /// Human-readable name of the evaluator (e.g., "Claude CLI", "OpenAI")
    fn name(&self) -> &str;

    /// The evaluator type
    fn agent_type(&self) -> AgentType;

    /// Run the prompt through the backend once. No retries.
    async fn execute(&self, prompt: &str, config: &AgentConfig) -> Result<AgentOutput, AgentError>;

    /// Check if the backend can be used on this host
    async fn is_available(&self) -> bool;
}
