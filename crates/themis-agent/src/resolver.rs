//! Picks the judgment backend for a run.
//!
//! Local tooling wins over metered hosted calls:
//!
//! 1. `JUDGEHUMAN_EVAL_CMD` set: custom command
//! 2. `claude --version` succeeds: local Claude CLI
//! 3. `ANTHROPIC_API_KEY` set: Anthropic
//! 4. `OPENAI_API_KEY` set: OpenAI
//! 5. otherwise none, and the run falls back to vote-only

use async_trait::async_trait;
use tracing::debug;

use crate::{
    Agent, AgentError, AgentType, AnthropicAgent, ClaudeCliAgent, CustomCommandAgent, OpenAiAgent,
};

pub const EVAL_CMD_VAR: &str = "JUDGEHUMAN_EVAL_CMD";
pub const ANTHROPIC_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

/// Evaluator-related settings read from the environment
#[derive(Debug, Clone, Default)]
pub struct EvaluatorEnv {
    pub eval_cmd: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl EvaluatorEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            eval_cmd: get(EVAL_CMD_VAR),
            anthropic_api_key: get(ANTHROPIC_KEY_VAR),
            openai_api_key: get(OPENAI_KEY_VAR),
        }
    }
}

/// Outcome of evaluator resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorSelection {
    Agent(AgentType),
    /// Nothing usable on this host; vote-only mode
    Unavailable,
}

impl EvaluatorSelection {
    /// First matching backend in priority order.
    pub fn choose(env: &EvaluatorEnv, cli_available: bool) -> Self {
        if env.eval_cmd.is_some() {
            Self::Agent(AgentType::CustomCommand)
        } else if cli_available {
            Self::Agent(AgentType::ClaudeCli)
        } else if env.anthropic_api_key.is_some() {
            Self::Agent(AgentType::Anthropic)
        } else if env.openai_api_key.is_some() {
            Self::Agent(AgentType::OpenAi)
        } else {
            Self::Unavailable
        }
    }

    pub fn agent_type(&self) -> Option<AgentType> {
        match self {
            Self::Agent(ty) => Some(*ty),
            Self::Unavailable => None,
        }
    }
}

impl std::fmt::Display for EvaluatorSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agent(ty) => write!(f, "{}", ty),
            Self::Unavailable => write!(f, "none (vote-only mode)"),
        }
    }
}

/// The selection together with the backend ready to run
pub struct Resolution {
    pub selection: EvaluatorSelection,
    pub agent: Option<Box<dyn Agent>>,
}

impl Resolution {
    pub fn unavailable() -> Self {
        Self {
            selection: EvaluatorSelection::Unavailable,
            agent: None,
        }
    }

    pub fn with_agent(agent: Box<dyn Agent>) -> Self {
        Self {
            selection: EvaluatorSelection::Agent(agent.agent_type()),
            agent: Some(agent),
        }
    }
}

/// Resolves the evaluator once per run
#[async_trait]
pub trait EvaluatorResolver: Send + Sync {
    async fn resolve(&self) -> Result<Resolution, AgentError>;
}

/// Resolver backed by the process environment and a `claude --version` check
pub struct EnvResolver {
    env: EvaluatorEnv,
    cli: ClaudeCliAgent,
}

impl EnvResolver {
    pub fn new(env: EvaluatorEnv) -> Self {
        Self {
            env,
            cli: ClaudeCliAgent::new(),
        }
    }

    pub fn with_cli(mut self, cli: ClaudeCliAgent) -> Self {
        self.cli = cli;
        self
    }

    fn build(&self, selection: EvaluatorSelection) -> Result<Option<Box<dyn Agent>>, AgentError> {
        let agent: Box<dyn Agent> = match selection {
            EvaluatorSelection::Unavailable => return Ok(None),
            EvaluatorSelection::Agent(AgentType::CustomCommand) => {
                let cmd = self.env.eval_cmd.as_deref().unwrap_or_default();
                Box::new(CustomCommandAgent::parse(cmd)?)
            }
            EvaluatorSelection::Agent(AgentType::ClaudeCli) => Box::new(self.cli.clone()),
            EvaluatorSelection::Agent(AgentType::Anthropic) => Box::new(AnthropicAgent::new(
                self.env.anthropic_api_key.clone().unwrap_or_default(),
            )),
            EvaluatorSelection::Agent(AgentType::OpenAi) => Box::new(OpenAiAgent::new(
                self.env.openai_api_key.clone().unwrap_or_default(),
            )),
        };
        Ok(Some(agent))
    }
}

#[async_trait]
impl EvaluatorResolver for EnvResolver {
    async fn resolve(&self) -> Result<Resolution, AgentError> {
        // The version check spawns a process; skip it when the override already wins.
        let cli_available = self.env.eval_cmd.is_none() && self.cli.is_available().await;
        let selection = EvaluatorSelection::choose(&self.env, cli_available);

        debug!(%selection, cli_available, "Resolved evaluator");

        Ok(Resolution {
            selection,
            agent: self.build(selection)?,
        })
    }
}
