mod anthropic;
mod claude;
mod custom;
mod hosted;
mod openai;
mod output;
pub mod resolver;
mod spawner;
mod traits;

pub use anthropic::{AnthropicAgent, ANTHROPIC_API_BASE, ANTHROPIC_DEFAULT_MODEL};
pub use claude::{ClaudeCliAgent, SUPERVISION_MARKER};
pub use custom::CustomCommandAgent;
pub use openai::{OpenAiAgent, OPENAI_API_BASE, OPENAI_DEFAULT_MODEL};
pub use output::AgentOutput;
pub use resolver::{EnvResolver, EvaluatorEnv, EvaluatorResolver, EvaluatorSelection, Resolution};
pub use spawner::ProcessSpawner;
pub use traits::{Agent, AgentConfig, AgentError, AgentType, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT};
