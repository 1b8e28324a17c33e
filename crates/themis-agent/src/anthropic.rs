use async_trait::async_trait;
use serde_json::json;
use std::time::Instant;
use tracing::debug;

use crate::hosted::{send_json, text_at};
use crate::{Agent, AgentConfig, AgentError, AgentOutput, AgentType};

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "anthropic";

/// Anthropic Messages API evaluator
pub struct AnthropicAgent {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicAgent {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, ANTHROPIC_API_BASE.to_string())
    }

    /// Point at a different API origin (proxies, tests)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Agent for AnthropicAgent {
    fn name(&self) -> &str {
        "Anthropic"
    }

    fn agent_type(&self) -> AgentType {
        AgentType::Anthropic
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn execute(&self, prompt: &str, config: &AgentConfig) -> Result<AgentOutput, AgentError> {
        let start = Instant::now();
        let model = config.model.as_deref().unwrap_or(ANTHROPIC_DEFAULT_MODEL);

        debug!(
            agent = self.name(),
            model,
            prompt_len = prompt.len(),
            "Executing evaluator"
        );

        let body = json!({
            "model": model,
            "max_tokens": config.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let request = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let response = send_json(PROVIDER, request).await?;
        let text = text_at(PROVIDER, &response, "/content/0/text")?;

        Ok(AgentOutput::from_text(text, start.elapsed()))
    }
}
