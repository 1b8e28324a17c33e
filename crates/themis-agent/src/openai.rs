use async_trait::async_trait;
use serde_json::json;
use std::time::Instant;
use tracing::debug;

use crate::hosted::{send_json, text_at};
use crate::{Agent, AgentConfig, AgentError, AgentOutput, AgentType};

pub const OPENAI_API_BASE: &str = "https://api.openai.com";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
const PROVIDER: &str = "openai";

/// OpenAI chat completions evaluator
pub struct OpenAiAgent {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiAgent {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, OPENAI_API_BASE.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Agent for OpenAiAgent {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn agent_type(&self) -> AgentType {
        AgentType::OpenAi
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn execute(&self, prompt: &str, config: &AgentConfig) -> Result<AgentOutput, AgentError> {
        let start = Instant::now();
        let model = config.model.as_deref().unwrap_or(OPENAI_DEFAULT_MODEL);

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
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);

        let response = send_json(PROVIDER, request).await?;
        let text = text_at(PROVIDER, &response, "/choices/0/message/content")?;

        Ok(AgentOutput::from_text(text, start.elapsed()))
    }
}
