//! Shared plumbing for the hosted chat-completion evaluators.

use serde_json::Value;
use tracing::debug;

use crate::AgentError;

/// Send a prepared JSON request and decode the JSON response body.
///
/// Non-2xx statuses become [`AgentError::Api`] carrying the response text.
pub(crate) async fn send_json(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<Value, AgentError> {
    let resp = request
        .send()
        .await
        .map_err(|source| AgentError::Http { provider, source })?;

    let status = resp.status();
    debug!(provider, status = status.as_u16(), "Hosted evaluator responded");

    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(AgentError::Api {
            provider,
            status: status.as_u16(),
            message,
        });
    }

    resp.json()
        .await
        .map_err(|source| AgentError::Http { provider, source })
}

/// Pull a string out of a response body by JSON pointer.
pub(crate) fn text_at(
    provider: &'static str,
    body: &Value,
    pointer: &str,
) -> Result<String, AgentError> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or(AgentError::MissingContent { provider })
}
