//! Hosted evaluator tests against a wiremock server.

use serde_json::json;
use themis_agent::{Agent, AgentConfig, AgentError, AnthropicAgent, OpenAiAgent};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_anthropic_returns_first_text_block() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-haiku-4-5-20251001",
            "max_tokens": 600,
            "messages": [{"role": "user", "content": "judge it"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "{\"score\": 71}"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let agent = AnthropicAgent::with_base_url("sk-ant-test".to_string(), mock_server.uri());
    let output = agent
        .execute("judge it", &AgentConfig::default())
        .await
        .expect("anthropic call failed");

    assert!(output.success());
    assert_eq!(output.stdout, "{\"score\": 71}");
}

#[tokio::test]
async fn test_anthropic_error_status_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
        .mount(&mock_server)
        .await;

    let agent = AnthropicAgent::with_base_url("sk-ant-test".to_string(), mock_server.uri());
    let err = agent
        .execute("judge it", &AgentConfig::default())
        .await
        .unwrap_err();

    match err {
        AgentError::Api {
            provider,
            status,
            message,
        } => {
            assert_eq!(provider, "anthropic");
            assert_eq!(status, 529);
            assert_eq!(message, "overloaded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_openai_returns_message_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-oai-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 600
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"score\": 40}"}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let agent = OpenAiAgent::with_base_url("sk-oai-test".to_string(), mock_server.uri());
    let output = agent
        .execute("judge it", &AgentConfig::default())
        .await
        .expect("openai call failed");

    assert_eq!(output.stdout, "{\"score\": 40}");
}

#[tokio::test]
async fn test_openai_missing_content_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&mock_server)
        .await;

    let agent = OpenAiAgent::with_base_url("sk-oai-test".to_string(), mock_server.uri());
    let err = agent
        .execute("judge it", &AgentConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::MissingContent { provider: "openai" }));
}

#[tokio::test]
async fn test_model_override_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4.1", "max_tokens": 200})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "{}"}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let agent = OpenAiAgent::with_base_url("sk-oai-test".to_string(), mock_server.uri());
    let config = AgentConfig::default()
        .with_model("gpt-4.1".to_string())
        .with_max_tokens(200);
    agent.execute("judge it", &config).await.unwrap();
}
