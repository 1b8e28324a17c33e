//! Integration tests for DocketClient.
//!
//! Uses wiremock for HTTP mocking. Covers auth header placement, status
//! error mapping, verdict body shape and vote body shape.

use serde_json::{json, Map, Value};
use themis_docket::{Bench, CaseService, ClientError, DocketClient};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn create_test_client(mock_server: &MockServer) -> DocketClient {
    DocketClient::new(&mock_server.uri(), Some("jh_agent_test".to_string()))
        .expect("failed to create client")
}

#[tokio::test]
async fn test_status_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/agent/status"))
        .and(header("authorization", "Bearer jh_agent_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "agent": {"isActive": true},
            "stats": {"totalVotes": 42}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let status = create_test_client(&mock_server).status().await.unwrap();
    assert!(status.is_active());
    assert_eq!(status.total_votes(), Some(42));
}

#[tokio::test]
async fn test_docket_is_unauthenticated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/docket"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "caseOfDay": {"id": "A", "title": "Case A", "exhibit": "...", "bench": "ethics"},
            "docket": [{"id": "A"}, {"id": "B", "bench": "HYPE"}]
        })))
        .mount(&mock_server)
        .await;

    let docket = create_test_client(&mock_server).docket().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));

    let cases = docket.cases();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].bench(), Bench::Ethics);
    assert_eq!(cases[1].bench(), Bench::Hype);
}

#[tokio::test]
async fn test_error_status_carries_service_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/agent/status"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid key"})))
        .mount(&mock_server)
        .await;

    let err = create_test_client(&mock_server).status().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "GET /api/agent/status → 401: invalid key");
}

#[tokio::test]
async fn test_error_status_without_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/docket"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&mock_server)
        .await;

    let err = create_test_client(&mock_server).docket().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Status { status: 502, ref message, .. } if message == "failed"
    ));
}

#[tokio::test]
async fn test_missing_key_fails_before_request() {
    let mock_server = MockServer::start().await;
    let client = DocketClient::new(&mock_server.uri(), None).unwrap();

    let err = client.humanity_index().await.unwrap_err();
    assert!(matches!(err, ClientError::MissingCredential { .. }));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_humanity_index_decodes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/agent/humanity-index"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "humanityIndex": 61.5,
            "dailyDelta": -1.2,
            "hotSplits": [{"id": "x"}, {"id": "y"}]
        })))
        .mount(&mock_server)
        .await;

    let hi = create_test_client(&mock_server).humanity_index().await.unwrap();
    assert_eq!(hi.humanity_index, Some(61.5));
    assert_eq!(hi.daily_delta, Some(-1.2));
    assert_eq!(hi.hot_split_count(), 2);
}

#[tokio::test]
async fn test_submit_verdict_forwards_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/agent/verdict"))
        .and(header("authorization", "Bearer jh_agent_test"))
        .and(body_json(json!({
            "submissionId": "case-1",
            "benchScores": {"ETHICS": 7},
            "score": 70,
            "reasoning": ["fair"],
            "extra": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"aggregateScore": 68})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let verdict: Map<String, Value> = serde_json::from_value(json!({
        "benchScores": {"ETHICS": 7},
        "score": 70,
        "reasoning": ["fair"],
        "extra": true
    }))
    .unwrap();

    let receipt = create_test_client(&mock_server)
        .submit_verdict("case-1", &verdict)
        .await
        .unwrap();
    assert_eq!(receipt.aggregate_score, Some(68.0));
}

#[tokio::test]
async fn test_submission_id_cannot_be_overridden_by_verdict() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/agent/verdict"))
        .respond_with(|req: &Request| {
            let body: Value = serde_json::from_slice(&req.body).unwrap();
            ResponseTemplate::new(200).set_body_json(json!({
                "aggregateScore": if body["submissionId"] == "real" { 1 } else { 0 }
            }))
        })
        .mount(&mock_server)
        .await;

    let verdict: Map<String, Value> =
        serde_json::from_value(json!({"submissionId": "spoofed", "score": 5})).unwrap();
    let receipt = create_test_client(&mock_server)
        .submit_verdict("real", &verdict)
        .await
        .unwrap();
    assert_eq!(receipt.aggregate_score, Some(1.0));
}

#[tokio::test]
async fn test_vote_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/vote"))
        .and(body_json(json!({"submissionId": "C", "bench": "HYPE", "agree": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    create_test_client(&mock_server)
        .vote("C", Bench::Hype, true)
        .await
        .unwrap();
}
