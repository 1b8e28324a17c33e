use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::net::IpAddr;
use tracing::debug;

use crate::{AgentStatus, Bench, ClientError, Docket, HumanityIndex, VerdictReceipt};

/// Production origin of the case service
pub const DEFAULT_BASE_URL: &str = "https://www.judgehuman.ai";

pub const USER_AGENT: &str = concat!("themis/", env!("CARGO_PKG_VERSION"));

const STATUS_PATH: &str = "/api/agent/status";
const DOCKET_PATH: &str = "/api/docket";
const HUMANITY_INDEX_PATH: &str = "/api/agent/humanity-index";
const VERDICT_PATH: &str = "/api/agent/verdict";
const VOTE_PATH: &str = "/api/vote";

/// The remote case-management service
#[async_trait]
pub trait CaseService: Send + Sync {
    /// Account status (authenticated)
    async fn status(&self) -> Result<AgentStatus, ClientError>;

    /// Current docket (public)
    async fn docket(&self) -> Result<Docket, ClientError>;

    /// Informational metrics (authenticated)
    async fn humanity_index(&self) -> Result<HumanityIndex, ClientError>;

    /// Submit a verdict. `verdict` is forwarded field for field; the service
    /// validates its shape.
    async fn submit_verdict(
        &self,
        case_id: &str,
        verdict: &Map<String, Value>,
    ) -> Result<VerdictReceipt, ClientError>;

    /// Agree or disagree with the existing verdict on `bench`
    async fn vote(&self, case_id: &str, bench: Bench, agree: bool) -> Result<(), ClientError>;
}

/// HTTP client for the case service.
///
/// The API key is only ever attached to requests against `base_url`.
pub struct DocketClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for DocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocketClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DocketClient {
    /// The origin must be https, or plain http on a loopback host.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ClientError> {
        check_origin(base_url)?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and return the response once its status is 2xx.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        auth: bool,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .http
            .request(method.clone(), format!("{}{}", self.base_url, path));

        if auth {
            let key = self
                .api_key
                .as_deref()
                .ok_or_else(|| ClientError::MissingCredential {
                    path: path.to_string(),
                })?;
            request = request.bearer_auth(key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, auth, "Calling case service");

        let resp = request.send().await.map_err(|source| ClientError::Network {
            method: method.clone(),
            path: path.to_string(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| "failed".to_string());
            return Err(ClientError::Status {
                method,
                path: path.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, auth: bool) -> Result<T, ClientError> {
        let resp = self.send(Method::GET, path, None, auth).await?;
        resp.json().await.map_err(|source| ClientError::Decode {
            method: Method::GET,
            path: path.to_string(),
            source,
        })
    }
}

fn check_origin(base_url: &str) -> Result<(), ClientError> {
    let url = reqwest::Url::parse(base_url).map_err(|e| ClientError::InvalidOrigin {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "https" => Ok(()),
        "http" if url.host_str().is_some_and(is_loopback_host) => Ok(()),
        "http" => Err(ClientError::InsecureOrigin {
            url: base_url.to_string(),
        }),
        other => Err(ClientError::InvalidOrigin {
            url: base_url.to_string(),
            reason: format!("unsupported scheme {:?}", other),
        }),
    }
}

fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok_and(|ip| ip.is_loopback())
}

#[async_trait]
impl CaseService for DocketClient {
    async fn status(&self) -> Result<AgentStatus, ClientError> {
        self.get_json(STATUS_PATH, true).await
    }

    async fn docket(&self) -> Result<Docket, ClientError> {
        self.get_json(DOCKET_PATH, false).await
    }

    async fn humanity_index(&self) -> Result<HumanityIndex, ClientError> {
        self.get_json(HUMANITY_INDEX_PATH, true).await
    }

    async fn submit_verdict(
        &self,
        case_id: &str,
        verdict: &Map<String, Value>,
    ) -> Result<VerdictReceipt, ClientError> {
        let mut body = verdict.clone();
        body.insert("submissionId".to_string(), json!(case_id));
        let body = Value::Object(body);

        let resp = self.send(Method::POST, VERDICT_PATH, Some(&body), true).await?;
        resp.json().await.map_err(|source| ClientError::Decode {
            method: Method::POST,
            path: VERDICT_PATH.to_string(),
            source,
        })
    }

    async fn vote(&self, case_id: &str, bench: Bench, agree: bool) -> Result<(), ClientError> {
        let body = json!({
            "submissionId": case_id,
            "bench": bench,
            "agree": agree,
        });
        self.send(Method::POST, VOTE_PATH, Some(&body), true).await?;
        Ok(())
    }
}
