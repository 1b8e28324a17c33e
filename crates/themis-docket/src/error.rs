use thiserror::Error;

/// Errors talking to the case service
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("{method} {path} failed: {source}")]
    Network {
        method: reqwest::Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {path} → {status}: {message}")]
    Status {
        method: reqwest::Method,
        path: String,
        status: u16,
        message: String,
    },

    #[error("{method} {path}: invalid response body: {source}")]
    Decode {
        method: reqwest::Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} requires an API key")]
    MissingCredential { path: String },

    #[error("Refusing insecure service origin {url}: use https (plain http only for loopback)")]
    InsecureOrigin { url: String },

    #[error("Invalid service origin {url}: {reason}")]
    InvalidOrigin { url: String, reason: String },
}

impl ClientError {
    /// HTTP status for service-side rejections
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
