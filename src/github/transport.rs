use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;

const ACCEPT_HEADER: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the Git hosting API, already mapped to their retry semantics.
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("GitHub authorization failed. Check your PAT permissions.")]
    Auth,

    #[error("GitHub API rate limit reached. Please retry shortly.")]
    RateLimit,

    #[error("GitHub conflict on branch update. Please retry.")]
    Conflict,

    #[error("GitHub request timed out. Please retry.")]
    Timeout,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("Unexpected GitHub API response: {0}")]
    Decode(String),
}

impl GithubError {
    /// Map a non-2xx host response. 401/403 are split on rate-limit wording,
    /// 409 is the branch-ref conflict, 408/504 and 429 are retryable.
    pub fn from_status(status: u16, payload: &Value) -> Self {
        let raw = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let lower = raw.to_lowercase();

        match status {
            401 | 403 if lower.contains("rate limit") => GithubError::RateLimit,
            401 | 403 => GithubError::Auth,
            409 => GithubError::Conflict,
            408 | 504 => GithubError::Timeout,
            429 => GithubError::RateLimit,
            _ => GithubError::Api {
                status,
                message: if raw.is_empty() {
                    format!("GitHub API error ({status}).")
                } else {
                    raw
                },
            },
        }
    }

    /// Normalize a pre-response transport failure the same way as the model
    /// client: timeout wording collapses to the standard retryable message.
    pub fn from_transport(error: reqwest::Error) -> Self {
        let message = error.to_string();
        let lower = message.to_lowercase();
        if error.is_timeout()
            || lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("hang")
        {
            GithubError::Timeout
        } else {
            GithubError::Transport(message)
        }
    }
}

/// Thin seam over the Git host's REST API. `Ok(None)` is returned only when
/// `allow_missing` is set and the host answered 404 — used for the one probe
/// that treats absence as a signal value (the setup marker).
#[async_trait]
pub trait GitTransport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        allow_missing: bool,
    ) -> Result<Option<Value>, GithubError>;
}

/// Production transport: bearer-token auth, GitHub content negotiation and
/// API-version headers, best-effort JSON decode even on failure statuses.
pub struct HttpTransport {
    base_url: String,
    token: String,
    http_client: Client,
}

impl HttpTransport {
    pub fn new(base_url: String, token: String) -> Result<Self, GithubError> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GithubError::from_transport)?;

        Ok(Self {
            base_url,
            token,
            http_client,
        })
    }
}

#[async_trait]
impl GitTransport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        allow_missing: bool,
    ) -> Result<Option<Value>, GithubError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http_client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("accept", ACCEPT_HEADER)
            .header("x-github-api-version", API_VERSION)
            .header("content-type", "application/json");

        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(GithubError::from_transport)?;
        let status = response.status().as_u16();
        let payload: Value = response.json().await.unwrap_or(Value::Null);

        if allow_missing && status == 404 {
            return Ok(None);
        }

        if !(200..300).contains(&status) {
            return Err(GithubError::from_status(status, &payload));
        }

        Ok(Some(payload))
    }
}
