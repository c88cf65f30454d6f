//! Clients for the third-party APIs skills forward to.
//!
//! Each operation issues exactly one request and normalizes the reply:
//! a status >= 400 becomes an in-band [`ErrorRecord`], anything else is the
//! decoded body verbatim. Only local faults are returned as `Err`.

pub mod github;
pub mod notion;
pub mod vercel;
pub mod wordpress;

use reqwest::header::HeaderValue;
use serde::Deserialize;
use serde_json::Value;
use skillhub_core::{Config, ErrorRecord, Provider};
use thiserror::Error;
use tracing::{debug, warn};

pub use github::GitHubClient;
pub use notion::NotionClient;
pub use vercel::VercelClient;
pub use wordpress::WordPressClient;

/// User agent sent on every outbound request. GitHub rejects requests
/// without one.
pub const USER_AGENT: &str = concat!("skillhub/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} token is not a valid header value")]
    InvalidToken { provider: Provider },

    #[error("{provider} returned a non-JSON body (status {status}): {message}")]
    Decode {
        provider: Provider,
        status: u16,
        message: String,
    },
}

impl ProviderError {
    fn transport(provider: Provider) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Transport { provider, source }
    }
}

/// All provider clients, built once from [`Config`].
#[derive(Debug, Clone)]
pub struct Providers {
    pub github: GitHubClient,
    pub notion: NotionClient,
    pub vercel: VercelClient,
    pub wordpress: WordPressClient,
}

impl Providers {
    /// Build clients sharing one connection pool.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_http(config, &http))
    }

    pub fn with_http(config: &Config, http: &reqwest::Client) -> Self {
        Self {
            github: GitHubClient::new(http.clone(), &config.github_api_url, &config.github_token),
            notion: NotionClient::new(http.clone(), &config.notion_api_url, &config.notion_token),
            vercel: VercelClient::new(http.clone(), &config.vercel_api_url, &config.vercel_token),
            wordpress: WordPressClient::new(
                http.clone(),
                &config.wordpress_url,
                &config.wordpress_username,
                &config.wordpress_password,
            ),
        }
    }
}

/// Send a prepared request and normalize the reply.
pub(crate) async fn execute(
    provider: Provider,
    request: reqwest::RequestBuilder,
) -> Result<Value, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(ProviderError::transport(provider))?;
    normalize(provider, response).await
}

async fn normalize(provider: Provider, response: reqwest::Response) -> Result<Value, ProviderError> {
    let status = response.status().as_u16();
    let url = response.url().path().to_string();
    let body = response
        .text()
        .await
        .map_err(ProviderError::transport(provider))?;

    if status >= 400 {
        warn!(provider = %provider, status, path = %url, "upstream error");
        return Ok(ErrorRecord::upstream(provider, status, &body).into_value());
    }

    debug!(provider = %provider, status, path = %url, bytes = body.len(), "upstream ok");
    serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
        provider,
        status,
        message: e.to_string(),
    })
}

/// `Authorization: Bearer <token>`, marked sensitive.
pub(crate) fn bearer(provider: Provider, token: &str) -> Result<HeaderValue, ProviderError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ProviderError::InvalidToken { provider })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Push a query pair only when the value is present and non-empty.
pub(crate) fn push_opt(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        query.push((key, value.to_string()));
    }
}

/// Whether an optional JSON argument counts as given.
///
/// Null, `false`, zero, and empty strings, arrays, or objects are all left
/// out of the outbound request.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Identifier accepted either as a JSON number or a string.
///
/// Only ever interpolated into a path, so both spellings are equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PathId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for PathId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}
