//! Outbound HTTP transport.
//!
//! Every adapter makes exactly one call through a [`Transport`] per
//! invocation. Failures are terminal: there are no retries, and the caller
//! gets a single [`FetchError`] carrying the URL and the cause.
//!
//! The trait seam exists so tests (and embedders) can substitute canned
//! responses for the network.

use async_trait::async_trait;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const DEFAULT_USER_AGENT: &str = concat!("web2api/", env!("CARGO_PKG_VERSION"));

/// One outbound GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.push((key.to_string(), value.into()));
        self
    }
}

/// Typed failure of a single outbound request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("Failed to fetch URL '{url}': HTTP status {status}")]
    Status { url: String, status: u16 },

    /// DNS, connect, TLS, timeout, or body read failure.
    #[error("Failed to fetch URL '{url}': {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The body arrived but could not be decoded.
    #[error("Failed to decode response from '{url}': {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Network { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}

/// Issues one outbound request and returns the body text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_text(&self, request: &FetchRequest) -> Result<String, FetchError>;
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose requests all time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, request: &FetchRequest) -> Result<String, FetchError> {
        let network = |e: reqwest::Error| FetchError::Network {
            url: request.url.clone(),
            source: Box::new(e),
        };

        let mut builder = self.client.get(&request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        tracing::debug!(url = %request.url, "fetching");
        let resp = builder.send().await.map_err(network)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(network)
    }
}
