//! Fetcher trait and the reqwest-backed implementation.

use async_trait::async_trait;
use std::borrow::Cow;
use std::time::Duration;

use crate::error::{FetchError, FetchResult};

/// A fetched HTTP body plus the metadata extractors care about.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header, if present
    pub content_type: Option<String>,

    /// Raw response body
    pub bytes: Vec<u8>,
}

impl FetchedBody {
    /// Decode the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Outbound HTTP GET seam.
///
/// Any non-2xx response is an error; callers decide whether that is
/// fatal (it never is for extractors, which downgrade to failure text).
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL and return the body.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedBody>;
}

/// Reqwest-backed fetcher with an identifying User-Agent and a bounded
/// per-request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with default settings (20 s timeout).
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(20))
    }

    /// Create a fetcher with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to create HTTP client"),
            user_agent: "WebContextBot/1.0".to_string(),
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedBody> {
        tracing::debug!(url = %url, "HTTP fetch starting");
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    FetchError::Transport {
                        url: url.to_string(),
                        source: Box::new(e),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                source: Box::new(e),
            })?
            .to_vec();

        Ok(FetchedBody {
            final_url,
            status: status.as_u16(),
            content_type,
            bytes,
        })
    }
}
