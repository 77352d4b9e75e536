//! Typed errors for the content pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Note that extractors and
//! the pipeline orchestrator deliberately do not surface these to
//! callers: every failure is downgraded to a human-readable content
//! string so a batch of URLs always yields a result.

use thiserror::Error;

/// Errors that can occur while fetching a remote resource.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure (DNS, connect, TLS, read).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Upstream answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The fetch exceeded its deadline.
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    /// URL could not be parsed.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors that can occur during crawl operations.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Security validation rejected the URL
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// Fetching a page failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Seed URL could not be parsed
    #[error("invalid seed URL: {url}")]
    InvalidSeed { url: String },
}

/// Errors from the shared key-value store backing the cache and the
/// rate limiter.
///
/// Every consumer of the store fails open: a `StoreError` degrades the
/// feature (no caching, no limiting) instead of failing the request.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or the operation itself failed
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The store call exceeded its bounded timeout
    #[error("store call timed out")]
    Timeout,

    /// No store backend was configured
    #[error("store not configured")]
    Unconfigured,

    /// Stored value could not be encoded or decoded
    #[error("store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Security-related errors raised by URL validation.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked (e.g., localhost, cloud metadata endpoints)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// IP in blocked CIDR range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedCidr(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for crawl operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

/// Result type alias for key-value store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for security validation.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;
