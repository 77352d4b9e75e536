//! Configuration for crawling, caching, limiting, and the pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a single crawl.
///
/// The depth and page caps exist specifically to make traversal cost
/// bounded and predictable regardless of the target site's link
/// density.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Starting URL
    pub seed_url: String,

    /// Maximum link distance from the seed (0 = seed only)
    pub max_depth: usize,

    /// Maximum number of pages to return
    pub max_pages: usize,

    /// Only follow links on the seed's own hostname
    pub same_host_only: bool,

    /// Path extensions that are never enqueued (binary assets)
    pub exclude_extensions: Vec<String>,

    /// Outbound fetch pacing, requests per second
    pub requests_per_second: u32,
}

impl CrawlConfig {
    /// Create a crawl config for a seed URL with default bounds.
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_depth: 2,
            max_pages: 5,
            same_host_only: true,
            exclude_extensions: default_excluded_extensions(),
            requests_per_second: 2,
        }
    }

    /// Set the maximum depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the page cap.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Allow following links to other hosts.
    pub fn any_host(mut self) -> Self {
        self.same_host_only = false;
        self
    }

    /// Set the fetch pacing.
    pub fn with_requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = rps.max(1);
        self
    }
}

fn default_excluded_extensions() -> Vec<String> {
    [
        "jpg", "jpeg", "png", "gif", "svg", "webp", "ico", "css", "js", "mjs", "zip", "gz",
        "tar", "rar", "mp3", "mp4", "avi", "mov", "webm", "woff", "woff2", "ttf", "eot", "pdf",
        "doc", "docx", "xls", "xlsx", "exe", "dmg",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Configuration for the extraction cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Key prefix; full keys are `<prefix>:<url>`
    pub key_prefix: String,

    /// How long a stored extraction stays valid
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: "content".to_string(),
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Create a cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
}

/// Configuration for the fixed-window rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Key prefix; full keys are `<prefix>:<client>`
    pub key_prefix: String,

    /// Window length
    pub window: Duration,

    /// Admitted requests per client per window
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            key_prefix: "ratelimit".to_string(),
            window: Duration::from_secs(3600),
            max_requests: 50,
        }
    }
}

impl RateLimitConfig {
    /// Create a rate limit config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window length.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Set the per-window request budget.
    pub fn with_max_requests(mut self, max: u32) -> Self {
        self.max_requests = max;
        self
    }
}

/// Configuration for the pipeline orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Cache behavior
    pub cache: CacheConfig,

    /// Crawl bounds used by the article extractor
    pub max_crawl_depth: usize,

    /// Page cap used by the article extractor
    pub max_crawl_pages: usize,

    /// Per-URL content budget in characters, applied after extraction
    pub max_chars_per_url: usize,

    /// Deadline for one URL's fetch + parse; expiry downgrades to a
    /// failure-message result instead of stalling the request
    pub url_deadline: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            max_crawl_depth: 2,
            max_crawl_pages: 5,
            max_chars_per_url: 8000,
            url_deadline: Duration::from_secs(45),
        }
    }
}

impl PipelineConfig {
    /// Create a pipeline config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache config.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Set the per-URL character budget.
    pub fn with_max_chars_per_url(mut self, max: usize) -> Self {
        self.max_chars_per_url = max;
        self
    }

    /// Set the per-URL deadline.
    pub fn with_url_deadline(mut self, deadline: Duration) -> Self {
        self.url_deadline = deadline;
        self
    }

    /// Set the article-extractor crawl bounds.
    pub fn with_crawl_bounds(mut self, max_depth: usize, max_pages: usize) -> Self {
        self.max_crawl_depth = max_depth;
        self.max_crawl_pages = max_pages;
        self
    }
}
