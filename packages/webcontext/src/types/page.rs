//! Page types - crawl tasks and fetched pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of crawl work: a URL and the depth it was discovered at.
///
/// Tasks are queued FIFO and never re-queued once their URL has been
/// visited, which is what keeps the traversal breadth-first and bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Normalized URL to fetch
    pub url: String,

    /// Link distance from the seed (seed = 0)
    pub depth: usize,
}

impl CrawlTask {
    /// Create a task for a URL at a given depth.
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// A fetched page with its extracted text and discovered links.
///
/// Immutable once produced by the crawler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawledPage {
    /// Canonical URL of the page
    pub url: String,

    /// Link distance from the seed
    pub depth: usize,

    /// Page title if available
    pub title: Option<String>,

    /// Visible text with non-content tags stripped
    pub text: String,

    /// Navigational links, resolved to absolute URLs
    #[serde(default)]
    pub outbound_links: Vec<String>,

    /// Image/video/audio links, resolved to absolute URLs
    #[serde(default)]
    pub media_links: Vec<String>,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CrawledPage {
    /// Create a new page result.
    pub fn new(url: impl Into<String>, depth: usize, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth,
            title: None,
            text: text.into(),
            outbound_links: Vec::new(),
            media_links: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the outbound links.
    pub fn with_outbound_links(mut self, links: Vec<String>) -> Self {
        self.outbound_links = links;
        self
    }

    /// Set the media links.
    pub fn with_media_links(mut self, links: Vec<String>) -> Self {
        self.media_links = links;
        self
    }
}
