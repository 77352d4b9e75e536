//! Bounded breadth-first site crawler.
//!
//! Traversal uses an explicit FIFO work queue rather than recursion, so
//! the depth and page-cap invariants are enforced in one place: results
//! never exceed `max_pages`, no URL is fetched twice, and a page at
//! depth `max_depth` is fetched but never expanded.

pub mod content;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::collections::{HashSet, VecDeque};
use std::num::NonZeroU32;
use std::sync::Arc;
use url::Url;

use crate::error::{CrawlError, CrawlResult};
use crate::traits::fetcher::Fetcher;
use crate::types::{
    config::CrawlConfig,
    page::{CrawlTask, CrawledPage},
};

pub use content::{visible_text, PageContent};

/// Breadth-first crawler over a [`Fetcher`].
pub struct Crawler<F: Fetcher> {
    fetcher: Arc<F>,
}

impl<F: Fetcher> Crawler<F> {
    /// Create a crawler over a fetcher.
    pub fn new(fetcher: Arc<F>) -> Self {
        Self { fetcher }
    }

    /// Crawl from a seed URL, breadth-first, within the config's bounds.
    ///
    /// Fetch failures drop the task (no retry) and the crawl continues;
    /// the only error is an unparseable seed.
    pub async fn crawl(&self, config: &CrawlConfig) -> CrawlResult<Vec<CrawledPage>> {
        let seed = Url::parse(&config.seed_url).map_err(|_| CrawlError::InvalidSeed {
            url: config.seed_url.clone(),
        })?;
        let seed_host = seed.host_str().unwrap_or("").to_string();
        let pacer = build_pacer(config.requests_per_second);

        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<CrawlTask> = VecDeque::new();
        let mut results: Vec<CrawledPage> = Vec::new();

        queue.push_back(CrawlTask::new(normalize_url(&seed), 0));

        while let Some(task) = queue.pop_front() {
            if results.len() >= config.max_pages {
                break;
            }
            if visited.contains(&task.url) {
                continue;
            }
            // Mark visited before the fetch so cycles and duplicate
            // links can never cause a second fetch of the same URL
            visited.insert(task.url.clone());

            pacer.until_ready().await;

            let body = match self.fetcher.fetch(&task.url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(url = %task.url, error = %e, "page fetch failed, dropping task");
                    continue;
                }
            };

            let base = Url::parse(&body.final_url).unwrap_or_else(|_| seed.clone());
            let html = body.text();
            let parsed = content::parse_page(&base, &html);

            let mut page = CrawledPage::new(&task.url, task.depth, parsed.text)
                .with_outbound_links(parsed.links)
                .with_media_links(parsed.media);
            if let Some(title) = parsed.title {
                page = page.with_title(title);
            }

            if task.depth < config.max_depth {
                for link in &page.outbound_links {
                    let Ok(parsed_link) = Url::parse(link) else {
                        continue;
                    };
                    if !should_enqueue(&parsed_link, &seed_host, config) {
                        continue;
                    }
                    let normalized = normalize_url(&parsed_link);
                    if !visited.contains(&normalized) {
                        queue.push_back(CrawlTask::new(normalized, task.depth + 1));
                    }
                }
            }

            results.push(page);
        }

        tracing::debug!(
            seed = %config.seed_url,
            pages = results.len(),
            urls_visited = visited.len(),
            "crawl finished"
        );

        Ok(results)
    }
}

fn build_pacer(requests_per_second: u32) -> DefaultDirectRateLimiter {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
    RateLimiter::direct(Quota::per_second(rps))
}

/// Normalize a URL for visited-set membership: the fragment never
/// changes the fetched document, so it is stripped.
fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

fn should_enqueue(url: &Url, seed_host: &str, config: &CrawlConfig) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    if config.same_host_only && url.host_str().unwrap_or("") != seed_host {
        return false;
    }
    if let Some(ext) = path_extension(url.path()) {
        if config
            .exclude_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&ext))
        {
            return false;
        }
    }
    true
}

fn path_extension(path: &str) -> Option<String> {
    let last_segment = path.rsplit('/').next()?;
    let (_, ext) = last_segment.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}
