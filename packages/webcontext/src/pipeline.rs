//! Pipeline orchestrator: cache → extract → chart-detect → truncate.
//!
//! Given a request's URLs, each one is resolved independently and the
//! results are aggregated into a context bundle for the caller's
//! language model. No failure inside extraction aborts the batch;
//! every URL contributes either content or a readable failure message.

use std::sync::Arc;

use crate::cache::{CacheOutcome, ContentCache};
use crate::chart;
use crate::extractors::ExtractorSet;
use crate::security::UrlPolicy;
use crate::traits::{fetcher::Fetcher, kv::KvStore};
use crate::types::{
    config::{CrawlConfig, PipelineConfig},
    extraction::{ContextBundle, ContextRequest, ExtractionResult},
};

/// The content pipeline.
///
/// URLs within a request are processed sequentially, bounding peak
/// outbound connections per request to one and keeping at most one
/// extraction in flight per cache key.
pub struct Pipeline<S: KvStore, F: Fetcher> {
    cache: ContentCache<S>,
    extractors: ExtractorSet<F>,
    policy: UrlPolicy,
    config: PipelineConfig,
}

impl<S: KvStore, F: Fetcher> Pipeline<S, F> {
    /// Build a pipeline over a store and a fetcher.
    pub fn new(store: Arc<S>, fetcher: Arc<F>, config: PipelineConfig) -> Self {
        let crawl_template = CrawlConfig::new("")
            .with_max_depth(config.max_crawl_depth)
            .with_max_pages(config.max_crawl_pages);

        Self {
            cache: ContentCache::new(store, config.cache.clone()),
            extractors: ExtractorSet::new(fetcher, crawl_template),
            policy: UrlPolicy::new(),
            config,
        }
    }

    /// Replace the URL policy.
    pub fn with_policy(mut self, policy: UrlPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the video metadata API key.
    pub fn with_video_api_key(mut self, key: secrecy::SecretString) -> Self {
        self.extractors = self.extractors.with_video_api_key(key);
        self
    }

    /// Build the LLM-ready context for a request.
    pub async fn build_context(&self, request: &ContextRequest) -> ContextBundle {
        let mut bundle = ContextBundle::default();

        for url in &request.urls {
            let result = self.resolve_url(url).await;

            if result.content.trim().is_empty() {
                tracing::debug!(url = %url, "empty extraction, excluded from sources");
                continue;
            }

            // Detection runs on the full extraction; the character
            // budget only bounds what is forwarded
            if let Some(chart) = &result.visualization {
                bundle.visualizations.push(chart.clone());
            } else if let Some(chart) = chart::detect(&result.content) {
                bundle.visualizations.push(chart);
            }

            let mut content = truncate_chars(&result.content, self.config.max_chars_per_url);
            if !content.ends_with('\n') {
                content.push('\n');
            }
            bundle
                .context
                .push_str(&format!("Content from {url}:\n{content}\n"));
            bundle.sources.push(url.clone());
        }

        tracing::info!(
            urls = request.urls.len(),
            sources = bundle.sources.len(),
            visualizations = bundle.visualizations.len(),
            "context built"
        );
        bundle
    }

    async fn resolve_url(&self, url: &str) -> ExtractionResult {
        if let Err(e) = self.policy.check(url) {
            tracing::warn!(url = %url, error = %e, "URL rejected by policy");
            return ExtractionResult::failure(url, e);
        }

        let (result, outcome) = self
            .cache
            .get_or_compute(url, || self.bounded_extract(url))
            .await;
        if let CacheOutcome::Bypass { reason } = &outcome {
            tracing::warn!(url = %url, reason = %reason, "cache degraded for this URL");
        }
        result
    }

    /// Extraction with a deadline, so one hanging target cannot stall
    /// the whole request.
    async fn bounded_extract(&self, url: &str) -> ExtractionResult {
        match tokio::time::timeout(self.config.url_deadline, self.extractors.extract(url)).await {
            Ok(result) => result,
            Err(_) => ExtractionResult::failure(url, "extraction deadline exceeded"),
        }
    }
}

/// Truncate on a character boundary without splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}\n[content truncated]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");

        let truncated = truncate_chars(&"é".repeat(20), 5);
        assert!(truncated.starts_with(&"é".repeat(5)));
        assert!(truncated.contains("[content truncated]"));
    }
}
