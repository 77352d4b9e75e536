//! Article/HTML extraction via the bounded crawler.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::crawler::Crawler;
use crate::extractors::Extractor;
use crate::traits::fetcher::Fetcher;
use crate::types::{config::CrawlConfig, extraction::ExtractionResult};

/// Number of related links appended after the page texts.
const MAX_RELATED_LINKS: usize = 10;

/// Extracts article content by crawling the URL's own site.
///
/// The crawl is restricted to the seed's hostname with binary-asset
/// extensions excluded; each page contributes its text under a
/// `Source:` header.
pub struct ArticleExtractor<F: Fetcher> {
    crawler: Crawler<F>,
    crawl_template: CrawlConfig,
}

impl<F: Fetcher> ArticleExtractor<F> {
    /// Create an article extractor. The template carries the bounds;
    /// its seed URL is replaced per extraction.
    pub fn new(fetcher: Arc<F>, crawl_template: CrawlConfig) -> Self {
        Self {
            crawler: Crawler::new(fetcher),
            crawl_template,
        }
    }
}

#[async_trait]
impl<F: Fetcher> Extractor for ArticleExtractor<F> {
    async fn extract(&self, url: &str) -> ExtractionResult {
        let mut config = self.crawl_template.clone();
        config.seed_url = url.to_string();
        config.same_host_only = true;

        let pages = match self.crawler.crawl(&config).await {
            Ok(pages) => pages,
            Err(e) => return ExtractionResult::failure(url, e),
        };

        if pages.iter().all(|p| p.text.trim().is_empty()) {
            return ExtractionResult::failure(url, "no readable content found");
        }

        let mut sections: Vec<String> = Vec::new();
        let mut related: BTreeSet<String> = BTreeSet::new();

        for page in &pages {
            if page.text.trim().is_empty() {
                continue;
            }
            let mut section = format!("Source: {}\n", page.url);
            if let Some(title) = &page.title {
                section.push_str(&format!("Title: {title}\n"));
            }
            section.push_str(&page.text);
            sections.push(section);

            for link in &page.outbound_links {
                if link != url {
                    related.insert(link.clone());
                }
            }
        }

        let mut content = sections.join("\n\n");
        if !related.is_empty() {
            content.push_str("\n\nRelated links:\n");
            for link in related.into_iter().take(MAX_RELATED_LINKS) {
                content.push_str(&format!("- {link}\n"));
            }
        }

        ExtractionResult::text(content)
    }
}
