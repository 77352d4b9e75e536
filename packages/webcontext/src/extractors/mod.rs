//! Format-specific content extractors.
//!
//! Every extractor turns one URL into an [`ExtractionResult`] and never
//! fails: network and parse errors become readable failure text so the
//! orchestrator can always proceed with partial context.
//!
//! Dispatch order is hostname first (video platforms), then file
//! extension (`.pdf`, `.csv`), with article/HTML as the fallback.

pub mod article;
pub mod csv;
pub mod pdf;
pub mod video;

use async_trait::async_trait;
use std::sync::Arc;

use crate::traits::fetcher::Fetcher;
use crate::types::{config::CrawlConfig, extraction::ExtractionResult};

pub use article::ArticleExtractor;
pub use csv::CsvExtractor;
pub use pdf::PdfExtractor;
pub use video::VideoExtractor;

/// How a URL will be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Video,
    Pdf,
    Csv,
    Article,
}

/// Classify a URL by hostname, then by extension.
pub fn classify_url(url: &str) -> SourceKind {
    let parsed = url::Url::parse(url).ok();

    if let Some(host) = parsed.as_ref().and_then(|u| u.host_str()) {
        let host = host.trim_start_matches("www.");
        if host == "youtube.com" || host == "youtu.be" || host.ends_with(".youtube.com") {
            return SourceKind::Video;
        }
    }

    let path = parsed
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_else(|| url.to_ascii_lowercase());

    if path.ends_with(".pdf") {
        SourceKind::Pdf
    } else if path.ends_with(".csv") {
        SourceKind::Csv
    } else {
        SourceKind::Article
    }
}

/// One-URL-in, one-result-out extraction contract.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract content for a URL. Infallible by contract; failures are
    /// encoded in the result's content.
    async fn extract(&self, url: &str) -> ExtractionResult;
}

/// The full extractor set plus its dispatch rule.
pub struct ExtractorSet<F: Fetcher> {
    article: ArticleExtractor<F>,
    pdf: PdfExtractor<F>,
    csv: CsvExtractor<F>,
    video: VideoExtractor<F>,
}

impl<F: Fetcher> ExtractorSet<F> {
    /// Build the extractor set over a shared fetcher.
    pub fn new(fetcher: Arc<F>, crawl_template: CrawlConfig) -> Self {
        Self {
            article: ArticleExtractor::new(Arc::clone(&fetcher), crawl_template),
            pdf: PdfExtractor::new(Arc::clone(&fetcher)),
            csv: CsvExtractor::new(Arc::clone(&fetcher)),
            video: VideoExtractor::new(fetcher),
        }
    }

    /// Set the video metadata API key.
    pub fn with_video_api_key(mut self, key: secrecy::SecretString) -> Self {
        self.video = self.video.with_api_key(key);
        self
    }

    /// Extract a URL with the extractor its classification selects.
    pub async fn extract(&self, url: &str) -> ExtractionResult {
        match classify_url(url) {
            SourceKind::Video => self.video.extract(url).await,
            SourceKind::Pdf => self.pdf.extract(url).await,
            SourceKind::Csv => self.csv.extract(url).await,
            SourceKind::Article => self.article.extract(url).await,
        }
    }
}
