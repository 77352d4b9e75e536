//! Video metadata extraction for hosted media platforms (YouTube).

use async_trait::async_trait;
use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;

use crate::extractors::Extractor;
use crate::traits::fetcher::Fetcher;
use crate::types::{
    chart::{CellValue, ChartKind, ChartRow, ChartSpec},
    extraction::ExtractionResult,
};

const DESCRIPTION_PREVIEW_CHARS: usize = 500;

/// Extracts video metadata from a platform URL.
///
/// With an API key configured, metadata comes from the platform's data
/// API and includes engagement counters rendered as a bar chart.
/// Without one, the extractor falls back to scraping the page's
/// open-graph tags; the missing credential is a documented fallback,
/// never a failure.
pub struct VideoExtractor<F: Fetcher> {
    fetcher: Arc<F>,
    api_key: Option<SecretString>,
    api_base: String,
}

impl<F: Fetcher> VideoExtractor<F> {
    /// Create a video extractor without an API credential.
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            api_key: None,
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
        }
    }

    /// Configure the metadata API key.
    pub fn with_api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Override the API base URL. Used by tests.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    async fn extract_via_api(&self, url: &str, id: &str, key: &SecretString) -> ExtractionResult {
        let api_url = format!(
            "{}/videos?part=snippet,statistics&id={}&key={}",
            self.api_base,
            id,
            key.expose_secret()
        );

        let body = match self.fetcher.fetch(&api_url).await {
            Ok(body) => body,
            Err(e) => {
                // Do not echo the keyed API URL; report against the video URL
                tracing::warn!(url = %url, error = %e, "video metadata API unreachable, scraping instead");
                return self.extract_via_scrape(url).await;
            }
        };

        let parsed: VideoListResponse = match serde_json::from_slice(&body.bytes) {
            Ok(parsed) => parsed,
            Err(e) => return ExtractionResult::failure(url, format!("unexpected API response ({e})")),
        };
        let Some(item) = parsed.items.into_iter().next() else {
            return ExtractionResult::failure(url, "video not found");
        };

        let mut content = format!("Video: {url}\n");
        content.push_str(&format!("Title: {}\n", item.snippet.title));
        if let Some(channel) = &item.snippet.channel_title {
            content.push_str(&format!("Channel: {channel}\n"));
        }
        if let Some(published) = &item.snippet.published_at {
            content.push_str(&format!("Published: {published}\n"));
        }
        if let Some(tags) = &item.snippet.tags {
            if !tags.is_empty() {
                content.push_str(&format!("Tags: {}\n", tags.join(", ")));
            }
        }
        if !item.snippet.description.is_empty() {
            let preview: String = item
                .snippet
                .description
                .chars()
                .take(DESCRIPTION_PREVIEW_CHARS)
                .collect();
            content.push_str(&format!("Description: {preview}\n"));
        }

        let mut counters: Vec<(&str, Option<&String>)> = Vec::new();
        if let Some(stats) = &item.statistics {
            counters.push(("views", stats.view_count.as_ref()));
            counters.push(("likes", stats.like_count.as_ref()));
            counters.push(("comments", stats.comment_count.as_ref()));
        }
        let mut rows: Vec<ChartRow> = Vec::new();
        for (metric, value) in counters {
            let Some(n) = value.and_then(|v| v.parse::<f64>().ok()) else {
                continue;
            };
            content.push_str(&format!("{}: {}\n", capitalize(metric), n as u64));
            let mut row: ChartRow = IndexMap::new();
            row.insert("metric".to_string(), CellValue::Text(metric.to_string()));
            row.insert("count".to_string(), CellValue::Number(n));
            rows.push(row);
        }

        let mut result = ExtractionResult::text(content);
        if rows.len() >= 2 {
            result = result.with_visualization(ChartSpec::new(ChartKind::Bar, rows));
        }
        result
    }

    async fn extract_via_scrape(&self, url: &str) -> ExtractionResult {
        let body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => return ExtractionResult::failure(url, e),
        };

        let html = body.text();
        let meta = scrape_meta(&html);
        if meta.title.is_none() && meta.description.is_none() {
            return ExtractionResult::failure(url, "no video metadata found on page");
        }

        let mut content = format!("Video: {url}\n");
        if let Some(title) = meta.title {
            content.push_str(&format!("Title: {title}\n"));
        }
        if let Some(description) = meta.description {
            let preview: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
            content.push_str(&format!("Description: {preview}\n"));
        }
        ExtractionResult::text(content)
    }
}

#[async_trait]
impl<F: Fetcher> Extractor for VideoExtractor<F> {
    async fn extract(&self, url: &str) -> ExtractionResult {
        let Some(id) = video_id(url) else {
            return ExtractionResult::failure(url, "unrecognized video URL");
        };

        match &self.api_key {
            Some(key) => self.extract_via_api(url, &id, key).await,
            None => self.extract_via_scrape(url).await,
        }
    }
}

/// Extract the platform-specific video identifier from a URL.
///
/// Recognized shapes: `youtube.com/watch?v=`, `youtu.be/`,
/// `youtube.com/shorts/`, `youtube.com/embed/`.
pub fn video_id(url: &str) -> Option<String> {
    let pattern = regex::Regex::new(
        r"(?:youtube\.com/watch\?(?:[^#]*&)?v=|youtu\.be/|youtube\.com/shorts/|youtube\.com/embed/)([A-Za-z0-9_-]{6,})",
    )
    .expect("static pattern");
    pattern
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Default)]
struct PageMeta {
    title: Option<String>,
    description: Option<String>,
}

fn scrape_meta(html: &str) -> PageMeta {
    let document = scraper::Html::parse_document(html);

    let meta_content = |selector: &str| -> Option<String> {
        let parsed = scraper::Selector::parse(selector).expect("static selector");
        document
            .select(&parsed)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let title = meta_content(r#"meta[property="og:title"]"#).or_else(|| {
        let selector = scraper::Selector::parse("title").expect("static selector");
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    });
    let description = meta_content(r#"meta[property="og:description"]"#)
        .or_else(|| meta_content(r#"meta[name="description"]"#));

    PageMeta { title, description }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: Option<String>,
    tags: Option<Vec<String>>,
}

// The data API reports counters as strings
#[derive(Debug, Deserialize)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[test]
    fn recognizes_known_url_shapes() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id("https://www.youtube.com/shorts/abcDEF123").as_deref(),
            Some("abcDEF123")
        );
        assert_eq!(
            video_id("https://www.youtube.com/embed/abcDEF123").as_deref(),
            Some("abcDEF123")
        );
        assert_eq!(video_id("https://example.com/watch?v=nope"), None);
    }

    #[tokio::test]
    async fn api_path_formats_metadata_and_engagement_chart() {
        let fetcher = MockFetcher::new();
        fetcher.add_body(
            "https://api.test/videos?part=snippet,statistics&id=dQw4w9WgXcQ&key=k123",
            "application/json",
            br#"{
                "items": [{
                    "snippet": {
                        "title": "Launch day",
                        "description": "We shipped.",
                        "publishedAt": "2024-06-01T00:00:00Z",
                        "channelTitle": "Widgets Inc",
                        "tags": ["widgets", "launch"]
                    },
                    "statistics": {
                        "viewCount": "1200",
                        "likeCount": "80",
                        "commentCount": "14"
                    }
                }]
            }"#
            .to_vec(),
        );

        let extractor = VideoExtractor::new(Arc::new(fetcher))
            .with_api_key(SecretString::from("k123".to_string()))
            .with_api_base("https://api.test");

        let result = extractor
            .extract("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .await;

        assert!(result.content.contains("Title: Launch day"));
        assert!(result.content.contains("Channel: Widgets Inc"));
        assert!(result.content.contains("Views: 1200"));

        let chart = result.visualization.unwrap();
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.rows.len(), 3);
        assert_eq!(chart.rows[0]["metric"], CellValue::Text("views".into()));
        assert_eq!(chart.rows[0]["count"].as_number(), Some(1200.0));
    }

    #[tokio::test]
    async fn missing_key_falls_back_to_open_graph_scrape() {
        let fetcher = MockFetcher::new();
        fetcher.add_page(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            r#"<html><head>
                <meta property="og:title" content="Launch day">
                <meta property="og:description" content="We shipped.">
            </head><body></body></html>"#,
        );

        let extractor = VideoExtractor::new(Arc::new(fetcher));
        let result = extractor
            .extract("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .await;

        assert!(result.content.contains("Title: Launch day"));
        assert!(result.content.contains("Description: We shipped."));
        assert!(result.visualization.is_none());
    }

    #[tokio::test]
    async fn unrecognized_video_url_downgrades_to_failure_text() {
        let extractor = VideoExtractor::new(Arc::new(MockFetcher::new()));
        let result = extractor.extract("https://www.youtube.com/feed/library").await;
        assert!(result.content.contains("youtube.com/feed/library"));
    }
}
