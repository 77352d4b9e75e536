//! Extraction results and the pipeline's caller-facing request/response.

use serde::{Deserialize, Serialize};

use crate::types::chart::ChartSpec;

/// The unit every extractor returns and the cache stores, regardless of
/// source format.
///
/// Extractors never fail: failure paths produce a result whose content
/// is a readable message referencing the URL, so the orchestrator can
/// always proceed with partial context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Normalized text ready to be placed in an LLM prompt
    pub content: String,

    /// Tabular data detected in the source, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization: Option<ChartSpec>,

    /// Whether this is a downgraded failure rather than real content.
    /// Failure results are never cached, so a transient error is not
    /// replayed for the cache TTL.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

impl ExtractionResult {
    /// Create a text-only result.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            visualization: None,
            failed: false,
        }
    }

    /// Create a failure result. The message always names the URL so the
    /// downstream model can explain what went wrong.
    pub fn failure(url: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            failed: true,
            ..Self::text(format!("Could not extract content from {url}: {reason}"))
        }
    }

    /// Attach a chart spec.
    pub fn with_visualization(mut self, chart: ChartSpec) -> Self {
        self.visualization = Some(chart);
        self
    }

    /// Whether the content is effectively empty.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// A caller's request: the user message plus the URLs submitted with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRequest {
    /// The user's question (passed through untouched; the pipeline only
    /// needs the URLs)
    #[serde(default)]
    pub message: String,

    /// URLs to extract content from
    #[serde(default)]
    pub urls: Vec<String>,
}

impl ContextRequest {
    /// Create a request for a message and URL list.
    pub fn new(
        message: impl Into<String>,
        urls: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            message: message.into(),
            urls: urls.into_iter().map(|u| u.into()).collect(),
        }
    }
}

/// Aggregated output the caller forwards to its language model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextBundle {
    /// Concatenated, truncated per-URL content
    pub context: String,

    /// URLs that yielded non-empty content, in request order
    pub sources: Vec<String>,

    /// Chart specs detected across all URLs
    pub visualizations: Vec<ChartSpec>,
}

impl ContextBundle {
    /// Whether any URL contributed content.
    pub fn has_context(&self) -> bool {
        !self.context.trim().is_empty()
    }
}
