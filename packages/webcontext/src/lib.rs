//! Bounded URL Content Pipeline
//!
//! Turns heterogeneous remote content (HTML pages, PDFs, CSVs, video
//! metadata) into bounded, LLM-ready text plus optional chart data,
//! while protecting the service from overload.
//!
//! # Design
//!
//! - **Bounded**: the crawler never runs unbounded; depth and page caps
//!   are enforced against an explicit work queue.
//! - **Deterministic heuristics**: chart detection and column
//!   classification give the same answer for the same input.
//! - **Graceful degradation**: extractors never fail — errors become
//!   readable content; the cache and rate limiter fail open when their
//!   shared store is unavailable.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use webcontext::{ContextRequest, HttpFetcher, MemoryStore, Pipeline, PipelineConfig};
//!
//! let store = Arc::new(MemoryStore::new());
//! let fetcher = Arc::new(HttpFetcher::new());
//! let pipeline = Pipeline::new(store, fetcher, PipelineConfig::default());
//!
//! let request = ContextRequest::new("what does this say?", ["https://example.com/report.csv"]);
//! let bundle = pipeline.build_context(&request).await;
//! // bundle.context, bundle.sources, bundle.visualizations
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core seams ([`Fetcher`], [`KvStore`])
//! - [`types`] - Pages, extraction results, chart specs, configuration
//! - [`crawler`] - Bounded breadth-first traversal
//! - [`extractors`] - Article/PDF/CSV/video converters and dispatch
//! - [`chart`] - Tabular-structure detection
//! - [`cache`] - Content-addressed extraction cache
//! - [`ratelimit`] - Fixed-window request limiter
//! - [`pipeline`] - Orchestration and aggregation
//! - [`security`] - URL safety policy
//! - [`stores`] - Key-value store backends (memory, Redis)
//! - [`testing`] - Scripted fakes for offline tests

pub mod cache;
pub mod chart;
pub mod crawler;
pub mod error;
pub mod extractors;
pub mod pipeline;
pub mod ratelimit;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{CrawlError, FetchError, SecurityError, StoreError};
pub use traits::{
    fetcher::{FetchedBody, Fetcher, HttpFetcher},
    kv::KvStore,
};
pub use types::{
    chart::{CellValue, ChartKind, ChartRow, ChartSpec},
    config::{CacheConfig, CrawlConfig, PipelineConfig, RateLimitConfig},
    extraction::{ContextBundle, ContextRequest, ExtractionResult},
    page::{CrawlTask, CrawledPage},
};

pub use cache::{CacheOutcome, ContentCache};
pub use chart::detect as detect_chart;
pub use crawler::Crawler;
pub use extractors::{classify_url, Extractor, ExtractorSet, SourceKind};
pub use pipeline::Pipeline;
pub use ratelimit::{Admission, FixedWindowLimiter};
pub use security::UrlPolicy;
pub use stores::{MemoryStore, RedisStore};
