//! End-to-end pipeline tests over scripted fakes: no network, no Redis.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use webcontext::testing::{MockFetcher, UnavailableStore};
use webcontext::{
    Admission, ChartKind, ContextRequest, FixedWindowLimiter, MemoryStore, Pipeline,
    PipelineConfig, RateLimitConfig, UrlPolicy,
};

fn pipeline_over(
    store: Arc<MemoryStore>,
    fetcher: Arc<MockFetcher>,
) -> Pipeline<MemoryStore, MockFetcher> {
    Pipeline::new(store, fetcher, PipelineConfig::default())
}

#[tokio::test]
async fn csv_url_yields_row_count_and_bar_chart() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.add_body(
        "https://data.test/points.csv",
        "text/csv",
        b"x,y\n1,10\n2,20\n3,30".to_vec(),
    );

    let pipeline = pipeline_over(Arc::new(MemoryStore::new()), fetcher);
    let request = ContextRequest::new("plot this", ["https://data.test/points.csv"]);

    let bundle = pipeline.build_context(&request).await;

    assert!(bundle.context.contains("3 records"));
    assert_eq!(bundle.sources, vec!["https://data.test/points.csv"]);
    assert_eq!(bundle.visualizations.len(), 1);
    assert_eq!(bundle.visualizations[0].kind, ChartKind::Bar);
    assert_eq!(bundle.visualizations[0].rows.len(), 3);
}

#[tokio::test]
async fn unreachable_url_yields_failure_text_not_a_fault() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.add_failure("https://down.test/page");

    let pipeline = pipeline_over(Arc::new(MemoryStore::new()), fetcher);
    let request = ContextRequest::new("summarize", ["https://down.test/page"]);

    let bundle = pipeline.build_context(&request).await;

    assert!(bundle.context.contains("https://down.test/page"));
    assert!(bundle.visualizations.is_empty());
}

#[tokio::test]
async fn repeated_request_is_served_from_cache() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.add_page(
        "https://blog.test/post",
        "<html><body><p>One paragraph of text.</p></body></html>",
    );

    let pipeline = pipeline_over(Arc::new(MemoryStore::new()), Arc::clone(&fetcher));
    let request = ContextRequest::new("read", ["https://blog.test/post"]);

    let first = pipeline.build_context(&request).await;
    let fetches_after_first = fetcher.calls().len();
    let second = pipeline.build_context(&request).await;

    assert_eq!(first.context, second.context);
    assert_eq!(
        fetcher.calls().len(),
        fetches_after_first,
        "second request must not refetch"
    );
}

#[tokio::test]
async fn chart_detection_sees_content_past_the_truncation_budget() {
    let fetcher = Arc::new(MockFetcher::new());
    let filler = "Quarterly commentary without numbers. ".repeat(8);
    fetcher.add_page(
        "https://site.test/report",
        format!("<html><body><p>{filler}</p><p>a,b<br>1,2<br>3,4</p></body></html>"),
    );

    let pipeline = Pipeline::new(
        Arc::new(MemoryStore::new()),
        fetcher,
        PipelineConfig::default().with_max_chars_per_url(100),
    );
    let request = ContextRequest::new("plot this", ["https://site.test/report"]);

    let bundle = pipeline.build_context(&request).await;

    // The table sits past the character budget; detection still runs
    // on the full extraction
    assert_eq!(bundle.visualizations.len(), 1);
    assert_eq!(bundle.visualizations[0].kind, ChartKind::Bar);
    assert_eq!(bundle.visualizations[0].rows.len(), 2);
    assert!(bundle.context.contains("[content truncated]"));
}

#[tokio::test]
async fn transient_fetch_failure_is_not_served_from_cache() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.add_failure("https://news.test/story");

    let pipeline = pipeline_over(Arc::new(MemoryStore::new()), Arc::clone(&fetcher));
    let request = ContextRequest::new("read", ["https://news.test/story"]);

    let first = pipeline.build_context(&request).await;
    assert!(first.context.contains("Could not extract content"));

    fetcher.add_page(
        "https://news.test/story",
        "<html><body><p>Back online.</p></body></html>",
    );
    let second = pipeline.build_context(&request).await;
    assert!(second.context.contains("Back online."));
}

#[tokio::test]
async fn unavailable_store_degrades_to_recompute() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.add_page(
        "https://blog.test/post",
        "<html><body><p>Still served.</p></body></html>",
    );

    let pipeline = Pipeline::new(
        Arc::new(UnavailableStore),
        Arc::clone(&fetcher),
        PipelineConfig::default(),
    );
    let request = ContextRequest::new("read", ["https://blog.test/post"]);

    let bundle = pipeline.build_context(&request).await;
    assert!(bundle.context.contains("Still served."));

    // And again: recomputed, not failed
    let bundle = pipeline.build_context(&request).await;
    assert!(bundle.context.contains("Still served."));
}

#[tokio::test]
async fn internal_urls_are_rejected_before_any_fetch() {
    let fetcher = Arc::new(MockFetcher::new());
    let pipeline = pipeline_over(Arc::new(MemoryStore::new()), Arc::clone(&fetcher));
    let request = ContextRequest::new(
        "read",
        ["http://169.254.169.254/latest/meta-data", "file:///etc/passwd"],
    );

    let bundle = pipeline.build_context(&request).await;

    assert!(fetcher.calls().is_empty(), "policy must block the fetch");
    assert!(bundle.context.contains("169.254.169.254"));
}

#[tokio::test]
async fn mixed_batch_reports_partial_success() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.add_body(
        "https://data.test/ok.csv",
        "text/csv",
        b"k,v\na,1\nb,2".to_vec(),
    );
    fetcher.add_failure("https://down.test/");

    let pipeline = pipeline_over(Arc::new(MemoryStore::new()), fetcher);
    let request = ContextRequest::new(
        "both",
        ["https://data.test/ok.csv", "https://down.test/"],
    );

    let bundle = pipeline.build_context(&request).await;

    assert!(bundle.sources.contains(&"https://data.test/ok.csv".to_string()));
    assert!(bundle.context.contains("2 records"));
    assert!(bundle.context.contains("https://down.test/"));
    assert_eq!(bundle.visualizations.len(), 1);
}

#[tokio::test]
async fn limiter_gates_a_request_upstream_of_extraction() {
    let store = Arc::new(MemoryStore::new());
    let limiter = FixedWindowLimiter::new(
        Arc::clone(&store),
        RateLimitConfig::new()
            .with_max_requests(2)
            .with_window(Duration::from_secs(3600)),
    );

    assert!(matches!(
        limiter.admit("10.1.2.3").await,
        Admission::Allowed { remaining: 1 }
    ));
    assert!(matches!(
        limiter.admit("10.1.2.3").await,
        Admission::Allowed { remaining: 0 }
    ));

    let denied = limiter.admit("10.1.2.3").await;
    assert_eq!(denied.retry_after_secs(), Some(3600));

    store.advance(Duration::from_secs(3601));
    assert!(limiter.admit("10.1.2.3").await.is_allowed());
}

#[tokio::test]
async fn article_pages_share_one_visited_set() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.add_page(
        "https://site.test/",
        r#"<html><body><p>Home.</p><a href="/loop">loop</a></body></html>"#,
    );
    fetcher.add_page(
        "https://site.test/loop",
        r#"<html><body><p>Loop.</p><a href="/">back</a></body></html>"#,
    );

    let policy = UrlPolicy::new();
    let pipeline = pipeline_over(Arc::new(MemoryStore::new()), Arc::clone(&fetcher))
        .with_policy(policy);
    let request = ContextRequest::new("read", ["https://site.test/"]);

    let bundle = pipeline.build_context(&request).await;

    assert!(bundle.context.contains("Home."));
    assert_eq!(fetcher.call_count("https://site.test/"), 1);
    assert_eq!(fetcher.call_count("https://site.test/loop"), 1);
}

proptest! {
    // The detector is a heuristic over arbitrary text; it must never
    // panic and never emit a spec below its own floor.
    #[test]
    fn chart_detection_never_panics_and_respects_floor(
        text in r"([ -~]{0,24}\n){0,12}[ -~]{0,24}",
    ) {
        if let Some(spec) = webcontext::detect_chart(&text) {
            prop_assert!(spec.rows.len() >= 2);
            prop_assert!(spec
                .rows
                .iter()
                .all(|row| row.values().any(|cell| cell.is_number())));
        }
    }
}
