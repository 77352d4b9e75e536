//! HTTP surface: context building gated by the rate limiter.

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use webcontext::{Admission, ContextRequest, FixedWindowLimiter, HttpFetcher, Pipeline};

use crate::store::AppStore;

/// Shared application state.
pub struct AppState {
    pub pipeline: Pipeline<AppStore, HttpFetcher>,
    pub limiter: FixedWindowLimiter<AppStore>,
}

/// Build the application router.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/context", post(build_context))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn build_context(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(request): Json<ContextRequest>,
) -> Response {
    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let client_id = client_identity(&headers, peer);

    match state.limiter.admit(&client_id).await {
        Admission::Denied { retry_after } => {
            let secs = retry_after.as_secs();
            let body = Json(json!({
                "error": "rate limit exceeded",
                "retry_after_seconds": secs,
            }));
            (
                StatusCode::TOO_MANY_REQUESTS,
                [("retry-after", secs.to_string())],
                body,
            )
                .into_response()
        }
        Admission::Allowed { remaining } => {
            let bundle = state.pipeline.build_context(&request).await;
            (
                [("x-ratelimit-remaining", remaining.to_string())],
                Json(bundle),
            )
                .into_response()
        }
        Admission::AllowedDegraded { reason } => {
            tracing::warn!(client = %client_id, reason = %reason, "rate limiting degraded");
            let bundle = state.pipeline.build_context(&request).await;
            ([("x-ratelimit-degraded", "true")], Json(bundle)).into_response()
        }
    }
}

/// Client identity: an explicit header when a trusted proxy provides
/// one, otherwise the peer address.
fn client_identity(headers: &HeaderMap, addr: Option<SocketAddr>) -> String {
    if let Some(id) = headers.get("x-client-id").and_then(|v| v.to_str().ok()) {
        if !id.is_empty() {
            return id.to_string();
        }
    }
    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;
    use webcontext::{MemoryStore, PipelineConfig, RateLimitConfig};

    fn test_app(max_requests: u32) -> Router {
        let store = Arc::new(AppStore::Memory(MemoryStore::new()));
        let fetcher = Arc::new(HttpFetcher::new());
        let state = Arc::new(AppState {
            pipeline: Pipeline::new(Arc::clone(&store), fetcher, PipelineConfig::default()),
            limiter: FixedWindowLimiter::new(
                store,
                RateLimitConfig::new()
                    .with_max_requests(max_requests)
                    .with_window(Duration::from_secs(3600)),
            ),
        });
        build_app(state)
    }

    fn context_request() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/context")
            .header("content-type", "application/json")
            .header("x-client-id", "test-client")
            .body(Body::from(r#"{"message":"hi","urls":[]}"#))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = test_app(5);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn over_quota_requests_get_429_with_retry_after() {
        let app = test_app(1);

        let first = app.clone().oneshot(context_request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(
            first.headers().get("x-ratelimit-remaining").unwrap(),
            "0"
        );

        let second = app.oneshot(context_request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.headers().get("retry-after").unwrap(), "3600");

        let body = second.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["retry_after_seconds"], 3600);
    }

    #[tokio::test]
    async fn unconfigured_store_serves_degraded() {
        let store = Arc::new(AppStore::Unconfigured);
        let fetcher = Arc::new(HttpFetcher::new());
        let state = Arc::new(AppState {
            pipeline: Pipeline::new(Arc::clone(&store), fetcher, PipelineConfig::default()),
            limiter: FixedWindowLimiter::new(store, RateLimitConfig::new()),
        });
        let app = build_app(state);

        let response = app.oneshot(context_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-ratelimit-degraded").unwrap(),
            "true"
        );
    }
}
