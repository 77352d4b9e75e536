// Main entry point for the context API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;
use server_core::{build_app, AppState, AppStore, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webcontext::{
    CacheConfig, FixedWindowLimiter, HttpFetcher, Pipeline, PipelineConfig, RateLimitConfig,
    RedisStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,webcontext=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting URL context API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect the shared store. A missing or unreachable Redis never
    // prevents startup; the cache and limiter fail open.
    let store = match &config.redis_url {
        Some(url) => match RedisStore::connect(url).await {
            Ok(store) => {
                tracing::info!("Redis connected");
                AppStore::Redis(store)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unreachable, running without cache or rate limits");
                AppStore::Unconfigured
            }
        },
        None => {
            tracing::warn!("REDIS_URL not set, running without cache or rate limits");
            AppStore::Unconfigured
        }
    };
    let store = Arc::new(store);

    let pipeline_config = PipelineConfig::default()
        .with_cache(CacheConfig::new().with_ttl(Duration::from_secs(config.cache_ttl_secs)));
    let mut pipeline = Pipeline::new(Arc::clone(&store), Arc::new(HttpFetcher::new()), pipeline_config);
    if let Some(key) = config.video_api_key.clone() {
        pipeline = pipeline.with_video_api_key(SecretString::from(key));
    }

    let limiter = FixedWindowLimiter::new(
        Arc::clone(&store),
        RateLimitConfig::new()
            .with_max_requests(config.rate_limit_max_requests)
            .with_window(Duration::from_secs(config.rate_limit_window_secs)),
    );

    let app = build_app(Arc::new(AppState { pipeline, limiter }));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
