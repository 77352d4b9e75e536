use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared store for the cache and the rate limiter. Absent means
    /// both features run degraded (fail open).
    pub redis_url: Option<String>,
    pub port: u16,
    /// Video metadata API key; absent triggers the scrape fallback
    pub video_api_key: Option<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_max_requests: u32,
    pub cache_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            redis_url: env::var("REDIS_URL").ok(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            video_api_key: env::var("VIDEO_API_KEY").ok(),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("RATE_LIMIT_WINDOW_SECS must be a valid number")?,
            rate_limit_max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .context("RATE_LIMIT_MAX_REQUESTS must be a valid number")?,
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("CACHE_TTL_SECS must be a valid number")?,
        })
    }
}
