//! HTTP server over the content pipeline.
//!
//! Wires the pipeline, cache, and rate limiter to an axum router.
//! Redis is optional: without it the server still runs, with caching
//! and rate limiting degraded.

pub mod config;
pub mod routes;
pub mod store;

pub use config::Config;
pub use routes::{build_app, AppState};
pub use store::AppStore;
