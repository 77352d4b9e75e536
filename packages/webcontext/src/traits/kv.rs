//! Shared key-value store seam for the cache and the rate limiter.
//!
//! The store is an externally-owned resource; the pipeline only touches
//! it through these four narrow operations and never assumes exclusive
//! access.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::StoreResult;

/// GET / SET-with-expiry / INCREMENT / EXPIRE over a shared store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a value; `None` when absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value with a time-to-live.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Atomically increment a counter, creating it at 1, and return the
    /// post-increment value. Counters created this way have no expiry
    /// until [`KvStore::expire`] is called.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Set a key's time-to-live without touching its value.
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()>;
}
