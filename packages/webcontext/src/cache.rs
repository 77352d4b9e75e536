//! Content-addressed extraction cache over the shared key-value store.
//!
//! Keys identify the input (`content:<url>`), values are JSON-encoded
//! extraction results with a store-side TTL. Only successful
//! extractions are stored. The cache fails open: any store error is a
//! miss and the pipeline recomputes.

use std::future::Future;
use std::sync::Arc;

use crate::error::StoreError;
use crate::traits::kv::KvStore;
use crate::types::{config::CacheConfig, extraction::ExtractionResult};

/// How a lookup resolved. `Bypass` means the store was unavailable and
/// the value was recomputed without caching; callers can surface it in
/// telemetry instead of it being invisible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
    Bypass { reason: String },
}

/// URL-keyed extraction cache.
pub struct ContentCache<S: KvStore> {
    store: Arc<S>,
    config: CacheConfig,
}

impl<S: KvStore> ContentCache<S> {
    /// Create a cache over a store.
    pub fn new(store: Arc<S>, config: CacheConfig) -> Self {
        Self { store, config }
    }

    fn key(&self, url: &str) -> String {
        format!("{}:{}", self.config.key_prefix, url)
    }

    /// Return the cached result for `url`, or run `compute`, store its
    /// output with the configured TTL, and return it.
    pub async fn get_or_compute<F, Fut>(&self, url: &str, compute: F) -> (ExtractionResult, CacheOutcome)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ExtractionResult>,
    {
        let key = self.key(url);

        let mut bypass_reason: Option<String> = None;
        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<ExtractionResult>(&raw) {
                Ok(result) => {
                    tracing::debug!(url = %url, "cache hit");
                    return (result, CacheOutcome::Hit);
                }
                Err(e) => {
                    // Stale encoding; recompute and overwrite
                    tracing::warn!(url = %url, error = %e, "cache value undecodable, recomputing");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "cache read failed, recomputing");
                bypass_reason = Some(e.to_string());
            }
        }

        let result = compute().await;

        // Only successful extractions are stored; caching a downgraded
        // failure would replay it for the whole TTL after the target
        // recovers
        if bypass_reason.is_none() && !result.failed && !result.is_empty() {
            if let Err(e) = self.write(&key, &result).await {
                tracing::warn!(url = %url, error = %e, "cache write failed");
                bypass_reason = Some(e.to_string());
            }
        }

        let outcome = match bypass_reason {
            Some(reason) => CacheOutcome::Bypass { reason },
            None => CacheOutcome::Miss,
        };
        (result, outcome)
    }

    async fn write(&self, key: &str, result: &ExtractionResult) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(result)?;
        self.store.set_ex(key, &encoded, self.config.ttl).await
    }
}
