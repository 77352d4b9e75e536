//! Fixed-window request limiter over the shared key-value store.
//!
//! The quota resets at a fixed point after a client's first request in
//! the window, as opposed to a sliding window: the expiry is set once,
//! when the counter is created, and the store's TTL does the reset.
//!
//! The limiter fails open. Availability of the primary service must
//! not depend on it, so an unreachable store admits the request and
//! reports the degradation in the decision itself.
//!
//! Known tolerance: the read and the increment are separate calls, so
//! two concurrent first requests from one client can both observe a
//! count below the limit. The increment itself is atomic, which bounds
//! the overcount to the number of in-flight requests.

use std::sync::Arc;
use std::time::Duration;

use crate::traits::kv::KvStore;
use crate::types::config::RateLimitConfig;

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Within quota
    Allowed { remaining: u32 },

    /// The store was unavailable; admitted without counting
    AllowedDegraded { reason: String },

    /// Over quota; retry after the window length
    Denied { retry_after: Duration },
}

impl Admission {
    /// Whether the request may proceed.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Admission::Denied { .. })
    }

    /// Retry hint in seconds, for `Retry-After` headers.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Admission::Denied { retry_after } => Some(retry_after.as_secs()),
            _ => None,
        }
    }
}

/// Fixed-window limiter keyed by client identity.
pub struct FixedWindowLimiter<S: KvStore> {
    store: Arc<S>,
    config: RateLimitConfig,
}

impl<S: KvStore> FixedWindowLimiter<S> {
    /// Create a limiter over a store.
    pub fn new(store: Arc<S>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    fn key(&self, client_id: &str) -> String {
        format!("{}:{}", self.config.key_prefix, client_id)
    }

    /// Decide whether a client's request is within quota, counting it
    /// if so.
    pub async fn admit(&self, client_id: &str) -> Admission {
        let key = self.key(client_id);
        let max = self.config.max_requests;

        let count = match self.store.get(&key).await {
            Ok(Some(raw)) => raw.parse::<i64>().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(client = %client_id, error = %e, "rate-limit store unreachable, failing open");
                return Admission::AllowedDegraded {
                    reason: e.to_string(),
                };
            }
        };

        if count >= i64::from(max) {
            tracing::debug!(client = %client_id, count, "rate limit exceeded");
            return Admission::Denied {
                retry_after: self.config.window,
            };
        }

        let new_count = match self.store.incr(&key).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(client = %client_id, error = %e, "rate-limit increment failed, failing open");
                return Admission::AllowedDegraded {
                    reason: e.to_string(),
                };
            }
        };

        // First request in the window starts the fixed expiry
        if new_count == 1 {
            if let Err(e) = self.store.expire(&key, self.config.window).await {
                tracing::warn!(client = %client_id, error = %e, "rate-limit window expiry not set");
                return Admission::AllowedDegraded {
                    reason: e.to_string(),
                };
            }
        }

        let remaining = u32::try_from(i64::from(max) - new_count).unwrap_or(0);
        Admission::Allowed { remaining }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::UnavailableStore;

    fn limiter_with(max: u32, window: Duration) -> FixedWindowLimiter<MemoryStore> {
        FixedWindowLimiter::new(
            Arc::new(MemoryStore::new()),
            RateLimitConfig::new()
                .with_max_requests(max)
                .with_window(window),
        )
    }

    #[tokio::test]
    async fn admits_exactly_the_budget_then_denies() {
        let limiter = limiter_with(3, Duration::from_secs(3600));

        assert_eq!(
            limiter.admit("client-a").await,
            Admission::Allowed { remaining: 2 }
        );
        assert_eq!(
            limiter.admit("client-a").await,
            Admission::Allowed { remaining: 1 }
        );
        assert_eq!(
            limiter.admit("client-a").await,
            Admission::Allowed { remaining: 0 }
        );

        let denied = limiter.admit("client-a").await;
        assert!(!denied.is_allowed());
        assert!(denied.retry_after_secs().unwrap() > 0);
    }

    #[tokio::test]
    async fn window_expiry_resets_the_count() {
        let store = Arc::new(MemoryStore::new());
        let limiter = FixedWindowLimiter::new(
            Arc::clone(&store),
            RateLimitConfig::new()
                .with_max_requests(2)
                .with_window(Duration::from_secs(60)),
        );

        limiter.admit("client-a").await;
        limiter.admit("client-a").await;
        assert!(!limiter.admit("client-a").await.is_allowed());

        store.advance(Duration::from_secs(61));
        assert_eq!(
            limiter.admit("client-a").await,
            Admission::Allowed { remaining: 1 }
        );
    }

    #[tokio::test]
    async fn clients_are_counted_independently() {
        let limiter = limiter_with(1, Duration::from_secs(3600));

        assert!(limiter.admit("client-a").await.is_allowed());
        assert!(!limiter.admit("client-a").await.is_allowed());
        assert!(limiter.admit("client-b").await.is_allowed());
    }

    #[tokio::test]
    async fn unreachable_store_fails_open() {
        let limiter = FixedWindowLimiter::new(Arc::new(UnavailableStore), RateLimitConfig::new());

        for _ in 0..100 {
            let decision = limiter.admit("client-a").await;
            assert!(matches!(decision, Admission::AllowedDegraded { .. }));
        }
    }
}
