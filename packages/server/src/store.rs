//! The server's store selection.
//!
//! One concrete type over the backends the server can run with, so the
//! pipeline and limiter stay monomorphic. `Unconfigured` makes every
//! call fail, which the library's fail-open paths turn into degraded
//! (uncached, unlimited) operation.

use async_trait::async_trait;
use std::time::Duration;

use webcontext::error::{StoreError, StoreResult};
use webcontext::{KvStore, MemoryStore, RedisStore};

pub enum AppStore {
    Redis(RedisStore),
    /// In-process store for development and tests
    Memory(MemoryStore),
    /// No backend available; cache and limiter run degraded
    Unconfigured,
}

#[async_trait]
impl KvStore for AppStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self {
            AppStore::Redis(s) => s.get(key).await,
            AppStore::Memory(s) => s.get(key).await,
            AppStore::Unconfigured => Err(StoreError::Unconfigured),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        match self {
            AppStore::Redis(s) => s.set_ex(key, value, ttl).await,
            AppStore::Memory(s) => s.set_ex(key, value, ttl).await,
            AppStore::Unconfigured => Err(StoreError::Unconfigured),
        }
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        match self {
            AppStore::Redis(s) => s.incr(key).await,
            AppStore::Memory(s) => s.incr(key).await,
            AppStore::Unconfigured => Err(StoreError::Unconfigured),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        match self {
            AppStore::Redis(s) => s.expire(key, ttl).await,
            AppStore::Memory(s) => s.expire(key, ttl).await,
            AppStore::Unconfigured => Err(StoreError::Unconfigured),
        }
    }
}
