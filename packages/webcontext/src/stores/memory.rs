//! In-memory key-value store for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::error::StoreResult;
use crate::traits::kv::KvStore;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

/// In-memory store with TTL semantics matching the networked backend.
///
/// Useful for tests and development; data is lost on restart. Time can
/// be advanced manually so TTL expiry is testable without sleeping.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    clock_offset: RwLock<Duration>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock_offset: RwLock::new(Duration::ZERO),
        }
    }

    /// Advance the store's clock, expiring entries whose TTL lapses.
    pub fn advance(&self, by: Duration) {
        *self.clock_offset.write().unwrap() += by;
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = self.now();
        self.entries
            .read()
            .unwrap()
            .values()
            .filter(|e| e.expires_at.map_or(true, |at| at > now))
            .count()
    }

    /// Whether the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn now(&self) -> Instant {
        Instant::now() + *self.clock_offset.read().unwrap()
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = self.now();
        self.entries
            .read()
            .unwrap()
            .get(key)
            .filter(|e| e.expires_at.map_or(true, |at| at > now))
            .map(|e| e.value.clone())
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.live_value(key))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let expires_at = Some(self.now() + ttl);
        self.entries.write().unwrap().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let now = self.now();
        let mut entries = self.entries.write().unwrap();

        let (current, expires_at) = match entries.get(key) {
            Some(e) if e.expires_at.map_or(true, |at| at > now) => {
                (e.value.parse::<i64>().unwrap_or(0), e.expires_at)
            }
            // Absent or lapsed: the counter restarts
            _ => (0, None),
        };

        let next = current + 1;
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        let expires_at = Some(self.now() + ttl);
        if let Some(entry) = self.entries.write().unwrap().get_mut(key) {
            entry.expires_at = expires_at;
        }
        Ok(())
    }
}
