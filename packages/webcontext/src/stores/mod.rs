//! Key-value store implementations.
//!
//! Available backends:
//! - `MemoryStore` - In-memory store with TTL bookkeeping, for tests
//!   and development
//! - `RedisStore` - Redis-backed store with a bounded timeout on every
//!   call

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;
