//! Expiring counter store abstraction.
//! All shared state lives behind this contract; the engine holds no
//! in-process mutable state of its own.

mod memory;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;

use crate::utils::ThreatResult;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Contract required of the backing key-value store.
///
/// `increment_and_get` must be atomic under concurrent callers: two
/// simultaneous increments on the same key may never observe the same
/// post-increment value. Expired keys behave as if they never existed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment a counter, creating it at 0 if absent, and
    /// return the post-increment value
    async fn increment_and_get(&self, key: &str) -> ThreatResult<i64>;

    /// Set or reset a TTL on an existing key
    async fn set_expiry(&self, key: &str, ttl: Duration) -> ThreatResult<()>;

    /// Unconditionally set a key's value with a TTL
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> ThreatResult<()>;

    /// Check whether a key exists and has not expired
    async fn exists(&self, key: &str) -> ThreatResult<bool>;

    /// Remove a key immediately
    async fn delete(&self, key: &str) -> ThreatResult<()>;
}
