use std::future::Future;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use async_trait::async_trait;

use crate::config::RedisConfig;
use crate::store::CounterStore;
use crate::utils::{ThreatError, ThreatResult};

/// Counter store backed by Redis, shared across service instances.
///
/// Every operation runs under a deadline so a stalled connection degrades
/// into a `StoreTimeout` instead of wedging the request.
pub struct RedisStore {
    /// Multiplexed connection with automatic reconnection
    conn: ConnectionManager,
    /// Deadline for a single store operation
    op_timeout: Duration,
}

impl RedisStore {
    /// Connect to Redis and validate the connection
    pub async fn connect(config: &RedisConfig) -> ThreatResult<Self> {
        let client = Client::open(config.url.as_str())?;
        let op_timeout = Duration::from_millis(config.operation_timeout_ms);

        let conn = tokio::time::timeout(op_timeout, client.get_tokio_connection_manager())
            .await
            .map_err(|_| ThreatError::StoreTimeout(op_timeout))??;

        Ok(Self { conn, op_timeout })
    }

    /// Run a store operation under the configured deadline
    async fn bounded<T, F>(&self, fut: F) -> ThreatResult<T>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(ThreatError::from),
            Err(_) => Err(ThreatError::StoreTimeout(self.op_timeout)),
        }
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn increment_and_get(&self, key: &str) -> ThreatResult<i64> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.incr(key, 1).await }).await
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> ThreatResult<()> {
        let mut conn = self.conn.clone();
        let seconds = ttl.as_secs() as usize;
        self.bounded(async move { conn.expire(key, seconds).await })
            .await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> ThreatResult<()> {
        let mut conn = self.conn.clone();
        let seconds = ttl.as_secs() as usize;
        self.bounded(async move { conn.set_ex(key, value, seconds).await })
            .await
    }

    async fn exists(&self, key: &str) -> ThreatResult<bool> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.exists(key).await }).await
    }

    async fn delete(&self, key: &str) -> ThreatResult<()> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.del(key).await }).await
    }
}
