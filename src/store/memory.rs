use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::store::CounterStore;
use crate::utils::{ThreatError, ThreatResult};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline <= now)
    }
}

/// In-process counter store.
///
/// Serves as the "limited mode" fallback when Redis is unreachable at
/// startup under the fail-open policy, and as the test backend. A single
/// mutex makes increments atomic; TTL checks happen lazily on access, no
/// background sweep.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn increment_and_get(&self, key: &str) -> ThreatResult<i64> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let current = match entries.get(key) {
            Some(entry) if !entry.expired(now) => entry
                .value
                .parse::<i64>()
                .map_err(|_| ThreatError::Internal(format!("non-numeric counter at {key}")))?,
            _ => 0,
        };

        let next = current + 1;
        // An expired entry's TTL does not carry over into the fresh window
        let expires_at = entries
            .get(key)
            .filter(|entry| !entry.expired(now))
            .and_then(|entry| entry.expires_at);
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at,
            },
        );

        Ok(next)
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> ThreatResult<()> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        if let Some(entry) = entries.get_mut(key) {
            if !entry.expired(now) {
                entry.expires_at = Some(now + ttl);
            }
        }
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> ThreatResult<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> ThreatResult<bool> {
        let entries = self.entries.lock().await;
        Ok(matches!(entries.get(key), Some(entry) if !entry.expired(Instant::now())))
    }

    async fn delete(&self, key: &str) -> ThreatResult<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }
}
