use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::keys::{scope_key, KeyScope};
use crate::core::ClientIdentity;
use crate::store::CounterStore;
use crate::utils::{log_block, ThreatResult};

/// Why an identity was blocked. Stored with the block flag for
/// diagnostics only; enforcement never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Crossed the request-rate anomaly threshold
    RateAnomaly,
    /// Exhausted the allowed failed login attempts
    BruteForce,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::RateAnomaly => "rate_anomaly",
            BlockReason::BruteForce => "brute_force",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authoritative record of which identities are currently blocked.
///
/// Consulted before any other processing. Block lifetimes are delegated
/// entirely to the store's TTL mechanism; there is no manual unblock path.
pub struct BlockRegistry {
    store: Arc<dyn CounterStore>,
}

impl BlockRegistry {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Write a block flag for the identity.
    ///
    /// Overwrites any existing flag and resets the TTL from now; at most one
    /// active block per identity exists at a time.
    pub async fn block(
        &self,
        identity: &ClientIdentity,
        reason: BlockReason,
        ttl: Duration,
    ) -> ThreatResult<()> {
        let key = scope_key(KeyScope::Block, identity);
        self.store
            .set_with_expiry(&key, reason.as_str(), ttl)
            .await?;
        log_block(identity.as_str(), reason.as_str(), ttl.as_secs());
        Ok(())
    }

    /// Pure existence check against the store
    pub async fn is_blocked(&self, identity: &ClientIdentity) -> ThreatResult<bool> {
        let key = scope_key(KeyScope::Block, identity);
        self.store.exists(&key).await
    }
}
