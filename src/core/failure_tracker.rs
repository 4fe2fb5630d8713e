use std::sync::Arc;
use std::time::Duration;

use crate::core::keys::{scope_key, KeyScope};
use crate::core::ClientIdentity;
use crate::store::CounterStore;
use crate::utils::ThreatResult;

/// Counts consecutive failed authentication attempts per identity.
///
/// The first failure arms a lockout-window TTL so an idle client's failure
/// history decays on its own. A successful login deletes the counter
/// outright, which is distinct from letting it expire.
pub struct FailureTracker {
    store: Arc<dyn CounterStore>,
    lockout_window: Duration,
}

impl FailureTracker {
    pub fn new(store: Arc<dyn CounterStore>, lockout_window: Duration) -> Self {
        Self {
            store,
            lockout_window,
        }
    }

    /// Record one failed attempt and return the new failure count
    pub async fn record_failure(&self, identity: &ClientIdentity) -> ThreatResult<u32> {
        let key = scope_key(KeyScope::Failure, identity);
        let count = self.store.increment_and_get(&key).await?;

        if count == 1 {
            self.store.set_expiry(&key, self.lockout_window).await?;
        }

        Ok(count.clamp(0, i64::from(u32::MAX)) as u32)
    }

    /// Clear the failure history after a successful authentication
    pub async fn reset(&self, identity: &ClientIdentity) -> ThreatResult<()> {
        let key = scope_key(KeyScope::Failure, identity);
        self.store.delete(&key).await
    }
}
