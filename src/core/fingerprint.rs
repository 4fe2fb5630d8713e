use std::sync::Arc;
use std::time::Duration;

use crate::core::keys::{scope_key, KeyScope};
use crate::core::ClientIdentity;
use crate::store::CounterStore;
use crate::utils::ThreatResult;

/// Records which identities a device fingerprint has been seen from.
///
/// Purely an observability side-table: never consulted for blocking
/// decisions. The fingerprint itself is opaque input from an external
/// classifier or edge header.
#[derive(Clone)]
pub struct FingerprintTracker {
    store: Arc<dyn CounterStore>,
    ttl: Duration,
}

impl FingerprintTracker {
    pub fn new(store: Arc<dyn CounterStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Record an observed (fingerprint, identity) pair with the retention TTL
    pub async fn record(&self, fingerprint: &str, identity: &ClientIdentity) -> ThreatResult<()> {
        // One key per pair; the store contract has no set type
        let key = format!(
            "{}:{}",
            scope_key(KeyScope::Fingerprint, identity),
            fingerprint
        );
        self.store
            .set_with_expiry(&key, identity.as_str(), self.ttl)
            .await
    }
}
