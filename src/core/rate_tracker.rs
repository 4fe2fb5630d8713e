use std::sync::Arc;
use std::time::Duration;

use crate::core::keys::{scope_key, KeyScope};
use crate::core::ClientIdentity;
use crate::store::CounterStore;
use crate::utils::{log_rate_limit, ThreatResult};

/// Outcome of a rate check for a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateVerdict {
    /// Request fits inside the current window
    Allowed,
    /// Identity crossed the anomaly threshold within one window
    Anomalous,
}

/// Counts requests per identity in a fixed window and reports anomaly
/// crossings. All state lives in the store; the tracker itself is stateless.
pub struct RateTracker {
    store: Arc<dyn CounterStore>,
    anomaly_threshold: u32,
    window: Duration,
}

impl RateTracker {
    pub fn new(store: Arc<dyn CounterStore>, anomaly_threshold: u32, window: Duration) -> Self {
        Self {
            store,
            anomaly_threshold,
            window,
        }
    }

    /// Count this request against the identity's current window.
    ///
    /// The first request of a fresh window sets the window TTL, so every
    /// request in the window shares one expiry (fixed window, not a sliding
    /// log). If two concurrent callers both observe count == 1, both set the
    /// same TTL; last write wins with the same value.
    pub async fn check_and_record(&self, identity: &ClientIdentity) -> ThreatResult<RateVerdict> {
        let key = scope_key(KeyScope::Rate, identity);
        let count = self.store.increment_and_get(&key).await?;

        if count == 1 {
            self.store.set_expiry(&key, self.window).await?;
        }

        let anomalous = count > i64::from(self.anomaly_threshold);
        log_rate_limit(identity.as_str(), count, anomalous);

        if anomalous {
            Ok(RateVerdict::Anomalous)
        } else {
            Ok(RateVerdict::Allowed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn tracker(threshold: u32, window: Duration) -> RateTracker {
        RateTracker::new(Arc::new(MemoryStore::new()), threshold, window)
    }

    #[tokio::test]
    async fn allows_up_to_the_threshold_then_flags() {
        let tracker = tracker(3, Duration::from_secs(60));
        let identity = ClientIdentity::new("10.0.0.1").unwrap();

        for _ in 0..3 {
            assert_eq!(
                tracker.check_and_record(&identity).await.unwrap(),
                RateVerdict::Allowed
            );
        }
        assert_eq!(
            tracker.check_and_record(&identity).await.unwrap(),
            RateVerdict::Anomalous
        );
    }

    #[tokio::test]
    async fn identities_are_counted_separately() {
        let tracker = tracker(1, Duration::from_secs(60));
        let a = ClientIdentity::new("10.0.0.1").unwrap();
        let b = ClientIdentity::new("10.0.0.2").unwrap();

        assert_eq!(
            tracker.check_and_record(&a).await.unwrap(),
            RateVerdict::Allowed
        );
        assert_eq!(
            tracker.check_and_record(&b).await.unwrap(),
            RateVerdict::Allowed
        );
    }

    #[tokio::test]
    async fn window_expiry_restarts_the_count() {
        let tracker = tracker(1, Duration::from_millis(30));
        let identity = ClientIdentity::new("10.0.0.1").unwrap();

        tracker.check_and_record(&identity).await.unwrap();
        assert_eq!(
            tracker.check_and_record(&identity).await.unwrap(),
            RateVerdict::Anomalous
        );

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(
            tracker.check_and_record(&identity).await.unwrap(),
            RateVerdict::Allowed
        );
    }
}
