use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{SecurityConfig, StoreFailurePolicy};
use crate::core::{
    BlockReason, BlockRegistry, ClientIdentity, FailureTracker, FingerprintTracker, RateTracker,
    RateVerdict,
};
use crate::store::CounterStore;
use crate::utils::{log_store_degraded, ThreatError};

/// One inbound request as seen by the decision engine
#[derive(Debug, Clone)]
pub struct Request {
    pub identity: ClientIdentity,
    pub method: String,
    pub path: String,
    /// Opaque device fingerprint supplied by an external classifier, if any
    pub fingerprint: Option<String>,
}

impl Request {
    pub fn new(identity: ClientIdentity, method: &str, path: &str) -> Self {
        Self {
            identity,
            method: method.to_string(),
            path: path.to_string(),
            fingerprint: None,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: &str) -> Self {
        self.fingerprint = Some(fingerprint.to_string());
        self
    }
}

/// Credentials presented on an authentication attempt
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Result of credential verification by the protected handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Failure,
}

/// Capability the engine invokes between the rate check and the failure
/// tracking. Credential comparison itself is out of scope here.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> AuthOutcome;
}

/// Optional fire-and-forget sink notified of every block decision, e.g. a
/// persistent blacklist table. The engine never depends on it for
/// correctness.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn notify_block(&self, identity: &ClientIdentity, reason: BlockReason);
}

/// Audit sink that records block decisions to the log
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn notify_block(&self, identity: &ClientIdentity, reason: BlockReason) {
        tracing::info!(
            identity = %identity,
            reason = %reason,
            event = "block_audit",
            timestamp = %chrono::Utc::now()
        );
    }
}

/// Terminal outcome for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Allow,
    RateLimited,
    Blocked,
    Unauthorized { remaining_attempts: u32 },
}

/// What the caller should do with the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub outcome: Outcome,
    pub http_status: u16,
    pub detail: String,
}

impl Decision {
    fn allow() -> Self {
        Self {
            outcome: Outcome::Allow,
            http_status: 200,
            detail: "request permitted".to_string(),
        }
    }

    fn rate_limited() -> Self {
        Self {
            outcome: Outcome::RateLimited,
            http_status: 429,
            detail: "rate limit exceeded".to_string(),
        }
    }

    fn blocked(detail: &str) -> Self {
        Self {
            outcome: Outcome::Blocked,
            http_status: 403,
            detail: detail.to_string(),
        }
    }

    fn unauthorized(remaining_attempts: u32) -> Self {
        Self {
            outcome: Outcome::Unauthorized { remaining_attempts },
            http_status: 401,
            detail: format!("invalid credentials - {remaining_attempts} attempts remaining"),
        }
    }
}

/// Orchestrates the block registry, rate tracker, and failure tracker for
/// every inbound request.
///
/// Holds no mutable state of its own; the counter store is the single
/// arbiter of shared state, so concurrent requests for one identity never
/// diverge. Store failures resolve through the configured policy instead of
/// failing the request pipeline.
pub struct ThreatDecisionEngine {
    rate_tracker: RateTracker,
    failure_tracker: FailureTracker,
    block_registry: BlockRegistry,
    fingerprints: FingerprintTracker,
    audit: Option<Arc<dyn AuditSink>>,
    config: SecurityConfig,
}

impl ThreatDecisionEngine {
    pub fn new(store: Arc<dyn CounterStore>, config: SecurityConfig) -> Self {
        Self {
            rate_tracker: RateTracker::new(
                Arc::clone(&store),
                config.anomaly_threshold,
                Duration::from_secs(config.rate_window_seconds),
            ),
            failure_tracker: FailureTracker::new(
                Arc::clone(&store),
                Duration::from_secs(config.block_ttl_seconds),
            ),
            block_registry: BlockRegistry::new(Arc::clone(&store)),
            fingerprints: FingerprintTracker::new(
                store,
                Duration::from_secs(config.fingerprint_ttl_seconds),
            ),
            audit: None,
            config,
        }
    }

    /// Attach a fire-and-forget audit sink for block decisions
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Pre-check every inbound request: block registry first, then the rate
    /// tracker. A blocked identity is rejected before any counter is touched.
    pub async fn decide(&self, request: &Request) -> Decision {
        let identity = &request.identity;

        match self.block_registry.is_blocked(identity).await {
            Ok(true) => return Decision::blocked("identity is currently blocked"),
            Ok(false) => {}
            Err(err) => {
                if let Some(decision) = self.degrade("is_blocked", &err) {
                    return decision;
                }
            }
        }

        match self.rate_tracker.check_and_record(identity).await {
            Ok(RateVerdict::Allowed) => {}
            Ok(RateVerdict::Anomalous) => {
                self.escalate(identity, BlockReason::RateAnomaly).await;
                return Decision::rate_limited();
            }
            Err(err) => {
                if let Some(decision) = self.degrade("check_and_record", &err) {
                    return decision;
                }
            }
        }

        if let Some(fingerprint) = &request.fingerprint {
            self.record_fingerprint(fingerprint, identity);
        }

        Decision::allow()
    }

    /// Full decision for an authentication attempt.
    ///
    /// The rate pre-check takes precedence over the authentication outcome:
    /// a rate-anomalous client presenting valid credentials is still
    /// rejected before its credentials are examined.
    pub async fn decide_auth(
        &self,
        request: &Request,
        credentials: &Credentials,
        authenticator: &dyn Authenticator,
    ) -> Decision {
        let pre_check = self.decide(request).await;
        if pre_check.outcome != Outcome::Allow {
            return pre_check;
        }

        let identity = &request.identity;
        match authenticator.authenticate(credentials).await {
            AuthOutcome::Success => {
                // Deletes the counter outright; success clears history
                if let Err(err) = self.failure_tracker.reset(identity).await {
                    self.degrade("reset", &err);
                }
                Decision::allow()
            }
            AuthOutcome::Failure => match self.failure_tracker.record_failure(identity).await {
                Ok(count) if count >= self.config.max_failed_attempts => {
                    self.escalate(identity, BlockReason::BruteForce).await;
                    Decision::blocked("too many failed attempts")
                }
                Ok(count) => {
                    Decision::unauthorized(self.config.max_failed_attempts.saturating_sub(count))
                }
                Err(err) => match self.degrade("record_failure", &err) {
                    Some(decision) => decision,
                    // Failure history is unknown while the store is down
                    None => Decision::unauthorized(self.config.max_failed_attempts),
                },
            },
        }
    }

    /// Write the block flag and notify the audit sink.
    ///
    /// A store failure here is logged and swallowed: the caller's terminal
    /// decision already rejects this request, and the next request resolves
    /// enforcement through the failure policy.
    async fn escalate(&self, identity: &ClientIdentity, reason: BlockReason) {
        let ttl = Duration::from_secs(self.config.block_ttl_seconds);
        if let Err(err) = self.block_registry.block(identity, reason, ttl).await {
            self.degrade("block", &err);
        }

        if let Some(sink) = &self.audit {
            let sink = Arc::clone(sink);
            let identity = identity.clone();
            tokio::spawn(async move {
                sink.notify_block(&identity, reason).await;
            });
        }
    }

    /// Resolve a store failure through the configured policy. Returns the
    /// terminal decision under fail-closed, `None` under fail-open.
    fn degrade(&self, operation: &str, err: &ThreatError) -> Option<Decision> {
        let policy = self.config.store_failure_policy;
        log_store_degraded(operation, policy.as_str(), &err.to_string());
        match policy {
            StoreFailurePolicy::FailOpen => None,
            StoreFailurePolicy::FailClosed => {
                Some(Decision::blocked("service degraded, failing closed"))
            }
        }
    }

    /// Informational only; runs detached so a slow store never delays the
    /// request it was observed on
    fn record_fingerprint(&self, fingerprint: &str, identity: &ClientIdentity) {
        let tracker = self.fingerprints.clone();
        let fingerprint = fingerprint.to_string();
        let identity = identity.clone();
        tokio::spawn(async move {
            if let Err(err) = tracker.record(&fingerprint, &identity).await {
                tracing::debug!(error = %err, "fingerprint record dropped");
            }
        });
    }
}
