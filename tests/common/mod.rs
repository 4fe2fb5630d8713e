#![allow(dead_code)] // each test binary uses its own subset of these helpers

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use threat_detection_service::config::SecurityConfig;
use threat_detection_service::core::ClientIdentity;
use threat_detection_service::engine::{
    AuthOutcome, Authenticator, Credentials, Request, ThreatDecisionEngine,
};
use threat_detection_service::store::{CounterStore, MemoryStore};
use threat_detection_service::utils::{ThreatError, ThreatResult};

/// Authenticator accepting exactly one username/password pair
pub struct FixedAuthenticator {
    username: String,
    password: String,
}

impl FixedAuthenticator {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

#[async_trait]
impl Authenticator for FixedAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> AuthOutcome {
        if credentials.username == self.username && credentials.password == self.password {
            AuthOutcome::Success
        } else {
            AuthOutcome::Failure
        }
    }
}

/// Store double simulating a complete outage
pub struct UnavailableStore;

#[async_trait]
impl CounterStore for UnavailableStore {
    async fn increment_and_get(&self, _key: &str) -> ThreatResult<i64> {
        Err(ThreatError::StoreUnavailable("connection refused".into()))
    }

    async fn set_expiry(&self, _key: &str, _ttl: Duration) -> ThreatResult<()> {
        Err(ThreatError::StoreUnavailable("connection refused".into()))
    }

    async fn set_with_expiry(&self, _key: &str, _value: &str, _ttl: Duration) -> ThreatResult<()> {
        Err(ThreatError::StoreUnavailable("connection refused".into()))
    }

    async fn exists(&self, _key: &str) -> ThreatResult<bool> {
        Err(ThreatError::StoreUnavailable("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> ThreatResult<()> {
        Err(ThreatError::StoreUnavailable("connection refused".into()))
    }
}

/// Engine over a fresh in-memory store with the given security settings
pub fn engine_with_memory_store(config: SecurityConfig) -> (Arc<ThreatDecisionEngine>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(ThreatDecisionEngine::new(
        store.clone() as Arc<dyn CounterStore>,
        config,
    ));
    (engine, store)
}

pub fn identity(addr: &str) -> ClientIdentity {
    ClientIdentity::new(addr).expect("valid test identity")
}

pub fn request(addr: &str, path: &str) -> Request {
    Request::new(identity(addr), "GET", path)
}

pub fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

/// Generate a random IP address so tests never share counters
pub fn random_ip() -> String {
    format!(
        "{}.{}.{}.{}",
        rand::random::<u8>(),
        rand::random::<u8>(),
        rand::random::<u8>(),
        rand::random::<u8>()
    )
}
