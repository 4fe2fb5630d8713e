use std::sync::Arc;

use anyhow::Context;

use threat_detection_service::config::{load_config, StoreFailurePolicy};
use threat_detection_service::engine::{ThreatDecisionEngine, TracingAuditSink};
use threat_detection_service::server::{self, StaticAuthenticator};
use threat_detection_service::store::{CounterStore, MemoryStore, RedisStore};
use threat_detection_service::utils::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging();
    tracing::info!("Starting threat detection service...");

    // Load configuration
    let settings = load_config().context("loading configuration")?;
    tracing::info!(
        host = %settings.server.host,
        port = %settings.server.port,
        policy = %settings.security.store_failure_policy.as_str(),
        "Configuration loaded"
    );

    // Connect the counter store. Under fail-closed a connect failure stops
    // startup; under fail-open the service continues in limited mode on an
    // in-process store.
    let store: Arc<dyn CounterStore> = match RedisStore::connect(&settings.redis).await {
        Ok(store) => {
            tracing::info!(url = %settings.redis.url, "Counter store connected");
            Arc::new(store)
        }
        Err(err) => match settings.security.store_failure_policy {
            StoreFailurePolicy::FailClosed => {
                return Err(err).context("connecting to counter store");
            }
            StoreFailurePolicy::FailOpen => {
                tracing::warn!(
                    error = %err,
                    "Counter store unreachable, continuing in limited mode"
                );
                Arc::new(MemoryStore::new())
            }
        },
    };

    let engine = Arc::new(
        ThreatDecisionEngine::new(Arc::clone(&store), settings.security.clone())
            .with_audit_sink(Arc::new(TracingAuditSink)),
    );

    // Demo credential check; deployments wire in their own Authenticator
    let authenticator = Arc::new(StaticAuthenticator::new("admin", "securePass123!"));

    server::serve(Arc::new(settings), engine, store, authenticator)
        .await
        .context("serving HTTP")?;

    Ok(())
}
