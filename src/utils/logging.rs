use std::env;
use tracing_subscriber::EnvFilter;

/// Initialize the logging system with the specified log level
pub fn init_logging() {
    // Get the log level from environment variable or default to INFO
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    // Create a custom environment filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Initialize the subscriber; ignore the error if a test already installed one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .try_init();
}

/// Create a new span for tracking request context
pub fn create_request_span(request_id: &str) -> tracing::Span {
    tracing::info_span!(
        "request",
        request_id = %request_id,
        timestamp = %chrono::Utc::now()
    )
}

/// Log a rate limit check
pub fn log_rate_limit(identity: &str, count: i64, anomalous: bool) {
    if anomalous {
        tracing::warn!(
            identity = %identity,
            count = %count,
            event = "rate_anomaly",
            timestamp = %chrono::Utc::now()
        );
    } else {
        tracing::debug!(
            identity = %identity,
            count = %count,
            event = "rate_check",
            timestamp = %chrono::Utc::now()
        );
    }
}

/// Log a block decision
pub fn log_block(identity: &str, reason: &str, ttl_seconds: u64) {
    tracing::warn!(
        identity = %identity,
        reason = %reason,
        ttl_seconds = %ttl_seconds,
        event = "identity_blocked",
        timestamp = %chrono::Utc::now()
    );
}

/// Log a store failure handled by the configured degradation policy
pub fn log_store_degraded(operation: &str, policy: &str, error: &str) {
    tracing::error!(
        operation = %operation,
        policy = %policy,
        error = %error,
        event = "store_degraded",
        timestamp = %chrono::Utc::now()
    );
}
