use serde::Deserialize;

/// Configuration settings for the threat detection service
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Counter store (Redis) configuration
    pub redis: RedisConfig,
    /// Threat detection thresholds and policies
    pub security: SecurityConfig,
    /// Server configuration
    pub server: ServerConfig,
}

/// Redis configuration settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,
    /// Deadline for a single store operation, in milliseconds
    pub operation_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            operation_timeout_ms: 1000,
        }
    }
}

/// Behavior when the counter store is unreachable mid-request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreFailurePolicy {
    /// Allow the request and log the degradation; blocking during an
    /// outage amplifies denial of service
    FailOpen,
    /// Reject the request while the store is down
    FailClosed,
}

impl StoreFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreFailurePolicy::FailOpen => "fail_open",
            StoreFailurePolicy::FailClosed => "fail_closed",
        }
    }
}

impl Default for StoreFailurePolicy {
    fn default() -> Self {
        StoreFailurePolicy::FailOpen
    }
}

/// Threat detection configuration settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Requests per rate window before an identity is considered anomalous
    pub anomaly_threshold: u32,
    /// Fixed rate window length in seconds
    pub rate_window_seconds: u64,
    /// Failed login attempts before an identity is blocked
    pub max_failed_attempts: u32,
    /// How long a block lasts, in seconds
    pub block_ttl_seconds: u64,
    /// How long fingerprint observations are retained, in seconds
    pub fingerprint_ttl_seconds: u64,
    /// What to do when the counter store is unreachable
    pub store_failure_policy: StoreFailurePolicy,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: 15,
            rate_window_seconds: 60,
            max_failed_attempts: 5,
            block_ttl_seconds: 300,
            fingerprint_ttl_seconds: 3600,
            store_failure_policy: StoreFailurePolicy::default(),
        }
    }
}

/// Server configuration settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind the server to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Settings {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        // Add environment variables with prefix "APP_", nested fields
        // separated by "__" (e.g. APP_SECURITY__ANOMALY_THRESHOLD)
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Deserialize into our Settings struct; serde defaults fill the gaps
        config.try_deserialize()
    }
}
