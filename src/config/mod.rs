//! Configuration management for the threat detection service.
//! This module handles loading and managing configuration settings
//! from environment variables.

mod settings;

pub use settings::{RedisConfig, SecurityConfig, ServerConfig, Settings, StoreFailurePolicy};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, config::ConfigError>;

/// Load the application configuration
pub fn load_config() -> ConfigResult<Settings> {
    Settings::load()
}
