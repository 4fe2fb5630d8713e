//! Utility modules for the threat detection service.
//! This module contains common utilities used across the application.

mod error;
mod logging;

pub use logging::{create_request_span, init_logging, log_block, log_rate_limit, log_store_degraded};

pub use error::{ThreatError, ThreatResult};
