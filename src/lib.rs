//! Threat detection and rate/block decision engine for protecting HTTP APIs.
//!
//! Combines per-client request-rate limiting, brute-force login protection,
//! and device-fingerprint observability, all backed by an expiring
//! key-value store. The [`engine::ThreatDecisionEngine`] resolves every
//! request to one of Allow, RateLimited, Blocked, or Unauthorized.

pub mod config;
pub mod core;
pub mod engine;
pub mod server;
pub mod store;
pub mod utils;
