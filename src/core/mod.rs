//! Core functionality for the threat detection service.
//! This module contains the trackers and registries the decision engine
//! composes: rate tracking, failure tracking, block registry, and
//! fingerprint observability.

mod block_registry;
mod failure_tracker;
mod fingerprint;
mod identity;
mod keys;
mod rate_tracker;

pub use block_registry::{BlockReason, BlockRegistry};
pub use failure_tracker::FailureTracker;
pub use fingerprint::FingerprintTracker;
pub use identity::ClientIdentity;
pub use keys::{scope_key, KeyScope};
pub use rate_tracker::{RateTracker, RateVerdict};
