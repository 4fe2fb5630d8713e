use std::fmt;

use crate::utils::{ThreatError, ThreatResult};

/// Upper bound on an accounting key; anything longer is hostile input
const MAX_IDENTITY_LEN: usize = 128;

/// Accounting key for a request's originator, typically the client's
/// network address, optionally combined with a behavioral fingerprint.
/// Immutable per request; not globally unique across NAT but treated as
/// the unit of accounting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    /// Validate and build an identity from a raw client key
    pub fn new(raw: &str) -> ThreatResult<Self> {
        if raw.is_empty() {
            return Err(ThreatError::InvalidIdentity("empty identity".to_string()));
        }
        if raw.len() > MAX_IDENTITY_LEN {
            return Err(ThreatError::InvalidIdentity(format!(
                "identity exceeds {MAX_IDENTITY_LEN} bytes"
            )));
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ThreatError::InvalidIdentity(
                "identity contains whitespace or control characters".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Combine a network address with an opaque device fingerprint
    pub fn with_fingerprint(addr: &str, fingerprint: &str) -> ThreatResult<Self> {
        Self::new(&format!("{addr}#{fingerprint}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
