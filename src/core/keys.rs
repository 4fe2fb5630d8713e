use crate::core::ClientIdentity;

/// Namespaces for store keys. One scope per tracker keeps the trackers
/// from colliding on the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    /// Request counter for the fixed rate window
    Rate,
    /// Consecutive failed login attempts
    Failure,
    /// Active block flag
    Block,
    /// Observed fingerprint pair, informational only
    Fingerprint,
}

impl KeyScope {
    fn prefix(&self) -> &'static str {
        match self {
            KeyScope::Rate => "rate",
            KeyScope::Failure => "failed",
            KeyScope::Block => "blocked",
            KeyScope::Fingerprint => "fingerprint",
        }
    }
}

/// Build the store key for an identity within a scope
pub fn scope_key(scope: KeyScope, identity: &ClientIdentity) -> String {
    format!("{}:{}", scope.prefix(), identity.as_str())
}
