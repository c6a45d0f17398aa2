//! Stable identifiers used across agent logs and exports

use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Long-term stable identifier of one agent, independent of any session.
///
/// Derived from the agent's public key by `accord-identity`; two sessions
/// that load the same identity file see the same `AgentId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    /// Create an agent id from a raw string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque session identifier shared by every event of one session.
///
/// Generated once at session construction from an explicit random source,
/// never from implicit global state, so tests can supply a seeded generator
/// and get reproducible ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh `sess_<16 hex>` id from the given random source
    pub fn generate(rng: &mut dyn RngCore) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let raw = uuid::Builder::from_random_bytes(bytes).into_uuid();
        let hex = raw.simple().to_string();
        Self(format!("sess_{}", &hex[..16]))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash of one event in an agent's log.
///
/// `EventHash::genesis()` is the sentinel used as `previous_hash` of the
/// first event in an empty chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventHash(pub String);

/// Sentinel `previous_hash` value for the first event of a chain
pub const GENESIS: &str = "genesis";

impl EventHash {
    /// Create an event hash from a hex digest string
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// The genesis sentinel for an empty chain
    pub fn genesis() -> Self {
        Self(GENESIS.to_string())
    }

    /// Whether this hash is the genesis sentinel
    pub fn is_genesis(&self) -> bool {
        self.0 == GENESIS
    }

    /// Borrow the hash as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn session_ids_are_prefixed_and_sized() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let id = SessionId::generate(&mut rng);
        assert!(id.as_str().starts_with("sess_"));
        assert_eq!(id.as_str().len(), "sess_".len() + 16);
    }

    #[test]
    fn seeded_rng_gives_reproducible_session_ids() {
        let a = SessionId::generate(&mut ChaCha20Rng::seed_from_u64(42));
        let b = SessionId::generate(&mut ChaCha20Rng::seed_from_u64(42));
        let c = SessionId::generate(&mut ChaCha20Rng::seed_from_u64(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn genesis_sentinel() {
        let head = EventHash::genesis();
        assert!(head.is_genesis());
        assert_eq!(head.as_str(), "genesis");
        assert!(!EventHash::new("ab12").is_genesis());
    }
}
