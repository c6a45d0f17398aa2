//! Accord identity: key material, event signing, and handshake material
//!
//! Each agent owns an ed25519 key pair and a long-term `AgentId` derived
//! from its public key. This crate covers everything that touches the
//! private key: loading identities from disk, signing chain events, and
//! building the proposal/response/co-signed structures of the pairwise
//! handshake. The session layer never sees raw key bytes.

pub mod handshake;
pub mod identity;
pub mod verify;

pub use handshake::{
    build_cosigned_event, build_identity_proposal, build_identity_response,
    session_capabilities, Capability, IdentityProposal, IdentityResponse, HANDSHAKE_EVENT_TYPE,
};
pub use identity::{Identity, IdentitySource};

// Re-exported so downstream crates can name key types without depending on
// the crypto backend directly.
pub use ed25519_dalek::VerifyingKey;
pub use verify::{
    verify_chain, verify_event, verify_identity_proposal, verify_identity_response,
};
