//! Handshake material: identity proposal, response, and co-signed events
//!
//! The mutual handshake between two agents exchanges a signed proposal
//! (initiator) and a signed response (responder), then each side folds the
//! identical (proposal, response) pair into a co-signed event on its own
//! chain. A verifier holding both logs can confirm the handshake happened
//! between exactly these two identities in this session.

use crate::identity::Identity;
use accord_core::{
    build_event_payload, digest_value, AgentId, Event, EventHash, Result, SessionId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Event type of both sides' co-signed handshake events
pub const HANDSHAKE_EVENT_TYPE: &str = "a2a_handshake";

/// Capabilities advertised during the handshake.
///
/// This is the session protocol's fixed vocabulary; every participant
/// advertises all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Can stamp events into its own chain
    Stamp,
    /// Can verify other agents' events
    Verify,
    /// Speaks the agent-to-agent handshake protocol
    A2a,
    /// Participates in shared sessions
    Session,
}

/// The fixed capability set advertised in every session handshake
pub fn session_capabilities() -> Vec<Capability> {
    vec![
        Capability::Stamp,
        Capability::Verify,
        Capability::A2a,
        Capability::Session,
    ]
}

/// Signed identity proposal, built by the handshake initiator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProposal {
    /// Initiator's stable identifier
    pub agent_id: AgentId,
    /// Initiator's public key, hex-encoded
    pub public_key: String,
    /// Advertised capability set
    pub capabilities: Vec<Capability>,
    /// Binding metadata: at least `session_id` and the initiator's name
    pub metadata: BTreeMap<String, Value>,
    /// Hex ed25519 signature over the unsigned fields
    pub signature: String,
}

/// Signed identity response, built by the handshake responder over its own
/// identity plus the received proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResponse {
    /// Responder's stable identifier
    pub agent_id: AgentId,
    /// Responder's public key, hex-encoded
    pub public_key: String,
    /// Advertised capability set
    pub capabilities: Vec<Capability>,
    /// Digest of the proposal this response answers
    pub proposal_digest: String,
    /// Hex ed25519 signature over the unsigned fields
    pub signature: String,
}

#[derive(Serialize)]
struct ProposalSigningView<'a> {
    agent_id: &'a AgentId,
    public_key: &'a str,
    capabilities: &'a [Capability],
    metadata: &'a BTreeMap<String, Value>,
}

#[derive(Serialize)]
struct ResponseSigningView<'a> {
    agent_id: &'a AgentId,
    public_key: &'a str,
    capabilities: &'a [Capability],
    proposal_digest: &'a str,
}

pub(crate) fn proposal_signing_bytes(
    agent_id: &AgentId,
    public_key: &str,
    capabilities: &[Capability],
    metadata: &BTreeMap<String, Value>,
) -> Result<Vec<u8>> {
    let view = ProposalSigningView {
        agent_id,
        public_key,
        capabilities,
        metadata,
    };
    Ok(serde_json::to_vec(&view)?)
}

pub(crate) fn response_signing_bytes(
    agent_id: &AgentId,
    public_key: &str,
    capabilities: &[Capability],
    proposal_digest: &str,
) -> Result<Vec<u8>> {
    let view = ResponseSigningView {
        agent_id,
        public_key,
        capabilities,
        proposal_digest,
    };
    Ok(serde_json::to_vec(&view)?)
}

/// Digest a full proposal (signature included), the value a response binds to
pub fn proposal_digest(proposal: &IdentityProposal) -> Result<String> {
    Ok(digest_value(&serde_json::to_value(proposal)?))
}

/// Build a signed identity proposal binding the initiator to the session
pub fn build_identity_proposal(
    identity: &Identity,
    capabilities: Vec<Capability>,
    metadata: BTreeMap<String, Value>,
) -> Result<IdentityProposal> {
    let public_key = hex::encode(identity.verifying_key.as_bytes());
    let bytes =
        proposal_signing_bytes(&identity.agent_id, &public_key, &capabilities, &metadata)?;
    Ok(IdentityProposal {
        agent_id: identity.agent_id.clone(),
        public_key,
        capabilities,
        metadata,
        signature: identity.sign_hex(&bytes),
    })
}

/// Build a signed identity response over the responder's identity plus the
/// received proposal
pub fn build_identity_response(
    identity: &Identity,
    proposal: &IdentityProposal,
    capabilities: Vec<Capability>,
) -> Result<IdentityResponse> {
    let public_key = hex::encode(identity.verifying_key.as_bytes());
    let digest = proposal_digest(proposal)?;
    let bytes = response_signing_bytes(&identity.agent_id, &public_key, &capabilities, &digest)?;
    Ok(IdentityResponse {
        agent_id: identity.agent_id.clone(),
        public_key,
        capabilities,
        proposal_digest: digest,
        signature: identity.sign_hex(&bytes),
    })
}

/// Build one side's co-signed handshake event.
///
/// The payload embeds the full (proposal, response) pair — identical on
/// both sides — plus the session id and the peer's name and id, all inside
/// the signed content. The event chains into this agent's own log via
/// `previous_hash`, so the two sides' events hash differently even though
/// the embedded pair matches byte-for-byte.
pub fn build_cosigned_event(
    identity: &Identity,
    proposal: &IdentityProposal,
    response: &IdentityResponse,
    previous_hash: EventHash,
    session_id: &SessionId,
    peer_id: &AgentId,
    peer_name: &str,
    timestamp: i64,
) -> Result<Event> {
    let mut base = BTreeMap::new();
    base.insert("proposal".to_string(), serde_json::to_value(proposal)?);
    base.insert("response".to_string(), serde_json::to_value(response)?);
    base.insert("peer_name".to_string(), Value::String(peer_name.into()));

    let payload = build_event_payload(
        &base,
        HANDSHAKE_EVENT_TYPE,
        session_id,
        Some(peer_id),
        None,
    );
    identity.sign_event(HANDSHAKE_EVENT_TYPE, payload, previous_hash, timestamp)
}
