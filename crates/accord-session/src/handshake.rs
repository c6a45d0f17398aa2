//! Pairwise mutual-identity handshake
//!
//! Four steps between initiator A and responder B: A signs an identity
//! proposal bound to the session, B signs a response over its own identity
//! plus that proposal, then each side folds the identical (proposal,
//! response) pair into a co-signed event on its own chain. Any signing or
//! persistence failure aborts the pair immediately — a handshake with one
//! side stamped and the other not is never reported as success.

use crate::member::SessionMember;
use accord_core::{Clock, Result, SessionId};
use accord_identity::{
    build_cosigned_event, build_identity_proposal, build_identity_response,
    session_capabilities,
};
use accord_store::EventStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Record of one completed pairwise handshake.
///
/// Created once per unordered agent pair during session start, never
/// mutated, retained for the life of the session for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeRecord {
    /// Name of the initiating agent
    pub initiator: String,
    /// Name of the responding agent
    pub responder: String,
    /// Initiator's stable identifier
    pub initiator_id: String,
    /// Responder's stable identifier
    pub responder_id: String,
    /// Session both sides bound the handshake to
    pub session_id: String,
    /// Hash of the co-signed event in the initiator's log
    pub initiator_event_hash: String,
    /// Hash of the co-signed event in the responder's log
    pub responder_event_hash: String,
    /// Unix seconds at completion
    pub completed_at: i64,
}

/// Run one complete handshake between `initiator` and `responder`.
///
/// On success each agent's log holds a co-signed event referencing the
/// other's id, both derived from the identical (proposal, response) pair.
/// The two events hash differently — each chains into its own log — but
/// the embedded pair and session id match byte-for-byte.
pub(crate) fn perform_handshake(
    session_id: &SessionId,
    clock: &dyn Clock,
    store: &dyn EventStore,
    initiator: &mut SessionMember,
    responder: &mut SessionMember,
) -> Result<HandshakeRecord> {
    // Step 1 — initiator proposes its identity, bound to this session
    let mut metadata = BTreeMap::new();
    metadata.insert(
        "session_id".to_string(),
        serde_json::Value::String(session_id.as_str().into()),
    );
    metadata.insert(
        "name".to_string(),
        serde_json::Value::String(initiator.name().into()),
    );
    let proposal =
        build_identity_proposal(initiator.identity(), session_capabilities(), metadata)?;

    // Step 2 — responder answers over its own identity plus the proposal
    let response =
        build_identity_response(responder.identity(), &proposal, session_capabilities())?;

    let timestamp = clock.unix_seconds();

    // Step 3 — co-signed event into the initiator's chain
    let event = build_cosigned_event(
        initiator.identity(),
        &proposal,
        &response,
        initiator.chain_head().clone(),
        session_id,
        responder.agent_id(),
        responder.name(),
        timestamp,
    )?;
    initiator.append(store, event)?;
    let initiator_event_hash = initiator.chain_head().clone();

    // Step 4 — symmetric co-signed event into the responder's chain
    let event = build_cosigned_event(
        responder.identity(),
        &proposal,
        &response,
        responder.chain_head().clone(),
        session_id,
        initiator.agent_id(),
        initiator.name(),
        timestamp,
    )?;
    responder.append(store, event)?;
    let responder_event_hash = responder.chain_head().clone();

    tracing::info!(
        session_id = %session_id,
        initiator = initiator.name(),
        responder = responder.name(),
        "handshake co-signed"
    );

    Ok(HandshakeRecord {
        initiator: initiator.name().to_string(),
        responder: responder.name().to_string(),
        initiator_id: initiator.agent_id().as_str().to_string(),
        responder_id: responder.agent_id().as_str().to_string(),
        session_id: session_id.as_str().to_string(),
        initiator_event_hash: initiator_event_hash.as_str().to_string(),
        responder_event_hash: responder_event_hash.as_str().to_string(),
        completed_at: timestamp,
    })
}
