//! Verification helpers for events, handshake material, and whole chains
//!
//! These are the read side of the protocol: given public material only,
//! confirm that signatures hold and that an agent's log is an unbroken
//! hash chain. Used by tests and by auditors of an exported session.

use crate::handshake::{
    proposal_digest, proposal_signing_bytes, response_signing_bytes, IdentityProposal,
    IdentityResponse,
};
use crate::identity::agent_id_for_key;
use accord_core::{digest_event, AccordError, Event, Result};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

fn decode_signature(hex_sig: &str) -> Result<Signature> {
    let bytes = hex::decode(hex_sig)
        .map_err(|e| AccordError::crypto(format!("invalid signature hex: {e}")))?;
    let bytes: [u8; 64] = bytes
        .try_into()
        .map_err(|_| AccordError::crypto("invalid signature length, expected 64 bytes"))?;
    Ok(Signature::from_bytes(&bytes))
}

fn decode_public_key(hex_key: &str) -> Result<VerifyingKey> {
    let bytes = hex::decode(hex_key)
        .map_err(|e| AccordError::crypto(format!("invalid public key hex: {e}")))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| AccordError::crypto("invalid public key length, expected 32 bytes"))?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| AccordError::crypto(format!("invalid public key: {e}")))
}

/// Verify an event's signature against the issuing agent's public key
pub fn verify_event(event: &Event, verifying_key: &VerifyingKey) -> Result<()> {
    let signature = decode_signature(&event.signature)?;
    let bytes = event.signed_bytes()?;
    verifying_key
        .verify(&bytes, &signature)
        .map_err(|e| AccordError::crypto(format!("event signature invalid: {e}")))
}

/// Verify a proposal's signature and that its agent id matches its key
pub fn verify_identity_proposal(proposal: &IdentityProposal) -> Result<()> {
    let key = decode_public_key(&proposal.public_key)?;
    if agent_id_for_key(&key) != proposal.agent_id {
        return Err(AccordError::crypto(
            "proposal agent id does not match its public key",
        ));
    }
    let bytes = proposal_signing_bytes(
        &proposal.agent_id,
        &proposal.public_key,
        &proposal.capabilities,
        &proposal.metadata,
    )?;
    let signature = decode_signature(&proposal.signature)?;
    key.verify(&bytes, &signature)
        .map_err(|e| AccordError::crypto(format!("proposal signature invalid: {e}")))
}

/// Verify a response's signature, its key/id binding, and that it answers
/// exactly the given proposal
pub fn verify_identity_response(
    response: &IdentityResponse,
    proposal: &IdentityProposal,
) -> Result<()> {
    let key = decode_public_key(&response.public_key)?;
    if agent_id_for_key(&key) != response.agent_id {
        return Err(AccordError::crypto(
            "response agent id does not match its public key",
        ));
    }
    if response.proposal_digest != proposal_digest(proposal)? {
        return Err(AccordError::crypto(
            "response does not answer the given proposal",
        ));
    }
    let bytes = response_signing_bytes(
        &response.agent_id,
        &response.public_key,
        &response.capabilities,
        &response.proposal_digest,
    )?;
    let signature = decode_signature(&response.signature)?;
    key.verify(&bytes, &signature)
        .map_err(|e| AccordError::crypto(format!("response signature invalid: {e}")))
}

/// Verify that a log is an unbroken hash chain.
///
/// The first event must carry the genesis sentinel; every later event's
/// `previous_hash` must equal the digest of the event before it.
pub fn verify_chain(events: &[Event]) -> Result<()> {
    let mut expected = accord_core::EventHash::genesis();
    for (index, event) in events.iter().enumerate() {
        if event.previous_hash != expected {
            return Err(AccordError::crypto(format!(
                "chain broken at event {index}: previous_hash {} != expected {}",
                event.previous_hash, expected
            )));
        }
        expected = digest_event(event)?;
    }
    Ok(())
}
