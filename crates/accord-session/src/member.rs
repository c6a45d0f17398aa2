//! One agent's membership in a session: identity plus private chain state
//!
//! `SessionMember` is the only path through which events enter an agent's
//! log. The chain head always equals the digest of the last event in the
//! log (genesis sentinel while empty), and no other agent can ever write
//! into it.

use accord_core::{
    build_event_payload, digest_event, AgentId, Clock, Event, EventHash, Result, SessionId,
};
use accord_identity::{Identity, VerifyingKey};
use accord_store::EventStore;
use serde_json::Value;
use std::collections::BTreeMap;

/// One participant: durable identity plus per-session chain state
pub struct SessionMember {
    name: String,
    identity: Identity,
    chain_head: EventHash,
    log: Vec<Event>,
}

impl SessionMember {
    pub(crate) fn new(name: String, identity: Identity) -> Self {
        Self {
            name,
            identity,
            chain_head: EventHash::genesis(),
            log: Vec::new(),
        }
    }

    /// Session-scoped name of this agent
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Long-term stable identifier of this agent
    pub fn agent_id(&self) -> &AgentId {
        &self.identity.agent_id
    }

    /// Public key for verifying this agent's events
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.identity.verifying_key
    }

    /// Hash of the most recent event in this agent's log, or genesis
    pub fn chain_head(&self) -> &EventHash {
        &self.chain_head
    }

    /// Number of events in this agent's log
    pub fn event_count(&self) -> usize {
        self.log.len()
    }

    /// The most recent event, if any
    pub fn last_event(&self) -> Option<&Event> {
        self.log.last()
    }

    /// Snapshot of this agent's log.
    ///
    /// Returns a clone: callers can never obtain a mutable alias into the
    /// internal log.
    pub fn events(&self) -> Vec<Event> {
        self.log.clone()
    }

    pub(crate) fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Stamp an event into this agent's chain.
    ///
    /// Merges the payload with the session metadata, signs it against the
    /// current chain head, persists it, and advances the chain. The sole
    /// mutator of chain state; concurrent calls on one member would race on
    /// the chain head, so callers serialize them (one session, one thread).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn stamp(
        &mut self,
        store: &dyn EventStore,
        clock: &dyn Clock,
        event_type: &str,
        payload: &BTreeMap<String, Value>,
        session_id: &SessionId,
        peer_id: Option<&AgentId>,
        peer_signature: Option<&str>,
    ) -> Result<Event> {
        let full_payload =
            build_event_payload(payload, event_type, session_id, peer_id, peer_signature);
        let event = self.identity.sign_event(
            event_type,
            full_payload,
            self.chain_head.clone(),
            clock.unix_seconds(),
        )?;
        self.append(store, event)
    }

    /// Persist a freshly signed event and advance the chain.
    ///
    /// Persist-first: if the store write fails, neither the chain head nor
    /// the log changes, so the in-memory head never references an event
    /// absent from the store.
    pub(crate) fn append(&mut self, store: &dyn EventStore, event: Event) -> Result<Event> {
        let hash = digest_event(&event)?;
        store.persist(&event)?;
        self.chain_head = hash;
        self.log.push(event.clone());
        Ok(event)
    }
}
