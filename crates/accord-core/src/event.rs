//! Signed event model
//!
//! An event is one immutable entry in an agent's append-only log. Its
//! `previous_hash` links it to the agent's own prior event (genesis sentinel
//! for the first), and its signature is produced by the issuing agent's
//! private key over the canonical encoding of everything else.
//!
//! Events never change after creation: no in-place edits, no deletions.

use crate::digest::digest_bytes;
use crate::errors::Result;
use crate::identifiers::{AgentId, EventHash, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Protocol version tag merged into every event payload
pub const PROTOCOL_VERSION: &str = "accord/1";

/// One signed entry in an agent's log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Issuing agent's long-term identifier
    pub agent_id: AgentId,
    /// Classification string (`session_start`, `<action>`, `<action>_received`, ...)
    pub event_type: String,
    /// Field name to value mapping; always contains `session_id`
    pub payload: BTreeMap<String, Value>,
    /// The issuing agent's chain head at the moment of stamping
    pub previous_hash: EventHash,
    /// Unix seconds at stamping time
    pub timestamp: i64,
    /// Hex ed25519 signature over the canonical unsigned encoding
    pub signature: String,
}

/// Unsigned view of an event, serialized to produce the signing bytes.
///
/// Field order here is the canonical order; the payload is a BTreeMap so
/// the whole encoding is deterministic.
#[derive(Serialize)]
struct SigningView<'a> {
    agent_id: &'a AgentId,
    event_type: &'a str,
    payload: &'a BTreeMap<String, Value>,
    previous_hash: &'a EventHash,
    timestamp: i64,
}

impl Event {
    /// Canonical bytes covered by the event signature (everything but the
    /// signature itself)
    pub fn signing_bytes(
        agent_id: &AgentId,
        event_type: &str,
        payload: &BTreeMap<String, Value>,
        previous_hash: &EventHash,
        timestamp: i64,
    ) -> Result<Vec<u8>> {
        let view = SigningView {
            agent_id,
            event_type,
            payload,
            previous_hash,
            timestamp,
        };
        Ok(serde_json::to_vec(&view)?)
    }

    /// The bytes this event's signature must verify against
    pub fn signed_bytes(&self) -> Result<Vec<u8>> {
        Self::signing_bytes(
            &self.agent_id,
            &self.event_type,
            &self.payload,
            &self.previous_hash,
            self.timestamp,
        )
    }

    /// Fetch a payload field as a string slice, if present and a string
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

/// Digest a full event (signature included) to its chain hash
pub fn digest_event(event: &Event) -> Result<EventHash> {
    let bytes = serde_json::to_vec(event)?;
    Ok(EventHash::new(digest_bytes(&bytes)))
}

/// Build the full payload for a stamped event.
///
/// Pure merge of the caller's fields with the session metadata; the input
/// map is never mutated and the result is a fresh mapping. `peer_id` and
/// `peer_signature` are included only when present.
pub fn build_event_payload(
    base: &BTreeMap<String, Value>,
    event_type: &str,
    session_id: &SessionId,
    peer_id: Option<&AgentId>,
    peer_signature: Option<&str>,
) -> BTreeMap<String, Value> {
    let mut payload = base.clone();
    payload.insert("event_type".into(), Value::String(event_type.into()));
    payload.insert(
        "session_id".into(),
        Value::String(session_id.as_str().into()),
    );
    payload.insert(
        "protocol_version".into(),
        Value::String(PROTOCOL_VERSION.into()),
    );
    if let Some(peer) = peer_id {
        payload.insert("peer_agent_id".into(), Value::String(peer.as_str().into()));
    }
    if let Some(sig) = peer_signature {
        payload.insert("peer_signature".into(), Value::String(sig.into()));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_event() -> Event {
        let mut payload = BTreeMap::new();
        payload.insert("session_id".to_string(), json!("sess_0123"));
        Event {
            agent_id: AgentId::new("agent:aaaa"),
            event_type: "session_start".to_string(),
            payload,
            previous_hash: EventHash::genesis(),
            timestamp: 1_700_000_000,
            signature: "00".repeat(64),
        }
    }

    #[test]
    fn signing_bytes_exclude_signature() {
        let event = sample_event();
        let mut other = event.clone();
        other.signature = "11".repeat(64);
        assert_eq!(
            event.signed_bytes().unwrap(),
            other.signed_bytes().unwrap()
        );
    }

    #[test]
    fn event_digest_covers_signature() {
        let event = sample_event();
        let mut other = event.clone();
        other.signature = "11".repeat(64);
        assert_ne!(
            digest_event(&event).unwrap(),
            digest_event(&other).unwrap()
        );
    }

    #[test]
    fn payload_merge_is_pure_and_complete() {
        let mut base = BTreeMap::new();
        base.insert("symbol_hash".to_string(), json!("abcd"));
        let session_id = SessionId("sess_feed".to_string());
        let peer = AgentId::new("agent:bbbb");

        let merged = build_event_payload(&base, "advice", &session_id, Some(&peer), Some("sig"));

        // base untouched
        assert_eq!(base.len(), 1);
        assert_eq!(merged.get("event_type"), Some(&json!("advice")));
        assert_eq!(merged.get("session_id"), Some(&json!("sess_feed")));
        assert_eq!(merged.get("protocol_version"), Some(&json!(PROTOCOL_VERSION)));
        assert_eq!(merged.get("peer_agent_id"), Some(&json!("agent:bbbb")));
        assert_eq!(merged.get("peer_signature"), Some(&json!("sig")));
    }

    #[test]
    fn payload_merge_omits_absent_peer_fields() {
        let base = BTreeMap::new();
        let session_id = SessionId("sess_feed".to_string());
        let merged = build_event_payload(&base, "note", &session_id, None, None);
        assert!(!merged.contains_key("peer_agent_id"));
        assert!(!merged.contains_key("peer_signature"));
    }
}
