//! Session summary and audit export
//!
//! The export is the tamper-evident record of the combined session: the
//! summary plus every agent's full event chain, serialized with stable
//! keys so external verifiers can re-check signatures and chain linkage
//! offline. Exporting never mutates session state.

use crate::handshake::HandshakeRecord;
use accord_core::{AccordError, Event, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Per-agent slice of the session summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    /// Long-term stable identifier
    pub agent_id: String,
    /// Number of events in this agent's log
    pub event_count: usize,
    /// Current chain head (genesis sentinel if the log is empty)
    pub last_hash: String,
}

/// Read-only snapshot of a session's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// The shared session identifier
    pub session_id: String,
    /// Unix seconds when the session started, if it has
    pub started_at: Option<i64>,
    /// Per-agent id, event count, and chain head, keyed by agent name
    pub agents: BTreeMap<String, AgentSummary>,
    /// All completed handshake records, in execution order
    pub handshakes: Vec<HandshakeRecord>,
    /// Number of completed handshakes
    pub handshake_count: usize,
    /// Total event count across all agents
    pub total_events: usize,
}

/// One agent's full chain in an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentExport {
    /// Long-term stable identifier
    pub agent_id: String,
    /// Number of events in this agent's log
    pub event_count: usize,
    /// The full event chain, in append order
    pub events: Vec<Event>,
}

/// Complete session audit: summary plus every agent's full chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionExport {
    /// The session summary at export time
    pub session: SessionSummary,
    /// Full per-agent chains, keyed by agent name
    pub agents: BTreeMap<String, AgentExport>,
}

impl SessionExport {
    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an export back from JSON
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write the export to a file
    pub fn write(&self, path: &Path) -> Result<()> {
        let text = self.to_json()?;
        std::fs::write(path, text).map_err(|e| {
            AccordError::persistence(format!("writing export {}: {e}", path.display()))
        })
    }

    /// Read an export back from a file
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AccordError::persistence(format!("reading export {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_export_round_trips() {
        let export = SessionExport {
            session: SessionSummary {
                session_id: "sess_x".to_string(),
                started_at: Some(1_700_000_000),
                agents: BTreeMap::new(),
                handshakes: Vec::new(),
                handshake_count: 0,
                total_events: 0,
            },
            agents: BTreeMap::new(),
        };
        let text = export.to_json().unwrap();
        assert_eq!(SessionExport::from_json(&text).unwrap(), export);
    }

    #[test]
    fn export_uses_stable_keys() {
        let export = SessionExport {
            session: SessionSummary {
                session_id: "sess_x".to_string(),
                started_at: None,
                agents: BTreeMap::new(),
                handshakes: Vec::new(),
                handshake_count: 0,
                total_events: 0,
            },
            agents: BTreeMap::new(),
        };
        let value: serde_json::Value =
            serde_json::from_str(&export.to_json().unwrap()).unwrap();
        assert!(value["session"]["session_id"].is_string());
        assert!(value["session"]["handshake_count"].is_number());
        assert!(value["session"]["total_events"].is_number());
        assert!(value["agents"].is_object());
    }
}
