//! Multi-agent session coordinator
//!
//! Owns the fixed, ordered agent registry, drives the pairwise handshake
//! fan-out at start, exposes unilateral and co-signed stamping, and manages
//! the session lifecycle: not-started → started → ended (terminal).
//!
//! The coordinator assumes single-threaded, synchronous use: callers
//! serialize `start`/`stamp`/`end` themselves. The hazard is two stamps on
//! one agent racing to read the chain head and forking the chain; one
//! caller at a time makes that impossible without internal locking.

use crate::config::SessionConfig;
use crate::export::{AgentExport, AgentSummary, SessionExport, SessionSummary};
use crate::handshake::{perform_handshake, HandshakeRecord};
use crate::member::SessionMember;
use accord_core::{
    digest_str, digest_value, AccordError, Clock, Event, Result, SessionId, SystemClock,
};
use accord_identity::Identity;
use accord_store::EventStore;
use rand_core::RngCore;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, no events stamped yet
    NotStarted,
    /// Handshakes complete, stamping and export available
    Started,
    /// Terminal: session_end stamped in every chain
    Ended,
}

/// Replace raw payload values with their digests.
///
/// Privacy/audit policy: keys ending in `_hash` or `_id` (and the literal
/// `session_id`) pass through verbatim; every other field is replaced by
/// `{key}_hash` mapped to the digest of its value. Raw values never reach
/// a log — callers keep them for their own purposes.
pub fn redact_payload(payload: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    let mut safe = BTreeMap::new();
    for (key, value) in payload {
        if key.ends_with("_hash") || key.ends_with("_id") || key == "session_id" {
            safe.insert(key.clone(), value.clone());
        } else {
            safe.insert(format!("{key}_hash"), Value::String(digest_value(value)));
        }
    }
    safe
}

/// Multi-agent co-signed session.
///
/// Exactly one `AgentSession` governs a fixed registry of ≥2 agents, set
/// at construction and never mutated afterward. Each agent keeps its own
/// append-only chain; every event references the shared session id.
pub struct AgentSession {
    session_id: SessionId,
    state: SessionState,
    started_at: Option<i64>,
    members: Vec<SessionMember>,
    index: BTreeMap<String, usize>,
    handshakes: Vec<HandshakeRecord>,
    store: Arc<dyn EventStore>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSession")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl AgentSession {
    /// Construct a session from config with the system clock and OS
    /// randomness
    pub fn new(config: SessionConfig, store: Arc<dyn EventStore>) -> Result<Self> {
        Self::with_clock_and_rng(
            config,
            store,
            Box::new(SystemClock),
            &mut rand::rngs::OsRng,
        )
    }

    /// Construct a session with explicit clock and random source.
    ///
    /// The injected sources make session ids and timestamps reproducible;
    /// production callers use `new`.
    pub fn with_clock_and_rng(
        config: SessionConfig,
        store: Arc<dyn EventStore>,
        clock: Box<dyn Clock>,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        if config.agents.len() < 2 {
            return Err(AccordError::configuration(format!(
                "session requires at least 2 agents, got {}; for single-agent use, stamp a chain directly",
                config.agents.len()
            )));
        }

        let mut members = Vec::with_capacity(config.agents.len());
        let mut index = BTreeMap::new();
        for (position, spec) in config.agents.iter().enumerate() {
            if index.insert(spec.name.clone(), position).is_some() {
                return Err(AccordError::configuration(format!(
                    "duplicate agent name '{}'",
                    spec.name
                )));
            }
            let identity = Identity::load(&spec.identity)?;
            members.push(SessionMember::new(spec.name.clone(), identity));
        }

        Ok(Self {
            session_id: SessionId::generate(rng),
            state: SessionState::NotStarted,
            started_at: None,
            members,
            index,
            handshakes: Vec::new(),
            store,
            clock,
        })
    }

    /// The shared session identifier
    pub fn id(&self) -> &SessionId {
        &self.session_id
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Unix seconds when the session started, if it has
    pub fn started_at(&self) -> Option<i64> {
        self.started_at
    }

    /// All completed handshake records, in execution order
    pub fn handshakes(&self) -> &[HandshakeRecord] {
        &self.handshakes
    }

    /// Read-only view of one agent, by session-scoped name
    pub fn agent(&self, name: &str) -> Result<&SessionMember> {
        let position = self.resolve(name)?;
        Ok(&self.members[position])
    }

    /// Names of all agents, in registration order
    pub fn agent_names(&self) -> Vec<&str> {
        self.members.iter().map(SessionMember::name).collect()
    }

    /// Start the session: stamp `session_start` into every chain, then
    /// perform all pairwise handshakes.
    ///
    /// For N agents this runs N·(N−1)/2 handshakes, in ascending
    /// registration order (pair (i, j) with j > i). Calling `start` on an
    /// already-started session is a state error and stamps nothing.
    pub fn start(&mut self) -> Result<()> {
        if self.state != SessionState::NotStarted {
            return Err(AccordError::state(format!(
                "session {} already started; create a new session instead",
                self.session_id
            )));
        }

        self.started_at = Some(self.clock.unix_seconds());

        let participant_ids: Vec<Value> = self
            .members
            .iter()
            .map(|m| json!(m.agent_id().as_str()))
            .collect();
        let participant_names: Vec<Value> =
            self.members.iter().map(|m| json!(m.name())).collect();
        let agent_count = self.members.len();

        // Every agent's first session event records who else participates
        for position in 0..agent_count {
            let mut payload = BTreeMap::new();
            payload.insert("participants".to_string(), Value::Array(participant_ids.clone()));
            payload.insert(
                "participant_names".to_string(),
                Value::Array(participant_names.clone()),
            );
            payload.insert("agent_count".to_string(), json!(agent_count));
            self.members[position].stamp(
                self.store.as_ref(),
                self.clock.as_ref(),
                "session_start",
                &payload,
                &self.session_id,
                None,
                None,
            )?;
        }

        // Pairwise fan-out in fixed registration order
        for i in 0..agent_count {
            for j in (i + 1)..agent_count {
                let (left, right) = self.members.split_at_mut(j);
                let record = perform_handshake(
                    &self.session_id,
                    self.clock.as_ref(),
                    self.store.as_ref(),
                    &mut left[i],
                    &mut right[0],
                )?;
                self.handshakes.push(record);
            }
        }

        self.state = SessionState::Started;
        tracing::info!(
            session_id = %self.session_id,
            agents = agent_count,
            handshakes = self.handshakes.len(),
            "session started"
        );
        Ok(())
    }

    /// Stamp an event into an agent's chain, linked to this session.
    ///
    /// Payload values are redacted first (see [`redact_payload`]). Without
    /// a peer this is a single unilateral stamp. With a peer, both sides
    /// record the interaction: the initiator with `event_type` and role
    /// `initiator`, the responder with `{event_type}_received`, role
    /// `responder`, the same `interaction_hash`, and the initiator's fresh
    /// signature embedded as `peer_signature` — proof the initiator's
    /// event existed first. Returns the initiator's event.
    pub fn stamp(
        &mut self,
        agent_name: &str,
        event_type: &str,
        payload: &BTreeMap<String, Value>,
        peer: Option<&str>,
    ) -> Result<Event> {
        self.require_started()?;

        // Resolve every name before touching any chain
        let agent_position = self.resolve(agent_name)?;
        let peer_position = peer.map(|name| self.resolve(name)).transpose()?;

        let safe_payload = redact_payload(payload);

        let Some(peer_position) = peer_position else {
            return self.members[agent_position].stamp(
                self.store.as_ref(),
                self.clock.as_ref(),
                event_type,
                &safe_payload,
                &self.session_id,
                None,
                None,
            );
        };

        let initiator_id = self.members[agent_position].agent_id().clone();
        let responder_id = self.members[peer_position].agent_id().clone();

        // One digest shared verbatim by both logs — the only value
        // intentionally identical across two independently-owned chains
        let interaction_hash = digest_str(&format!(
            "{initiator_id}:{responder_id}:{}",
            self.clock.unix_millis()
        ));

        let mut initiator_payload = safe_payload.clone();
        initiator_payload.insert("interaction_hash".to_string(), json!(interaction_hash));
        initiator_payload.insert("my_role".to_string(), json!("initiator"));
        let event = self.members[agent_position].stamp(
            self.store.as_ref(),
            self.clock.as_ref(),
            event_type,
            &initiator_payload,
            &self.session_id,
            Some(&responder_id),
            None,
        )?;

        let mut responder_payload = safe_payload;
        responder_payload.insert("interaction_hash".to_string(), json!(interaction_hash));
        responder_payload.insert("my_role".to_string(), json!("responder"));
        let received_type = format!("{event_type}_received");
        self.members[peer_position].stamp(
            self.store.as_ref(),
            self.clock.as_ref(),
            &received_type,
            &responder_payload,
            &self.session_id,
            Some(&initiator_id),
            Some(&event.signature),
        )?;

        tracing::debug!(
            session_id = %self.session_id,
            agent = agent_name,
            event_type,
            peer = peer.unwrap_or(""),
            "event stamped"
        );
        Ok(event)
    }

    /// End the session: stamp `session_end` into every chain and
    /// transition to the terminal state. Returns the final summary.
    pub fn end(&mut self) -> Result<SessionSummary> {
        self.require_started()?;

        let ended_at = self.clock.unix_seconds();
        // started_at is always set once the state is Started
        let duration = ended_at - self.started_at.unwrap_or(ended_at);
        let total_events: usize = self.members.iter().map(SessionMember::event_count).sum();

        for position in 0..self.members.len() {
            let mut payload = BTreeMap::new();
            payload.insert("duration_seconds".to_string(), json!(duration));
            payload.insert("total_events".to_string(), json!(total_events));
            self.members[position].stamp(
                self.store.as_ref(),
                self.clock.as_ref(),
                "session_end",
                &payload,
                &self.session_id,
                None,
                None,
            )?;
        }

        self.state = SessionState::Ended;
        tracing::info!(
            session_id = %self.session_id,
            duration_seconds = duration,
            total_events,
            "session ended"
        );
        Ok(self.summary())
    }

    /// Snapshot of the session's current state. Pure read, valid in any
    /// lifecycle state.
    pub fn summary(&self) -> SessionSummary {
        let agents = self
            .members
            .iter()
            .map(|member| {
                (
                    member.name().to_string(),
                    AgentSummary {
                        agent_id: member.agent_id().as_str().to_string(),
                        event_count: member.event_count(),
                        last_hash: member.chain_head().as_str().to_string(),
                    },
                )
            })
            .collect();
        SessionSummary {
            session_id: self.session_id.as_str().to_string(),
            started_at: self.started_at,
            agents,
            handshakes: self.handshakes.clone(),
            handshake_count: self.handshakes.len(),
            total_events: self.members.iter().map(SessionMember::event_count).sum(),
        }
    }

    /// Build the full audit export: summary plus every agent's chain.
    ///
    /// Requires a started session; read-only with respect to session
    /// state.
    pub fn export_data(&self) -> Result<SessionExport> {
        self.require_started()?;
        let agents = self
            .members
            .iter()
            .map(|member| {
                (
                    member.name().to_string(),
                    AgentExport {
                        agent_id: member.agent_id().as_str().to_string(),
                        event_count: member.event_count(),
                        events: member.events(),
                    },
                )
            })
            .collect();
        Ok(SessionExport {
            session: self.summary(),
            agents,
        })
    }

    /// Serialize the full audit export to a JSON file
    pub fn export(&self, path: &Path) -> Result<()> {
        let export = self.export_data()?;
        export.write(path)?;
        tracing::info!(session_id = %self.session_id, path = %path.display(), "audit exported");
        Ok(())
    }

    fn require_started(&self) -> Result<()> {
        match self.state {
            SessionState::Started => Ok(()),
            SessionState::NotStarted => Err(AccordError::state(
                "session not started; call start() first",
            )),
            SessionState::Ended => Err(AccordError::state(format!(
                "session {} already ended",
                self.session_id
            ))),
        }
    }

    fn resolve(&self, name: &str) -> Result<usize> {
        self.index.get(name).copied().ok_or_else(|| {
            AccordError::lookup(format!(
                "agent '{name}' not in session; available: {:?}",
                self.agent_names()
            ))
        })
    }
}
