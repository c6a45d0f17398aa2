//! End-to-end protocol behavior: lifecycle, handshake fan-out, co-signed
//! stamping, redaction, and export.

use accord_core::{digest_value, AccordError, FixedClock};
use accord_identity::{verify_chain, verify_event, HANDSHAKE_EVENT_TYPE};
use accord_session::{AgentSession, AgentSpec, SessionConfig, SessionExport, SessionState};
use accord_store::MemoryStore;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

fn three_agent_session() -> AgentSession {
    let config = SessionConfig::new(vec![
        AgentSpec::generated("alpha"),
        AgentSpec::generated("beta"),
        AgentSpec::generated("gamma"),
    ]);
    AgentSession::with_clock_and_rng(
        config,
        Arc::new(MemoryStore::new()),
        Box::new(FixedClock::at(1_700_000_000)),
        &mut ChaCha20Rng::seed_from_u64(11),
    )
    .unwrap()
}

#[test]
fn construction_requires_two_agents() {
    let config = SessionConfig::new(vec![AgentSpec::generated("lonely")]);
    let err = AgentSession::new(config, Arc::new(MemoryStore::new())).unwrap_err();
    assert!(matches!(err, AccordError::Configuration { .. }));
}

#[test]
fn construction_rejects_duplicate_names() {
    let config = SessionConfig::new(vec![
        AgentSpec::generated("twin"),
        AgentSpec::generated("twin"),
    ]);
    let err = AgentSession::new(config, Arc::new(MemoryStore::new())).unwrap_err();
    assert!(matches!(err, AccordError::Configuration { .. }));
}

#[test]
fn start_fans_out_all_pairwise_handshakes() {
    let mut session = three_agent_session();
    session.start().unwrap();
    assert_eq!(session.state(), SessionState::Started);

    // N=3 agents: 3 handshake records in ascending registration order
    let pairs: Vec<(&str, &str)> = session
        .handshakes()
        .iter()
        .map(|h| (h.initiator.as_str(), h.responder.as_str()))
        .collect();
    assert_eq!(
        pairs,
        [("alpha", "beta"), ("alpha", "gamma"), ("beta", "gamma")]
    );

    for name in ["alpha", "beta", "gamma"] {
        let agent = session.agent(name).unwrap();
        let events = agent.events();
        // session_start is first, before any handshake event
        assert_eq!(events[0].event_type, "session_start");
        assert_eq!(
            events[0].payload.get("agent_count"),
            Some(&json!(3))
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| e.event_type == "session_start")
                .count(),
            1
        );
        // every agent shook hands with the other two
        assert_eq!(
            events
                .iter()
                .filter(|e| e.event_type == HANDSHAKE_EVENT_TYPE)
                .count(),
            2
        );
        verify_chain(&events).unwrap();
    }

    // alpha's and beta's logs reference each other's id
    let alpha_id = session.agent("alpha").unwrap().agent_id().clone();
    let beta_id = session.agent("beta").unwrap().agent_id().clone();
    let alpha_refs_beta = session
        .agent("alpha")
        .unwrap()
        .events()
        .iter()
        .any(|e| {
            e.event_type == HANDSHAKE_EVENT_TYPE
                && e.payload_str("peer_agent_id") == Some(beta_id.as_str())
        });
    let beta_refs_alpha = session
        .agent("beta")
        .unwrap()
        .events()
        .iter()
        .any(|e| {
            e.event_type == HANDSHAKE_EVENT_TYPE
                && e.payload_str("peer_agent_id") == Some(alpha_id.as_str())
        });
    assert!(alpha_refs_beta);
    assert!(beta_refs_alpha);
}

#[test]
fn starting_twice_is_rejected_and_stamps_nothing() {
    let mut session = three_agent_session();
    session.start().unwrap();
    let counts_before: Vec<usize> = ["alpha", "beta", "gamma"]
        .iter()
        .map(|n| session.agent(n).unwrap().event_count())
        .collect();
    let handshakes_before = session.handshakes().len();

    let err = session.start().unwrap_err();
    assert!(matches!(err, AccordError::State { .. }));

    let counts_after: Vec<usize> = ["alpha", "beta", "gamma"]
        .iter()
        .map(|n| session.agent(n).unwrap().event_count())
        .collect();
    assert_eq!(counts_before, counts_after);
    assert_eq!(session.handshakes().len(), handshakes_before);
}

#[test]
fn stamp_before_start_is_a_state_error() {
    let mut session = three_agent_session();
    let err = session
        .stamp("alpha", "note", &BTreeMap::new(), None)
        .unwrap_err();
    assert!(matches!(err, AccordError::State { .. }));
    assert!(session.export_data().is_err());
}

#[test]
fn cosigned_stamp_links_both_chains() {
    let mut session = three_agent_session();
    session.start().unwrap();

    let mut payload = BTreeMap::new();
    payload.insert("x".to_string(), json!(1));
    let event = session
        .stamp("alpha", "advice", &payload, Some("beta"))
        .unwrap();

    assert_eq!(event.event_type, "advice");
    assert_eq!(event.payload_str("my_role"), Some("initiator"));

    let beta = session.agent("beta").unwrap();
    let received = beta.last_event().unwrap();
    assert_eq!(received.event_type, "advice_received");
    assert_eq!(received.payload_str("my_role"), Some("responder"));

    // shared byte-for-byte between the two logs
    assert_eq!(
        received.payload.get("interaction_hash"),
        event.payload.get("interaction_hash")
    );
    // the responder carries the initiator's exact signature
    assert_eq!(
        received.payload_str("peer_signature"),
        Some(event.signature.as_str())
    );
    // cross-references in both directions
    assert_eq!(
        received.payload_str("peer_agent_id"),
        Some(event.agent_id.as_str())
    );
    assert_eq!(
        event.payload_str("peer_agent_id"),
        Some(received.agent_id.as_str())
    );

    // both events verify against their issuers' keys
    verify_event(&event, session.agent("alpha").unwrap().verifying_key()).unwrap();
    verify_event(received, beta.verifying_key()).unwrap();
}

#[test]
fn unknown_names_leave_chains_untouched() {
    let mut session = three_agent_session();
    session.start().unwrap();

    let head_alpha = session.agent("alpha").unwrap().chain_head().clone();
    let head_beta = session.agent("beta").unwrap().chain_head().clone();

    let mut payload = BTreeMap::new();
    payload.insert("x".to_string(), json!(1));

    let err = session
        .stamp("alpha", "advice", &payload, Some("ghost"))
        .unwrap_err();
    assert!(matches!(err, AccordError::Lookup { .. }));
    let err = session.stamp("ghost", "advice", &payload, None).unwrap_err();
    assert!(matches!(err, AccordError::Lookup { .. }));

    assert_eq!(session.agent("alpha").unwrap().chain_head(), &head_alpha);
    assert_eq!(session.agent("beta").unwrap().chain_head(), &head_beta);
}

#[test]
fn stamp_redacts_raw_values() {
    let mut session = three_agent_session();
    session.start().unwrap();

    let mut payload = BTreeMap::new();
    payload.insert("symbol".to_string(), json!("AAPL"));
    payload.insert("order_id".to_string(), json!("X1"));
    let event = session.stamp("alpha", "trade", &payload, None).unwrap();

    assert_eq!(
        event.payload.get("symbol_hash"),
        Some(&json!(digest_value(&json!("AAPL"))))
    );
    assert!(!event.payload.contains_key("symbol"));
    assert_eq!(event.payload.get("order_id"), Some(&json!("X1")));
}

#[test]
fn export_round_trips_and_matches_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.json");

    let mut session = three_agent_session();
    session.start().unwrap();
    let mut payload = BTreeMap::new();
    payload.insert("symbol".to_string(), json!("AAPL"));
    session
        .stamp("alpha", "recommendation_sent", &payload, Some("beta"))
        .unwrap();
    session.stamp("gamma", "observation", &payload, None).unwrap();

    session.export(&path).unwrap();
    let reloaded = SessionExport::read(&path).unwrap();
    let summary = session.summary();

    assert_eq!(reloaded.session.total_events, summary.total_events);
    assert_eq!(reloaded.session.handshake_count, summary.handshake_count);
    for (name, agent) in &reloaded.agents {
        assert_eq!(agent.event_count, summary.agents[name].event_count);
        assert_eq!(agent.events.len(), agent.event_count);
        // exported chains verify offline
        verify_chain(&agent.events).unwrap();
    }

    // export does not mutate session state
    assert_eq!(session.state(), SessionState::Started);
    assert_eq!(session.summary(), summary);
}

#[test]
fn end_stamps_every_chain_and_is_terminal() {
    let mut session = three_agent_session();
    session.start().unwrap();
    let before: usize = session.summary().total_events;

    let summary = session.end().unwrap();
    assert_eq!(session.state(), SessionState::Ended);
    assert_eq!(summary.total_events, before + 3);

    for name in ["alpha", "beta", "gamma"] {
        let agent = session.agent(name).unwrap();
        let last = agent.last_event().unwrap();
        assert_eq!(last.event_type, "session_end");
        assert_eq!(last.payload.get("total_events"), Some(&json!(before)));
        verify_chain(&agent.events()).unwrap();
    }

    // terminal: no further stamps, ends, or exports
    assert!(session
        .stamp("alpha", "late", &BTreeMap::new(), None)
        .is_err());
    assert!(session.end().is_err());
    assert!(session.export_data().is_err());
}

#[test]
fn seeded_sessions_get_reproducible_ids() {
    let build = |seed: u64| {
        let config = SessionConfig::new(vec![
            AgentSpec::generated("a"),
            AgentSpec::generated("b"),
        ]);
        AgentSession::with_clock_and_rng(
            config,
            Arc::new(MemoryStore::new()),
            Box::new(FixedClock::at(0)),
            &mut ChaCha20Rng::seed_from_u64(seed),
        )
        .unwrap()
    };
    assert_eq!(build(5).id(), build(5).id());
    assert_ne!(build(5).id(), build(6).id());
}
