//! Three-agent trading session with a co-signed audit export.
//!
//! Run with: `cargo run -p accord-session --example trading_audit`

use accord_session::{AgentSession, AgentSpec, SessionConfig};
use accord_store::JsonlStore;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

fn main() -> accord_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = SessionConfig::new(vec![
        AgentSpec::generated("advisor"),
        AgentSpec::generated("trading_bot"),
        AgentSpec::generated("executor"),
    ]);
    let store = Arc::new(JsonlStore::open("trading-session.jsonl")?);
    let mut session = AgentSession::new(config, store)?;

    // All pairs co-sign handshakes before any action takes place
    session.start()?;

    // Co-signed recommendation: both chains record the same interaction,
    // with the raw symbol and confidence redacted to digests
    let mut payload = BTreeMap::new();
    payload.insert("symbol".to_string(), json!("AAPL"));
    payload.insert("confidence".to_string(), json!(0.87));
    session.stamp("advisor", "recommendation_sent", &payload, Some("trading_bot"))?;

    // Unilateral decision on the bot's own chain
    let mut payload = BTreeMap::new();
    payload.insert("symbol".to_string(), json!("AAPL"));
    payload.insert("action".to_string(), json!("buy"));
    session.stamp("trading_bot", "trade_decision", &payload, None)?;

    // Co-signed execution hand-off
    let mut payload = BTreeMap::new();
    payload.insert("order_id".to_string(), json!("ORD-1042"));
    session.stamp("trading_bot", "order_submitted", &payload, Some("executor"))?;

    session.export(std::path::Path::new("trading-session-audit.json"))?;
    let summary = session.end()?;

    println!(
        "session {} ended: {} agents, {} handshakes, {} events",
        summary.session_id,
        summary.agents.len(),
        summary.handshake_count,
        summary.total_events
    );
    Ok(())
}
