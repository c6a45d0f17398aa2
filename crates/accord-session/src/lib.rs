//! Accord session: mutually-authenticated, auditable multi-agent sessions
//!
//! Establishes a cryptographically co-signed session between N independent
//! agents. Each agent keeps its own append-only, hash-chained event log;
//! every interaction references the shared session id, and co-signed
//! handshakes prove mutual identification before any action takes place.
//!
//! ```
//! use accord_session::{AgentSession, AgentSpec, SessionConfig};
//! use accord_store::MemoryStore;
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! # fn main() -> accord_core::Result<()> {
//! let config = SessionConfig::new(vec![
//!     AgentSpec::generated("advisor"),
//!     AgentSpec::generated("trading_bot"),
//! ]);
//! let mut session = AgentSession::new(config, Arc::new(MemoryStore::new()))?;
//!
//! // All agent pairs co-sign handshakes; the session id is shared
//! session.start()?;
//!
//! // Raw values are digested before they reach any log
//! let mut payload = BTreeMap::new();
//! payload.insert("symbol".to_string(), serde_json::json!("AAPL"));
//! session.stamp("advisor", "recommendation_sent", &payload, Some("trading_bot"))?;
//!
//! let summary = session.end()?;
//! assert_eq!(summary.handshake_count, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod export;
pub mod handshake;
pub mod member;
pub mod session;

pub use config::{AgentSpec, SessionConfig};
pub use export::{AgentExport, AgentSummary, SessionExport, SessionSummary};
pub use handshake::HandshakeRecord;
pub use member::SessionMember;
pub use session::{redact_payload, AgentSession, SessionState};
