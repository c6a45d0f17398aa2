//! Accord core: shared types for the co-signed session protocol
//!
//! This crate holds the leaf types every other Accord crate builds on:
//! the unified error type, the signed event model, content digests used to
//! redact raw payload values, stable identifiers, and the clock abstraction.
//!
//! Nothing here performs I/O or holds key material; signing and persistence
//! live in `accord-identity` and `accord-store`.

pub mod digest;
pub mod errors;
pub mod event;
pub mod identifiers;
pub mod time;

pub use digest::{digest_bytes, digest_str, digest_value};
pub use errors::{AccordError, Result};
pub use event::{build_event_payload, digest_event, Event, PROTOCOL_VERSION};
pub use identifiers::{AgentId, EventHash, SessionId};
pub use time::{Clock, FixedClock, SystemClock};
