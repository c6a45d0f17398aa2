//! Accord store: durable persistence for signed chain events
//!
//! The session layer treats the store as a narrow collaborator: "persist
//! this event, or fail". A write failure is fatal to the stamp that caused
//! it and is never retried; the chain head only advances after the write
//! succeeds, so the in-memory chain never references an event the store
//! does not hold.

pub mod jsonl;
pub mod memory;

use accord_core::{Event, Result};

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

/// Durable event sink consumed by the session layer.
///
/// Implementations take `&self`; a store shared by several agents of one
/// session guards its interior state itself. Calls are synchronous and
/// fallible — a stalled backend simply stalls the caller.
pub trait EventStore {
    /// Durably record one signed event
    fn persist(&self, event: &Event) -> Result<()>;
}
