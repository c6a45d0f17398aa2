//! In-memory event store

use crate::EventStore;
use accord_core::{Event, Result};
use parking_lot::Mutex;

/// Event store that keeps everything in memory.
///
/// The default backend for tests and for sessions whose audit trail is
/// captured through `export()` rather than a durable log.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: Mutex<Vec<Event>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event persisted so far, in write order
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Number of events persisted so far
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether the store holds no events
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventStore for MemoryStore {
    fn persist(&self, event: &Event) -> Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_core::EventHash;
    use accord_identity::Identity;
    use std::collections::BTreeMap;

    #[test]
    fn persists_in_write_order() {
        let store = MemoryStore::new();
        let identity = Identity::generate();

        let first = identity
            .sign_event("one", BTreeMap::new(), EventHash::genesis(), 1)
            .unwrap();
        let second = identity
            .sign_event("two", BTreeMap::new(), EventHash::genesis(), 2)
            .unwrap();

        store.persist(&first).unwrap();
        store.persist(&second).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].event_type, "one");
        assert_eq!(snapshot[1].event_type, "two");
    }
}
