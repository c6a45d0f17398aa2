//! Append-only JSONL file store
//!
//! One JSON-encoded event per line, flushed on every write. The file is a
//! durable, replayable record of every chain in the session; `read_all`
//! reloads it for offline verification.

use crate::EventStore;
use accord_core::{AccordError, Event, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// File-backed event store, one JSON line per event
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlStore {
    /// Open (or create) the store file at `path`, appending to existing
    /// content
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                AccordError::persistence(format!("opening {}: {e}", path.display()))
            })?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every persisted event back, in write order
    pub fn read_all(&self) -> Result<Vec<Event>> {
        let file = File::open(&self.path).map_err(|e| {
            AccordError::persistence(format!("reading {}: {e}", self.path.display()))
        })?;
        let mut events = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| {
                AccordError::persistence(format!("reading {}: {e}", self.path.display()))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }
        Ok(events)
    }
}

impl EventStore for JsonlStore {
    fn persist(&self, event: &Event) -> Result<()> {
        let line = serde_json::to_string(event)?;
        let mut file = self.file.lock();
        writeln!(file, "{line}")
            .and_then(|()| file.flush())
            .map_err(|e| {
                AccordError::persistence(format!("appending {}: {e}", self.path.display()))
            })?;
        tracing::trace!(path = %self.path.display(), event_type = %event.event_type, "event persisted");
        Ok(())
    }
}
