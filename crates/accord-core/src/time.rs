//! Clock abstraction
//!
//! The protocol is synchronous and single-threaded; the only time it needs
//! is wall-clock readings for event timestamps, session duration, and the
//! per-interaction hash input. Injecting the clock keeps those readings
//! deterministic under test.

/// Source of wall-clock readings
pub trait Clock {
    /// Current unix time in whole seconds
    fn unix_seconds(&self) -> i64;

    /// Current unix time in milliseconds.
    ///
    /// Used for interaction hashes, where second resolution would collide
    /// for rapid successive interactions between the same pair.
    fn unix_millis(&self) -> i64;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn unix_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Fixed clock for deterministic tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    /// The unix-seconds reading this clock always returns
    pub seconds: i64,
}

impl FixedClock {
    /// Create a clock pinned to the given unix time
    pub fn at(seconds: i64) -> Self {
        Self { seconds }
    }
}

impl Clock for FixedClock {
    fn unix_seconds(&self) -> i64 {
        self.seconds
    }

    fn unix_millis(&self) -> i64 {
        self.seconds * 1000
    }
}
