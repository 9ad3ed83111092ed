//! Wall-clock source for capture cycles.
//!
//! Every cycle is stamped once, at its start, and that single instant
//! drives both the screenshot path and the event-log record. The system
//! clock stamps in UTC; timestamps carry an explicit offset so records
//! written by other clocks stay unambiguous.

use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, Utc};

/// Capture instant with sub-second precision and an explicit offset.
pub type Timestamp = DateTime<FixedOffset>;

/// Source of capture timestamps.
pub trait CaptureClock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl CaptureClock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().fixed_offset()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<Timestamp>,
}

impl FixedClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }

    /// Jump to an arbitrary instant.
    pub fn set(&self, to: Timestamp) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl CaptureClock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
