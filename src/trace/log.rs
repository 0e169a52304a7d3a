//! Append-only access log and slot usage counters

use serde::{Deserialize, Serialize};

use super::event::AccessEvent;

/// Ordered record of every access made during a session
#[derive(Debug, Clone, Default)]
pub struct AccessLog {
    events: Vec<AccessEvent>,
}

impl AccessLog {
    /// Creates an empty log
    pub fn new() -> Self {
        AccessLog { events: Vec::new() }
    }

    /// Appends an event; no deduplication
    pub fn record(&mut self, event: AccessEvent) {
        self.events.push(event);
    }

    /// Copies the events out in insertion order
    pub fn snapshot(&self) -> Vec<AccessEvent> {
        self.events.clone()
    }

    /// Borrows the events in insertion order
    pub fn events(&self) -> &[AccessEvent] {
        &self.events
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Current and peak number of occupied register slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageMeter {
    /// Slots held by active handles right now
    pub current: usize,
    /// Highest value `current` has reached
    pub peak: usize,
}

impl UsageMeter {
    /// Counts one more occupied slot
    pub fn acquire(&mut self) {
        self.current += 1;
        self.peak = self.peak.max(self.current);
    }

    /// Counts one slot released
    pub fn release(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Slots held right now
    pub fn current(&self) -> usize {
        self.current
    }

    /// Highest simultaneous occupancy observed
    pub fn peak(&self) -> usize {
        self.peak
    }
}
