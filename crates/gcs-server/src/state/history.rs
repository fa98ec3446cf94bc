//! Bounded rolling history of published snapshots.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use gcs_core::{FlightStats, TelemetrySnapshot};

/// Default number of snapshots retained.
pub const MAX_HISTORY: usize = 1000;

/// FIFO ring of owned snapshot copies. Oldest entries are evicted first.
pub struct HistoryRing {
    entries: Mutex<VecDeque<TelemetrySnapshot>>,
    capacity: usize,
}

impl HistoryRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn append(&self, snapshot: TelemetrySnapshot) {
        let mut entries = self.lock();
        entries.push_back(snapshot);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Up to `limit` most recent entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<TelemetrySnapshot> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Read-only access to every entry without copying the buffer.
    pub fn with_entries<R>(&self, f: impl FnOnce(&VecDeque<TelemetrySnapshot>) -> R) -> R {
        f(&*self.lock())
    }

    pub fn stats(&self, tick_period_secs: f64) -> Option<FlightStats> {
        self.with_entries(|entries| FlightStats::from_history(entries, tick_period_secs))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<TelemetrySnapshot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}
