//! Single authoritative telemetry snapshot.

use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use gcs_core::{FieldUpdate, TelemetrySnapshot};

/// Latest known vehicle state.
///
/// One ingestion source writes, any number of readers take copies. Each
/// `update` is merged under a single write lock so readers never see half of
/// a batch.
pub struct TelemetryStore {
    snapshot: RwLock<TelemetrySnapshot>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(TelemetrySnapshot::baseline(Utc::now())),
        }
    }

    /// Merge the supplied fields and mark the link as alive.
    pub fn update(&self, update: &FieldUpdate) {
        let now = Utc::now();
        let mut snapshot = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        snapshot.apply(update, now);
    }

    /// Consistent copy of the current state.
    pub fn read(&self) -> TelemetrySnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}
