//! Threshold rule evaluation.
//!
//! Each rule is an independent inequality over one telemetry field, so a
//! single snapshot can fire every rule at once.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::{AlertKind, AlertRecord, TelemetrySnapshot};
use crate::rules::AlertConfig;

/// Evaluate `snapshot` against `config`, stamping records with the current time.
pub fn evaluate(snapshot: &TelemetrySnapshot, config: &AlertConfig) -> Vec<AlertRecord> {
    evaluate_at(snapshot, config, Utc::now())
}

/// Same as [`evaluate`] with an explicit timestamp for the produced records.
pub fn evaluate_at(
    snapshot: &TelemetrySnapshot,
    config: &AlertConfig,
    now: DateTime<Utc>,
) -> Vec<AlertRecord> {
    if !config.enabled {
        return Vec::new();
    }

    AlertKind::ALL
        .into_iter()
        .filter_map(|kind| violation_message(kind, snapshot, config))
        .map(|(kind, message)| AlertRecord {
            kind,
            severity: kind.severity(),
            message,
            timestamp: now,
        })
        .collect()
}

fn violation_message(
    kind: AlertKind,
    snapshot: &TelemetrySnapshot,
    config: &AlertConfig,
) -> Option<(AlertKind, String)> {
    let message = match kind {
        AlertKind::BatteryLow => {
            (f64::from(snapshot.battery_percent) < config.battery_low_threshold)
                .then(|| format!("Battery at {}%", snapshot.battery_percent))
        }
        AlertKind::AltitudeExceeded => (snapshot.altitude_m > config.altitude_max_m)
            .then(|| format!("Altitude {:.1}m exceeds limit", snapshot.altitude_m)),
        AlertKind::SpeedExceeded => (snapshot.ground_speed_ms > config.speed_max_ms)
            .then(|| format!("Speed {:.1}m/s exceeds limit", snapshot.ground_speed_ms)),
    };
    message.map(|m| (kind, m))
}

/// Turns level-triggered records into transition-only records.
///
/// A kind passes through once when it starts firing, then is suppressed until
/// an evaluation comes back without it.
#[derive(Debug, Default)]
pub struct EdgeFilter {
    active: HashSet<AlertKind>,
}

impl EdgeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&mut self, records: Vec<AlertRecord>) -> Vec<AlertRecord> {
        let firing: HashSet<AlertKind> = records.iter().map(|r| r.kind).collect();
        let fresh = records
            .into_iter()
            .filter(|r| !self.active.contains(&r.kind))
            .collect();
        self.active = firing;
        fresh
    }

    pub fn reset(&mut self) {
        self.active.clear();
    }
}
