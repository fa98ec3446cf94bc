//! Core data models for the ground control backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latitude of the baseline position reported before any link data arrives.
pub const BASELINE_LAT: f64 = 19.0760;
/// Longitude of the baseline position reported before any link data arrives.
pub const BASELINE_LON: f64 = 72.8777;

/// Health of the vehicle link as seen by the aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkStatus {
    /// Nothing has been received since startup
    #[default]
    NoDataYet,
    /// At least one update has been merged
    Ok,
}

/// Latest known state of the vehicle at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude relative to home, meters
    pub altitude_m: f64,
    pub ground_speed_ms: f64,
    /// Heading in degrees, always within [0, 360)
    pub heading_deg: f64,
    pub battery_percent: u8,
    pub flight_mode: String,
    pub system_status: String,
    pub link_status: LinkStatus,
}

impl TelemetrySnapshot {
    /// Baseline snapshot stamped with the given instant.
    pub fn baseline(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            latitude: BASELINE_LAT,
            longitude: BASELINE_LON,
            altitude_m: 0.0,
            ground_speed_ms: 0.0,
            heading_deg: 0.0,
            battery_percent: 100,
            flight_mode: "STANDBY".to_string(),
            system_status: "INIT".to_string(),
            link_status: LinkStatus::NoDataYet,
        }
    }

    /// Merge the recognized, in-range fields of `update` into this snapshot.
    ///
    /// Every call counts as proof of life for the link: `timestamp` is set to
    /// `now` and `link_status` becomes [`LinkStatus::Ok`] even when all of the
    /// supplied values were dropped as out of range.
    pub fn apply(&mut self, update: &FieldUpdate, now: DateTime<Utc>) {
        if let Some(lat) = update.latitude.filter(|v| v.is_finite() && v.abs() <= 90.0) {
            self.latitude = lat;
        }
        if let Some(lon) = update.longitude.filter(|v| v.is_finite() && v.abs() <= 180.0) {
            self.longitude = lon;
        }
        if let Some(alt) = update.altitude_m.filter(|v| v.is_finite()) {
            self.altitude_m = alt;
        }
        if let Some(speed) = update.ground_speed_ms.filter(|v| v.is_finite() && *v >= 0.0) {
            self.ground_speed_ms = speed;
        }
        if let Some(heading) = update.heading_deg.filter(|v| v.is_finite()) {
            self.heading_deg = normalize_heading(heading);
        }
        // Negative battery means "unknown" on the wire
        if let Some(battery) = update.battery_percent.filter(|v| *v >= 0) {
            self.battery_percent = battery.min(100) as u8;
        }
        if let Some(mode) = update.flight_mode.as_deref().filter(|s| !s.is_empty()) {
            self.flight_mode = mode.to_string();
        }
        if let Some(status) = update.system_status.as_deref().filter(|s| !s.is_empty()) {
            self.system_status = status.to_string();
        }

        self.timestamp = now;
        self.link_status = LinkStatus::Ok;
    }
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self::baseline(Utc::now())
    }
}

fn normalize_heading(heading: f64) -> f64 {
    let normalized = heading.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Partial telemetry delivered by an ingestion source.
///
/// Only the fields that are `Some` are merged into the live snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_speed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_deg: Option<f64>,
    /// Raw percentage; negative values mean unknown and are ignored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_percent: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_status: Option<String>,
}

impl FieldUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Kind of threshold violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    BatteryLow,
    AltitudeExceeded,
    SpeedExceeded,
}

impl AlertKind {
    pub const ALL: [AlertKind; 3] = [
        AlertKind::BatteryLow,
        AlertKind::AltitudeExceeded,
        AlertKind::SpeedExceeded,
    ];

    pub fn severity(self) -> AlertSeverity {
        match self {
            AlertKind::BatteryLow => AlertSeverity::High,
            AlertKind::AltitudeExceeded => AlertSeverity::Medium,
            AlertKind::SpeedExceeded => AlertSeverity::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

/// One detected threshold violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Serialized as `type` for compatibility with existing dashboards
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Payload published to streaming subscribers on every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamFrame {
    pub telemetry: TelemetrySnapshot,
    pub alerts: Vec<AlertRecord>,
}
