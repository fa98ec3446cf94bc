//! Core telemetry model, alert rules and flight statistics.

pub mod alerts;
pub mod models;
pub mod rules;
pub mod stats;

pub use alerts::{evaluate, evaluate_at, EdgeFilter};
pub use models::{
    AlertKind, AlertRecord, AlertSeverity, FieldUpdate, LinkStatus, StreamFrame,
    TelemetrySnapshot,
};
pub use rules::{AlertConfig, AlertConfigUpdate, AlertTrigger, ConfigError};
pub use stats::FlightStats;
