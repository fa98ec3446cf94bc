//! Shared, internally synchronized components.

pub mod alerts;
pub mod history;
pub mod store;
pub mod telemetry;

pub use alerts::{AlertEngine, MAX_ACTIVE_ALERTS};
pub use history::{HistoryRing, MAX_HISTORY};
pub use store::AppState;
pub use telemetry::TelemetryStore;
