//! Producers that feed field updates into the telemetry store.
//!
//! Each source owns its transport and failure handling; a dead source only
//! leaves `link_status` stale, it never takes the process down.

pub mod mav;
pub mod simulator;

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::{Config, IngestSource};
use crate::state::AppState;

/// Start the configured ingestion source in the background.
pub fn spawn(state: Arc<AppState>, config: &Config, shutdown: broadcast::Receiver<()>) {
    match &config.ingest {
        IngestSource::Mavlink { url } => {
            if let Err(e) = mav::spawn_listener(state, url.clone()) {
                tracing::error!("Failed to start MAVLink listener: {:#}", e);
            }
        }
        IngestSource::Simulator => {
            tokio::spawn(simulator::run_simulator(state, shutdown));
        }
        IngestSource::Disabled => {
            tracing::warn!("Telemetry ingestion disabled; serving baseline snapshot only");
        }
    }
}
