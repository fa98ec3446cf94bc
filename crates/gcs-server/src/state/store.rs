//! Process-wide application state shared by every task.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::state::{AlertEngine, HistoryRing, TelemetryStore};

/// Frames buffered per subscriber before it starts lagging.
const STREAM_CHANNEL_CAPACITY: usize = 16;

/// Application state - owns every shared component.
///
/// Built once in `main` and handed out as `Arc<AppState>`; each component
/// serializes its own mutation so callers never coordinate locks.
pub struct AppState {
    telemetry: TelemetryStore,
    history: HistoryRing,
    alerts: AlertEngine,
    tx: broadcast::Sender<Arc<str>>,
    config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let (tx, _) = broadcast::channel(STREAM_CHANNEL_CAPACITY);
        Self {
            telemetry: TelemetryStore::new(),
            history: HistoryRing::new(config.max_history),
            alerts: AlertEngine::new(config.max_alerts, config.alert_trigger),
            tx,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn telemetry(&self) -> &TelemetryStore {
        &self.telemetry
    }

    pub fn history(&self) -> &HistoryRing {
        &self.history
    }

    pub fn alerts(&self) -> &AlertEngine {
        &self.alerts
    }

    /// Attach a new streaming subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Fan a serialized frame out to every subscriber. Returns how many received it.
    pub fn publish(&self, payload: Arc<str>) -> usize {
        self.tx.send(payload).unwrap_or(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
