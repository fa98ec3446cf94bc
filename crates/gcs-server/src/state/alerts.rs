//! Alert engine: live thresholds plus the capped active-alert log.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError, RwLock};

use gcs_core::{
    evaluate, AlertConfig, AlertConfigUpdate, AlertRecord, AlertTrigger, ConfigError, EdgeFilter,
    TelemetrySnapshot,
};

/// Default number of alerts retained in the active log.
pub const MAX_ACTIVE_ALERTS: usize = 50;

pub struct AlertEngine {
    config: RwLock<AlertConfig>,
    log: Mutex<VecDeque<AlertRecord>>,
    capacity: usize,
    trigger: AlertTrigger,
    edges: Mutex<EdgeFilter>,
}

impl AlertEngine {
    pub fn new(capacity: usize, trigger: AlertTrigger) -> Self {
        let capacity = capacity.max(1);
        Self {
            config: RwLock::new(AlertConfig::default()),
            log: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            trigger,
            edges: Mutex::new(EdgeFilter::new()),
        }
    }

    pub fn trigger(&self) -> AlertTrigger {
        self.trigger
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn config(&self) -> AlertConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Validate and merge a partial config, returning the resulting full config.
    pub fn configure(&self, update: &AlertConfigUpdate) -> Result<AlertConfig, ConfigError> {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        config.merge(update)?;
        tracing::info!(
            battery_low_threshold = config.battery_low_threshold,
            altitude_max_m = config.altitude_max_m,
            speed_max_ms = config.speed_max_ms,
            enabled = config.enabled,
            "Alert config updated"
        );
        Ok(config.clone())
    }

    /// Run the threshold rules against `snapshot` under the current config.
    pub fn evaluate(&self, snapshot: &TelemetrySnapshot) -> Vec<AlertRecord> {
        let alerts = evaluate(snapshot, &self.config());
        match self.trigger {
            AlertTrigger::Level => alerts,
            AlertTrigger::Edge => self
                .edges
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .filter(alerts),
        }
    }

    /// Append to the active log, evicting the oldest beyond capacity.
    pub fn record(&self, alerts: Vec<AlertRecord>) {
        if alerts.is_empty() {
            return;
        }
        for alert in &alerts {
            tracing::debug!(kind = ?alert.kind, severity = ?alert.severity, "{}", alert.message);
        }
        let mut log = self.lock_log();
        log.extend(alerts);
        while log.len() > self.capacity {
            log.pop_front();
        }
    }

    /// Empty the log. In edge mode every rule re-arms, so a violation that
    /// persists past the clear is reported again on the next evaluation.
    pub fn clear(&self) {
        self.lock_log().clear();
        self.edges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();
    }

    /// Up to `limit` most recent alerts, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<AlertRecord> {
        let log = self.lock_log();
        let skip = log.len().saturating_sub(limit);
        log.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock_log().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_log().is_empty()
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, VecDeque<AlertRecord>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(MAX_ACTIVE_ALERTS, AlertTrigger::Level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gcs_core::AlertKind;

    fn low_battery() -> TelemetrySnapshot {
        TelemetrySnapshot {
            battery_percent: 5,
            ..TelemetrySnapshot::baseline(Utc::now())
        }
    }

    #[test]
    fn log_is_capped_and_keeps_newest() {
        let engine = AlertEngine::default();
        let snap = low_battery();
        for _ in 0..80 {
            let alerts = engine.evaluate(&snap);
            engine.record(alerts);
            assert!(engine.len() <= MAX_ACTIVE_ALERTS);
        }
        assert_eq!(engine.len(), MAX_ACTIVE_ALERTS);

        engine.record(vec![AlertRecord {
            kind: AlertKind::SpeedExceeded,
            severity: AlertKind::SpeedExceeded.severity(),
            message: "newest".to_string(),
            timestamp: Utc::now(),
        }]);
        let recent = engine.recent(2);
        assert_eq!(recent[0].kind, AlertKind::BatteryLow);
        assert_eq!(recent[1].message, "newest");
    }

    #[test]
    fn clear_is_idempotent() {
        let engine = AlertEngine::default();
        engine.record(engine.evaluate(&low_battery()));
        assert!(!engine.is_empty());

        engine.clear();
        assert!(engine.is_empty());
        engine.clear();
        assert!(engine.is_empty());
    }

    #[test]
    fn configure_merges_and_rejects_bad_values() {
        let engine = AlertEngine::default();
        let config = engine
            .configure(&AlertConfigUpdate {
                altitude_max_m: Some(50.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.altitude_max_m, 50.0);
        assert_eq!(config.battery_low_threshold, 20.0);

        let err = engine.configure(&AlertConfigUpdate {
            altitude_max_m: Some(f64::INFINITY),
            ..Default::default()
        });
        assert!(err.is_err());
        assert_eq!(engine.config().altitude_max_m, 50.0);
    }

    #[test]
    fn disabling_stops_evaluation() {
        let engine = AlertEngine::default();
        engine
            .configure(&AlertConfigUpdate {
                enabled: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert!(engine.evaluate(&low_battery()).is_empty());
    }

    #[test]
    fn edge_trigger_fires_once_per_violation() {
        let engine = AlertEngine::new(MAX_ACTIVE_ALERTS, AlertTrigger::Edge);
        let snap = low_battery();
        assert_eq!(engine.evaluate(&snap).len(), 1);
        assert!(engine.evaluate(&snap).is_empty());

        let recovered = TelemetrySnapshot::baseline(Utc::now());
        assert!(engine.evaluate(&recovered).is_empty());
        assert_eq!(engine.evaluate(&snap).len(), 1);
    }

    #[test]
    fn clear_rearms_edge_trigger() {
        let engine = AlertEngine::new(MAX_ACTIVE_ALERTS, AlertTrigger::Edge);
        let snap = low_battery();
        engine.record(engine.evaluate(&snap));
        assert!(engine.evaluate(&snap).is_empty());

        engine.clear();
        assert!(engine.is_empty());

        engine.record(engine.evaluate(&snap));
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.recent(1)[0].kind, AlertKind::BatteryLow);
    }
}
