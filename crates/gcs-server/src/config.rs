//! Server configuration from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use gcs_core::AlertTrigger;

use crate::state::{MAX_ACTIVE_ALERTS, MAX_HISTORY};

const DEFAULT_MAVLINK_URL: &str = "udpin:0.0.0.0:14550";

/// Where telemetry field updates come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestSource {
    /// Live MAVLink link, e.g. `udpin:0.0.0.0:14550` or `serial:/dev/ttyUSB0:57600`
    Mavlink { url: String },
    /// Synthetic orbit around the baseline position
    Simulator,
    /// No producer; the snapshot stays at its baseline
    Disabled,
}

impl IngestSource {
    /// MAVLink source on `url`, or the default UDP listen address.
    pub fn mavlink(url: Option<String>) -> Self {
        IngestSource::Mavlink {
            url: url.unwrap_or_else(|| DEFAULT_MAVLINK_URL.to_string()),
        }
    }

    /// Case-insensitive source name; `mavlink_url` only applies to `mavlink`.
    pub fn parse(value: &str, mavlink_url: Option<String>) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "mavlink" => Some(Self::mavlink(mavlink_url)),
            "sim" | "simulator" => Some(Self::Simulator),
            "none" | "off" => Some(Self::Disabled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub tick_period_ms: u64,
    pub max_history: usize,
    pub max_alerts: usize,
    /// Alerts attached to each streamed frame
    pub stream_alerts: usize,
    pub ingest: IngestSource,
    pub alert_trigger: AlertTrigger,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            tick_period_ms: 200,
            max_history: MAX_HISTORY,
            max_alerts: MAX_ACTIVE_ALERTS,
            stream_alerts: 5,
            ingest: IngestSource::mavlink(None),
            alert_trigger: AlertTrigger::Level,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mavlink_url = env::var("GCS_MAVLINK_URL").ok();
        let ingest = match env::var("GCS_INGEST") {
            Ok(raw) => IngestSource::parse(&raw, mavlink_url.clone()).unwrap_or_else(|| {
                tracing::warn!("Unknown GCS_INGEST '{}', using MAVLink", raw);
                IngestSource::mavlink(mavlink_url)
            }),
            Err(_) => IngestSource::mavlink(mavlink_url),
        };
        let alert_trigger = match env::var("GCS_ALERT_TRIGGER") {
            Ok(raw) => AlertTrigger::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown GCS_ALERT_TRIGGER '{}', using level", raw);
                AlertTrigger::Level
            }),
            Err(_) => defaults.alert_trigger,
        };

        Self {
            server_port: env_parse("GCS_PORT", defaults.server_port),
            tick_period_ms: env_parse("GCS_TICK_MS", defaults.tick_period_ms).max(1),
            max_history: env_parse("GCS_MAX_HISTORY", defaults.max_history).max(1),
            max_alerts: env_parse("GCS_MAX_ALERTS", defaults.max_alerts).max(1),
            stream_alerts: env_parse("GCS_STREAM_ALERTS", defaults.stream_alerts),
            ingest,
            alert_trigger,
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn tick_period_secs(&self) -> f64 {
        self.tick_period().as_secs_f64()
    }
}

/// Read before the subscriber is installed, so parse failures are silent.
pub fn json_logs_requested() -> bool {
    env::var("GCS_LOG_JSON")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn env_parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}='{}'", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_cadence() {
        let config = Config::default();
        assert_eq!(config.tick_period(), Duration::from_millis(200));
        assert!((config.tick_period_secs() - 0.2).abs() < 1e-9);
        assert_eq!(config.max_history, 1000);
        assert_eq!(config.max_alerts, 50);
        assert_eq!(config.stream_alerts, 5);
        assert_eq!(
            config.ingest,
            IngestSource::Mavlink {
                url: DEFAULT_MAVLINK_URL.to_string()
            }
        );
    }

    #[test]
    fn ingest_names_ignore_case_and_whitespace() {
        assert_eq!(IngestSource::parse("SIM", None), Some(IngestSource::Simulator));
        assert_eq!(IngestSource::parse(" Off ", None), Some(IngestSource::Disabled));
        assert_eq!(
            IngestSource::parse("MAVLink", Some("serial:/dev/ttyUSB0:57600".to_string())),
            Some(IngestSource::Mavlink {
                url: "serial:/dev/ttyUSB0:57600".to_string()
            })
        );
        assert_eq!(IngestSource::parse("carrier-pigeon", None), None);
    }
}
