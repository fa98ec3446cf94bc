//! Safety thresholds for alert evaluation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Thresholds used by the alert engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Battery percentage below which BATTERY_LOW fires
    pub battery_low_threshold: f64,
    /// Relative altitude ceiling in meters
    pub altitude_max_m: f64,
    /// Ground speed ceiling in meters per second
    pub speed_max_ms: f64,
    pub enabled: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            battery_low_threshold: 20.0,
            altitude_max_m: 100.0,
            speed_max_ms: 20.0,
            enabled: true,
        }
    }
}

/// Partial configuration update. Unrecognized keys are rejected at parse time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_low_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_max_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_max_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid alert config: {0}")]
    Malformed(String),
    #[error("{field} must be between 0 and 100, got {value}")]
    PercentOutOfRange { field: &'static str, value: f64 },
    #[error("{field} must be a finite, non-negative number, got {value}")]
    InvalidLimit { field: &'static str, value: f64 },
}

impl AlertConfigUpdate {
    /// Parse a JSON body, rejecting unknown keys and mistyped values.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Check every supplied value without touching any config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(value) = self.battery_low_threshold {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::PercentOutOfRange {
                    field: "battery_low_threshold",
                    value,
                });
            }
        }
        for (field, value) in [
            ("altitude_max_m", self.altitude_max_m),
            ("speed_max_ms", self.speed_max_ms),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::InvalidLimit { field, value });
                }
            }
        }
        Ok(())
    }
}

impl AlertConfig {
    /// Validate `update` and merge it. On error the config is left unchanged.
    pub fn merge(&mut self, update: &AlertConfigUpdate) -> Result<(), ConfigError> {
        update.validate()?;
        if let Some(value) = update.battery_low_threshold {
            self.battery_low_threshold = value;
        }
        if let Some(value) = update.altitude_max_m {
            self.altitude_max_m = value;
        }
        if let Some(value) = update.speed_max_ms {
            self.speed_max_ms = value;
        }
        if let Some(value) = update.enabled {
            self.enabled = value;
        }
        Ok(())
    }
}

/// When a persistently violated rule produces records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertTrigger {
    /// A fresh record on every evaluation while the rule is violated
    #[default]
    Level,
    /// One record when a rule goes from ok to violated
    Edge,
}

impl AlertTrigger {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "level" | "every_tick" => Some(Self::Level),
            "edge" | "transition" => Some(Self::Edge),
            _ => None,
        }
    }
}
