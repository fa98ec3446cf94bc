//! Flight statistics derived from telemetry history.

use serde::{Deserialize, Serialize};

use crate::models::TelemetrySnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightStats {
    /// Estimated as `data_points * tick_period_secs`
    pub flight_duration_seconds: f64,
    pub max_altitude: f64,
    pub avg_altitude: f64,
    pub max_speed: f64,
    pub avg_speed: f64,
    pub data_points: usize,
}

impl FlightStats {
    /// Summarize `history`. Returns `None` when there is nothing to summarize.
    pub fn from_history<'a, I>(history: I, tick_period_secs: f64) -> Option<Self>
    where
        I: IntoIterator<Item = &'a TelemetrySnapshot>,
    {
        let mut count = 0usize;
        let mut max_altitude = f64::NEG_INFINITY;
        let mut max_speed = f64::NEG_INFINITY;
        let mut altitude_sum = 0.0;
        let mut speed_sum = 0.0;

        for snap in history {
            count += 1;
            max_altitude = max_altitude.max(snap.altitude_m);
            max_speed = max_speed.max(snap.ground_speed_ms);
            altitude_sum += snap.altitude_m;
            speed_sum += snap.ground_speed_ms;
        }

        if count == 0 {
            return None;
        }

        let n = count as f64;
        Some(Self {
            flight_duration_seconds: n * tick_period_secs,
            max_altitude,
            avg_altitude: altitude_sum / n,
            max_speed,
            avg_speed: speed_sum / n,
            data_points: count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snap(altitude_m: f64, ground_speed_ms: f64) -> TelemetrySnapshot {
        TelemetrySnapshot {
            altitude_m,
            ground_speed_ms,
            ..TelemetrySnapshot::baseline(Utc::now())
        }
    }

    #[test]
    fn empty_history_has_no_stats() {
        let history: Vec<TelemetrySnapshot> = Vec::new();
        assert_eq!(FlightStats::from_history(&history, 0.2), None);
    }

    #[test]
    fn summarizes_altitude_and_speed() {
        let history = vec![snap(10.0, 2.0), snap(30.0, 6.0), snap(20.0, 4.0)];
        let stats = FlightStats::from_history(&history, 0.2).unwrap();

        assert_eq!(stats.data_points, 3);
        assert!((stats.flight_duration_seconds - 0.6).abs() < 1e-9);
        assert_eq!(stats.max_altitude, 30.0);
        assert!((stats.avg_altitude - 20.0).abs() < 1e-9);
        assert_eq!(stats.max_speed, 6.0);
        assert!((stats.avg_speed - 4.0).abs() < 1e-9);
    }
}
