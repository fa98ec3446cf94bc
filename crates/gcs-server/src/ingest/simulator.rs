//! Synthetic telemetry source for demos and local development.

use std::f64::consts::PI;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcs_core::models::{BASELINE_LAT, BASELINE_LON};
use gcs_core::FieldUpdate;
use tokio::sync::broadcast;
use tokio::time::interval;

use crate::state::AppState;

const SIM_PERIOD: Duration = Duration::from_millis(200);

/// Meters per degree of latitude (approximate)
const METERS_PER_DEG: f64 = 111_320.0;

/// Slow circular orbit with gently varying altitude and speed.
pub struct OrbitPath {
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_m: f64,
    pub base_altitude_m: f64,
    /// Angular rate in radians per second
    pub angular_rate: f64,
}

impl OrbitPath {
    pub fn around_baseline() -> Self {
        Self {
            center_lat: BASELINE_LAT,
            center_lon: BASELINE_LON,
            radius_m: 50.0,
            base_altitude_m: 10.0,
            angular_rate: 0.05,
        }
    }

    /// Field update for `t` seconds after the simulator started.
    pub fn sample(&self, t: f64) -> FieldUpdate {
        let angle = t * self.angular_rate;
        let dx = self.radius_m * angle.cos();
        let dy = self.radius_m * angle.sin();

        let lat = self.center_lat + dy / METERS_PER_DEG;
        let lon = self.center_lon + dx / (METERS_PER_DEG * self.center_lat.to_radians().cos());

        // One percent every ten seconds, wrapping after a full drain
        let drained = (t / 10.0) as i64 % 100;

        FieldUpdate {
            latitude: Some(lat),
            longitude: Some(lon),
            altitude_m: Some(self.base_altitude_m + 5.0 * angle.sin()),
            ground_speed_ms: Some(5.0 + 2.0 * (angle * 0.7).sin()),
            heading_deg: Some((angle * 180.0 / PI).rem_euclid(360.0)),
            battery_percent: Some((100 - drained) as i32),
            flight_mode: Some("GUIDED".to_string()),
            system_status: Some("ACTIVE".to_string()),
        }
    }
}

/// Feed simulated updates until shutdown.
pub async fn run_simulator(state: Arc<AppState>, mut shutdown: broadcast::Receiver<()>) {
    let path = OrbitPath::around_baseline();
    let started = Instant::now();
    let mut ticker = interval(SIM_PERIOD);
    tracing::info!("Simulated telemetry source started");

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Simulated telemetry source shutting down");
                break;
            }
            _ = ticker.tick() => {
                state.telemetry().update(&path.sample(started.elapsed().as_secs_f64()));
            }
        }
    }
}
