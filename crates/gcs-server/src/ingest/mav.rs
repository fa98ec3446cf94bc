//! MAVLink ingestion adapter.
//!
//! Wire decoding belongs to the `mavlink` crate; this module only maps the
//! decoded messages we care about onto telemetry field updates. Reads are
//! blocking, so the link runs on its own OS thread.

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use gcs_core::FieldUpdate;
use mavlink::common::MavMessage;
use mavlink::error::MessageReadError;

use crate::backoff::Backoff;
use crate::state::AppState;

/// `hdg` value meaning "heading unknown" in GLOBAL_POSITION_INT.
const HEADING_UNKNOWN: u16 = u16::MAX;

const RECONNECT_BASE: Duration = Duration::from_secs(1);
const RECONNECT_MAX: Duration = Duration::from_secs(30);

/// Start the listener thread. The thread lives for the rest of the process.
pub fn spawn_listener(state: Arc<AppState>, url: String) -> Result<()> {
    thread::Builder::new()
        .name("mavlink-ingest".to_string())
        .spawn(move || listen(&state, &url))
        .context("spawn mavlink listener thread")?;
    Ok(())
}

fn listen(state: &AppState, url: &str) {
    let mut backoff = Backoff::new(RECONNECT_BASE, RECONNECT_MAX);
    loop {
        if let Err(e) = read_link(state, url, &mut backoff) {
            let delay = backoff.next_delay();
            tracing::warn!(
                "MAVLink link error: {:#} (retry {} in {:?})",
                e,
                backoff.failures(),
                delay
            );
            thread::sleep(delay);
        }
    }
}

fn read_link(state: &AppState, url: &str, backoff: &mut Backoff) -> Result<()> {
    tracing::info!("Connecting to MAVLink source: {}", url);
    let conn = mavlink::connect::<MavMessage>(url)
        .with_context(|| format!("mavlink connect {}", url))?;

    tracing::info!("Waiting for MAVLink heartbeat...");
    let mut link_up = false;

    loop {
        let msg = match conn.recv() {
            Ok((_header, msg)) => msg,
            Err(MessageReadError::Io(e)) if is_transient(&e) => continue,
            Err(MessageReadError::Io(e)) => return Err(e).context("mavlink receive"),
            Err(e) => {
                tracing::debug!("Dropping undecodable MAVLink frame: {:?}", e);
                continue;
            }
        };

        if !link_up {
            if !matches!(msg, MavMessage::HEARTBEAT(_)) {
                continue;
            }
            tracing::info!("Heartbeat received. MAVLink link is up.");
            link_up = true;
            backoff.reset();
        }

        state.telemetry().update(&field_update(&msg));
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

/// Map a decoded message onto the fields it carries.
///
/// Messages we do not track yield an empty update, which still refreshes the
/// link timestamp.
pub fn field_update(msg: &MavMessage) -> FieldUpdate {
    match msg {
        MavMessage::GLOBAL_POSITION_INT(data) => {
            position_update(data.lat, data.lon, data.relative_alt, data.hdg)
        }
        MavMessage::VFR_HUD(data) => hud_update(data.groundspeed, data.heading),
        MavMessage::SYS_STATUS(data) => battery_update(data.battery_remaining),
        MavMessage::HEARTBEAT(data) => {
            let status = format!("{:?}", data.system_status);
            heartbeat_update(&status, data.custom_mode)
        }
        _ => FieldUpdate::default(),
    }
}

/// GLOBAL_POSITION_INT: degE7 coordinates, millimeter altitude, centidegree heading.
pub fn position_update(lat: i32, lon: i32, relative_alt_mm: i32, hdg_cdeg: u16) -> FieldUpdate {
    FieldUpdate {
        latitude: Some(f64::from(lat) / 1e7),
        longitude: Some(f64::from(lon) / 1e7),
        altitude_m: Some(f64::from(relative_alt_mm) / 1000.0),
        heading_deg: (hdg_cdeg != HEADING_UNKNOWN).then(|| f64::from(hdg_cdeg) / 100.0),
        ..Default::default()
    }
}

/// VFR_HUD: ground speed in m/s and integer compass heading.
pub fn hud_update(groundspeed: f32, heading: i16) -> FieldUpdate {
    FieldUpdate {
        ground_speed_ms: Some(f64::from(groundspeed)),
        heading_deg: Some(f64::from(heading)),
        ..Default::default()
    }
}

/// SYS_STATUS: remaining battery, -1 when the autopilot does not know.
pub fn battery_update(battery_remaining: i8) -> FieldUpdate {
    FieldUpdate {
        battery_percent: (battery_remaining >= 0).then(|| i32::from(battery_remaining)),
        ..Default::default()
    }
}

pub fn heartbeat_update(system_status: &str, custom_mode: u32) -> FieldUpdate {
    FieldUpdate {
        system_status: Some(system_status.trim_start_matches("MAV_STATE_").to_string()),
        flight_mode: Some(custom_mode.to_string()),
        ..Default::default()
    }
}
