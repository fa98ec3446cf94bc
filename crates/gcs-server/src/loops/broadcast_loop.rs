//! Fixed-rate telemetry broadcast loop.
//!
//! One shared ticker for the whole process: each tick reads the snapshot,
//! appends it to history, evaluates and records alerts, then fans a single
//! serialized frame out to every subscriber. Ticks are skipped while nobody is
//! listening, so history only grows while a stream is open.

use std::sync::Arc;

use gcs_core::StreamFrame;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};

use crate::state::AppState;

/// Run the broadcast loop until shutdown.
pub async fn run_broadcast_loop(state: Arc<AppState>, mut shutdown: broadcast::Receiver<()>) {
    let period = state.config().tick_period();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!("Broadcast loop started ({:?} period)", period);

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Broadcast loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                if state.subscriber_count() == 0 {
                    continue;
                }
                if let Err(e) = tick(&state) {
                    tracing::error!("Failed to publish telemetry frame: {}", e);
                }
            }
        }
    }
}

/// One read -> append -> evaluate -> record -> publish cycle.
pub fn tick(state: &AppState) -> serde_json::Result<StreamFrame> {
    let snapshot = state.telemetry().read();
    state.history().append(snapshot.clone());

    let alerts = state.alerts().evaluate(&snapshot);
    state.alerts().record(alerts);

    let frame = StreamFrame {
        telemetry: snapshot,
        alerts: state.alerts().recent(state.config().stream_alerts),
    };
    let payload: Arc<str> = serde_json::to_string(&frame)?.into();
    let delivered = state.publish(payload);
    tracing::trace!(delivered, "Published telemetry frame");

    Ok(frame)
}
