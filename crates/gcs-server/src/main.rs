//! Cloud GCS server - always-on telemetry aggregation and streaming backend

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gcs_server::config::{self, Config};
use gcs_server::state::AppState;
use gcs_server::{api, ingest, loops};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(config::json_logs_requested())?;

    tracing::info!("Starting Cloud GCS server...");

    let config = Config::from_env();
    let port = config.server_port;
    tracing::info!(
        "Tick {}ms, history {}, alert log {}, trigger {:?}, ingest {:?}",
        config.tick_period_ms,
        config.max_history,
        config.max_alerts,
        config.alert_trigger,
        config.ingest
    );
    let state = Arc::new(AppState::new(config.clone()));
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Start background work
    ingest::spawn(state.clone(), &config, shutdown_tx.subscribe());
    let broadcaster = tokio::spawn(loops::broadcast_loop::run_broadcast_loop(
        state.clone(),
        shutdown_tx.subscribe(),
    ));

    // Build the app
    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    broadcaster.await.ok();
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("gcs_server=debug".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
    let _ = shutdown_tx.send(());
}
