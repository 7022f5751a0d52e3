//! PTK Panel Daemon
//!
//! Background service that uploads images to the OLED panels of a Wacom PTK
//! tablet and serves ring LED control over D-Bus.

mod config;
mod dbus;
mod lighting;
mod state;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use dbus::Daemon1Interface;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = Config::load(&config_path).context("Failed to load configuration")?;
    info!("Loaded configuration from: {}", config_path);

    // Initialize application state
    let bus_type = config.dbus.bus;
    let state = Arc::new(AppState::new(config));

    // Lighting commands are serialized through one task
    let lighting = lighting::spawn(state.clone());

    // Create channels for cancellation and shutdown
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    // Keep a clone of shutdown_tx to prevent the channel from closing if D-Bus fails
    let _shutdown_tx_keepalive = shutdown_tx.clone();

    // Start D-Bus service
    let interface = Daemon1Interface::new(
        state.clone(),
        lighting,
        cancel_rx.clone(),
        shutdown_tx,
    );
    let _dbus_connection = match dbus::run_dbus_server(interface, bus_type).await {
        Ok(conn) => {
            info!("D-Bus service started");
            Some(conn)
        }
        Err(e) => {
            warn!(
                "Failed to start D-Bus service: {}. Continuing without D-Bus.",
                e
            );
            None
        }
    };

    // Upload the configured panel images
    let upload_state = state.clone();
    let upload = tokio::task::spawn_blocking(move || upload_state.upload_configured(&cancel_rx));

    // Setup Unix signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    tokio::select! {
        _ = shutdown_rx.recv() => {
            info!("Shutdown requested via D-Bus");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
    }

    // Panels not yet started are skipped; one mid-transmission is finished
    let _ = cancel_tx.send(true);
    match upload.await {
        Ok(updated) => info!("{} panel(s) updated at startup", updated),
        Err(e) => warn!("Panel upload task failed: {}", e),
    }

    Ok(())
}
