//! D-Bus interface implementation using zbus.
//!
//! Provides the `org.ptkpanel.Daemon1` interface.

use std::path::PathBuf;
use std::sync::Arc;

use ptk_panel_hw::{Flip, Panel};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use zbus::{interface, Connection};

use crate::config::DbusBusType;
use crate::lighting::LightingHandle;
use crate::state::AppState;

/// D-Bus interface implementation for the PTK Panel Daemon.
pub struct Daemon1Interface {
    state: Arc<AppState>,
    lighting: LightingHandle,
    cancel: watch::Receiver<bool>,
    shutdown_tx: mpsc::Sender<()>,
}

impl Daemon1Interface {
    /// Creates a new D-Bus interface.
    pub fn new(
        state: Arc<AppState>,
        lighting: LightingHandle,
        cancel: watch::Receiver<bool>,
        shutdown_tx: mpsc::Sender<()>,
    ) -> Self {
        Self {
            state,
            lighting,
            cancel,
            shutdown_tx,
        }
    }
}

fn failed(e: anyhow::Error) -> zbus::fdo::Error {
    zbus::fdo::Error::Failed(e.to_string())
}

#[interface(name = "org.ptkpanel.Daemon1")]
impl Daemon1Interface {
    /// Gets the current ring LED brightness (0-3).
    async fn get_brightness(&self) -> zbus::fdo::Result<u8> {
        self.lighting.brightness().await.map_err(failed)
    }

    /// Sets the ring LED brightness. Out-of-range values are clamped to 0-3.
    async fn set_brightness(&self, value: i32) -> zbus::fdo::Result<()> {
        let stored = self.lighting.set_brightness(value).await.map_err(failed)?;
        debug!("D-Bus: SetBrightness({}) -> {}", value, stored);
        Ok(())
    }

    /// Selects the active ring segment. Out-of-range values are clamped to 0-3.
    async fn set_ring_led(&self, value: i32) -> zbus::fdo::Result<()> {
        let stored = self.lighting.set_ring_led(value).await.map_err(failed)?;
        debug!("D-Bus: SetRingLed({}) -> {}", value, stored);
        Ok(())
    }

    /// Gets the active ring segment (0-3).
    async fn get_ring_led(&self) -> zbus::fdo::Result<u8> {
        self.lighting.ring_led().await.map_err(failed)
    }

    /// Uploads an image file to a panel ("top" or "bottom").
    ///
    /// On success the image is remembered for `ReloadImages`.
    async fn upload_image(
        &self,
        panel: &str,
        path: &str,
        flip_vertical: bool,
        flip_horizontal: bool,
    ) -> zbus::fdo::Result<()> {
        let panel: Panel = panel
            .parse()
            .map_err(|_| zbus::fdo::Error::InvalidArgs("Panel must be top or bottom".to_string()))?;
        if path.is_empty() {
            return Err(zbus::fdo::Error::InvalidArgs(
                "Image path must not be empty".to_string(),
            ));
        }

        let flip = Flip::new(flip_vertical, flip_horizontal);
        let path = PathBuf::from(path);
        let state = self.state.clone();
        let upload_path = path.clone();

        tokio::task::spawn_blocking(move || state.upload_panel(panel, &upload_path, flip))
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?
            .map_err(failed)?;

        self.state.set_panel_image(panel, &path, flip);
        debug!("D-Bus: UploadImage({}, {})", panel, path.display());
        Ok(())
    }

    /// Re-uploads the configured images. Returns the number of panels updated.
    async fn reload_images(&self) -> zbus::fdo::Result<u32> {
        let state = self.state.clone();
        let cancel = self.cancel.clone();

        let updated = tokio::task::spawn_blocking(move || state.upload_configured(&cancel))
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;

        debug!("D-Bus: ReloadImages -> {}", updated);
        Ok(updated as u32)
    }

    /// Shuts down the daemon.
    async fn quit(&self) -> zbus::fdo::Result<()> {
        info!("D-Bus: Quit requested");
        self.shutdown_tx
            .send(())
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;
        Ok(())
    }

    // Properties

    /// Whether the tablet is connected.
    #[zbus(property)]
    fn connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Current ring LED brightness (0-3).
    #[zbus(property)]
    async fn brightness(&self) -> zbus::fdo::Result<u8> {
        self.lighting.brightness().await.map_err(failed)
    }

    /// Current active ring segment (0-3).
    #[zbus(property)]
    async fn ring_led(&self) -> zbus::fdo::Result<u8> {
        self.lighting.ring_led().await.map_err(failed)
    }
}

/// Connects to the appropriate D-Bus bus based on configuration.
async fn connect_to_bus(bus_type: DbusBusType) -> anyhow::Result<(Connection, &'static str)> {
    match bus_type {
        DbusBusType::Session => {
            let conn = Connection::session()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to session bus: {}", e))?;
            Ok((conn, "session"))
        }
        DbusBusType::System => {
            let conn = Connection::system()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to system bus: {}", e))?;
            Ok((conn, "system"))
        }
        DbusBusType::Auto => match Connection::session().await {
            Ok(conn) => Ok((conn, "session")),
            Err(session_err) => {
                warn!(
                    "Session bus unavailable ({}), trying system bus",
                    session_err
                );
                let conn = Connection::system().await.map_err(|system_err| {
                    anyhow::anyhow!(
                        "Failed to connect to any D-Bus: session={}, system={}",
                        session_err,
                        system_err
                    )
                })?;
                Ok((conn, "system"))
            }
        },
    }
}

/// Runs the D-Bus server.
pub async fn run_dbus_server(
    interface: Daemon1Interface,
    bus_type: DbusBusType,
) -> anyhow::Result<Connection> {
    let (connection, bus_name) = connect_to_bus(bus_type).await?;

    connection
        .object_server()
        .at("/org/ptkpanel/Daemon", interface)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to register object: {}", e))?;

    connection
        .request_name("org.ptkpanel.Daemon")
        .await
        .map_err(|e| anyhow::anyhow!("Failed to request bus name: {}", e))?;

    info!(
        "D-Bus service registered at org.ptkpanel.Daemon on {} bus",
        bus_name
    );
    Ok(connection)
}
