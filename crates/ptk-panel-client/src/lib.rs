//! D-Bus client library for communicating with the PTK Panel Daemon.

use anyhow::{Context, Result};
use tracing::debug;
use zbus::{proxy, Connection};

/// Well-known bus name of the daemon.
pub const SERVICE_NAME: &str = "org.ptkpanel.Daemon";

/// D-Bus bus type selection.
#[derive(Debug, Clone, Copy, Default)]
pub enum BusType {
    /// Session bus (user session).
    Session,
    /// System bus (system-wide).
    System,
    /// Try session first, fall back to system.
    #[default]
    Auto,
}

/// D-Bus proxy for the PTK Panel Daemon.
#[proxy(
    interface = "org.ptkpanel.Daemon1",
    default_service = "org.ptkpanel.Daemon",
    default_path = "/org/ptkpanel/Daemon"
)]
trait Daemon1 {
    /// Gets the current ring LED brightness (0-3).
    fn get_brightness(&self) -> zbus::Result<u8>;

    /// Sets the ring LED brightness (clamped to 0-3).
    fn set_brightness(&self, value: i32) -> zbus::Result<()>;

    /// Selects the active ring segment (clamped to 0-3).
    fn set_ring_led(&self, value: i32) -> zbus::Result<()>;

    /// Gets the active ring segment.
    fn get_ring_led(&self) -> zbus::Result<u8>;

    /// Uploads an image file to a panel.
    fn upload_image(
        &self,
        panel: &str,
        path: &str,
        flip_vertical: bool,
        flip_horizontal: bool,
    ) -> zbus::Result<()>;

    /// Re-uploads the configured images.
    fn reload_images(&self) -> zbus::Result<u32>;

    /// Shuts down the daemon.
    fn quit(&self) -> zbus::Result<()>;

    /// Whether the tablet is connected.
    #[zbus(property)]
    fn connected(&self) -> zbus::Result<bool>;
}

/// D-Bus client wrapper for the daemon.
pub struct DaemonClient {
    proxy: Daemon1Proxy<'static>,
}

impl DaemonClient {
    /// Attempts to connect to the daemon via D-Bus with auto bus detection.
    pub async fn connect() -> Result<Self> {
        Self::connect_with_bus(BusType::Auto).await
    }

    /// Attempts to connect to the daemon via D-Bus with specified bus type.
    pub async fn connect_with_bus(bus_type: BusType) -> Result<Self> {
        let connection = match bus_type {
            BusType::Session => {
                debug!("Connecting to session bus");
                Connection::session()
                    .await
                    .context("Failed to connect to session bus")?
            }
            BusType::System => {
                debug!("Connecting to system bus");
                Connection::system()
                    .await
                    .context("Failed to connect to system bus")?
            }
            BusType::Auto => Self::connect_auto().await?,
        };

        let proxy = Daemon1Proxy::new(&connection)
            .await
            .context("Failed to create D-Bus proxy")?;

        Ok(Self { proxy })
    }

    /// Picks whichever bus the daemon is registered on, session first.
    async fn connect_auto() -> Result<Connection> {
        match Connection::session().await {
            Ok(session) => {
                if Self::daemon_registered(&session).await {
                    debug!("{} owned on session bus", SERVICE_NAME);
                    return Ok(session);
                }
                debug!("{} not on session bus", SERVICE_NAME);
            }
            Err(e) => debug!("Session bus unavailable: {}", e),
        }

        let system = Connection::system()
            .await
            .context("Failed to connect to system bus")?;
        if !Self::daemon_registered(&system).await {
            anyhow::bail!("{} is not registered on the session or system bus", SERVICE_NAME);
        }
        debug!("{} owned on system bus", SERVICE_NAME);
        Ok(system)
    }

    /// Returns true if some peer on the connection owns the daemon's bus name.
    async fn daemon_registered(conn: &Connection) -> bool {
        let Ok(name) = zbus::names::BusName::try_from(SERVICE_NAME) else {
            return false;
        };
        let Ok(dbus) = zbus::fdo::DBusProxy::new(conn).await else {
            return false;
        };
        dbus.name_has_owner(name).await.unwrap_or(false)
    }

    /// Gets the ring LED brightness.
    pub async fn get_brightness(&self) -> Result<u8> {
        self.proxy
            .get_brightness()
            .await
            .context("Failed to get brightness via D-Bus")
    }

    /// Sets the ring LED brightness.
    pub async fn set_brightness(&self, value: i32) -> Result<()> {
        self.proxy
            .set_brightness(value)
            .await
            .context("Failed to set brightness via D-Bus")
    }

    /// Selects the active ring segment.
    pub async fn set_ring_led(&self, value: i32) -> Result<()> {
        self.proxy
            .set_ring_led(value)
            .await
            .context("Failed to set ring LED via D-Bus")
    }

    /// Gets the active ring segment.
    pub async fn get_ring_led(&self) -> Result<u8> {
        self.proxy
            .get_ring_led()
            .await
            .context("Failed to get ring LED via D-Bus")
    }

    /// Uploads an image file to a panel.
    pub async fn upload_image(
        &self,
        panel: &str,
        path: &str,
        flip_vertical: bool,
        flip_horizontal: bool,
    ) -> Result<()> {
        self.proxy
            .upload_image(panel, path, flip_vertical, flip_horizontal)
            .await
            .context("Failed to upload image via D-Bus")
    }

    /// Re-uploads the configured images.
    pub async fn reload_images(&self) -> Result<u32> {
        self.proxy
            .reload_images()
            .await
            .context("Failed to reload images via D-Bus")
    }

    /// Shuts down the daemon.
    pub async fn quit(&self) -> Result<()> {
        self.proxy
            .quit()
            .await
            .context("Failed to quit daemon via D-Bus")
    }

    /// Checks if the tablet is connected.
    pub async fn is_connected(&self) -> Result<bool> {
        self.proxy
            .connected()
            .await
            .context("Failed to get connection status via D-Bus")
    }
}
