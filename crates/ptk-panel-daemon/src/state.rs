//! Application state management.

use anyhow::{anyhow, Result};
use ptk_panel_hw::{Error as HwError, Flip, LightingController, Panel, Tablet};
use std::path::Path;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// Configuration
    config: RwLock<Config>,

    /// Tablet (optional - may not be present)
    tablet: Option<Arc<Tablet>>,

    /// Ring LED state, mutated only by the lighting task
    lighting: LightingController,
}

impl AppState {
    /// Creates a new application state, opening the configured tablet.
    pub fn new(config: Config) -> Self {
        let opened = if config.device.path == "auto" {
            Tablet::open()
        } else {
            Tablet::open_path(&config.device.path)
        };

        let tablet = match opened {
            Ok(tablet) => {
                info!("Tablet opened successfully");
                Some(tablet)
            }
            Err(e) => {
                warn!("Tablet not available: {}. Running in headless mode.", e);
                None
            }
        };

        Self::with_tablet(config, tablet)
    }

    /// Creates a state around an already opened tablet.
    pub fn with_tablet(config: Config, tablet: Option<Tablet>) -> Self {
        let tablet = tablet.map(Arc::new);
        let initial = config.lighting.initial_state();
        info!(
            "Lighting: brightness {}, ring {}",
            initial.brightness(),
            initial.active_ring()
        );

        Self {
            lighting: LightingController::new(initial, tablet.clone()),
            config: RwLock::new(config),
            tablet,
        }
    }

    /// Records the image for a panel so later reloads use it.
    pub fn set_panel_image(&self, panel: Panel, path: &Path, flip: Flip) {
        let mut config = self.config.write().unwrap();
        let entry = config.panels.get_mut(panel);
        entry.image = path.to_string_lossy().to_string();
        entry.flip_vertical = flip.vertical;
        entry.flip_horizontal = flip.horizontal;
    }

    /// Returns true if the tablet is connected.
    pub fn is_connected(&self) -> bool {
        self.tablet.is_some()
    }

    /// Returns the lighting controller.
    pub fn lighting(&self) -> &LightingController {
        &self.lighting
    }

    /// Uploads one image to a panel.
    pub fn upload_panel(&self, panel: Panel, path: &Path, flip: Flip) -> Result<()> {
        let Some(tablet) = self.tablet.as_ref() else {
            warn!(
                "{} panel not updated (device stage, {}): no tablet connected",
                panel,
                path.display()
            );
            return Err(anyhow!("no tablet connected"));
        };

        tablet.upload_file(panel, path, flip).map_err(|e| {
            warn!(
                "{} panel not updated ({} stage, {}): {}",
                panel,
                failure_stage(&e),
                path.display(),
                e
            );
            anyhow::Error::new(e)
        })
    }

    /// Uploads the configured image of every panel.
    ///
    /// Failures are logged per panel and never stop the other panel. The
    /// cancellation flag is checked before each panel starts; a panel
    /// already transmitting is finished. Returns the number of panels updated.
    pub fn upload_configured(&self, cancel: &watch::Receiver<bool>) -> usize {
        let panels = self.config.read().unwrap().panels.clone();
        let mut updated = 0;

        for panel in Panel::ALL {
            if *cancel.borrow() {
                info!("Panel upload cancelled before {} panel", panel);
                break;
            }

            let panel_config = panels.get(panel);
            let Some(path) = panel_config.image_path() else {
                debug!("No image configured for {} panel", panel);
                continue;
            };

            if self.upload_panel(panel, &path, panel_config.flip()).is_ok() {
                info!("{} panel updated from {}", panel, path.display());
                updated += 1;
            }
        }

        updated
    }
}

/// Names the pipeline stage an upload failed in.
fn failure_stage(error: &HwError) -> &'static str {
    match error {
        HwError::ImageSource { .. } => "read",
        HwError::Decode(_) => "decode",
        HwError::BatchAborted { .. } => "transmit",
        _ => "device",
    }
}
