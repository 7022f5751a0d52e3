//! Configuration management.

use anyhow::{Context, Result};
use ptk_panel_hw::{Flip, LightingState, Panel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Tablet device configuration
    #[serde(default)]
    pub device: DeviceConfig,

    /// Panel images
    #[serde(default)]
    pub panels: PanelsConfig,

    /// Initial ring LED state
    #[serde(default)]
    pub lighting: LightingConfig,

    /// D-Bus configuration
    #[serde(default)]
    pub dbus: DbusConfig,
}

/// Tablet device configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// HID device path or "auto" for auto-detection
    #[serde(default = "default_device_path")]
    pub path: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: default_device_path(),
        }
    }
}

/// Images for both panels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelsConfig {
    #[serde(default)]
    pub top: PanelConfig,

    #[serde(default)]
    pub bottom: PanelConfig,
}

impl PanelsConfig {
    /// Returns the configuration of one panel.
    pub fn get(&self, panel: Panel) -> &PanelConfig {
        match panel {
            Panel::Top => &self.top,
            Panel::Bottom => &self.bottom,
        }
    }

    pub fn get_mut(&mut self, panel: Panel) -> &mut PanelConfig {
        match panel {
            Panel::Top => &mut self.top,
            Panel::Bottom => &mut self.bottom,
        }
    }
}

/// Image shown on one panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Image file; empty means the panel is left untouched
    #[serde(default)]
    pub image: String,

    /// Mirror the image top to bottom
    #[serde(default)]
    pub flip_vertical: bool,

    /// Mirror the image left to right
    #[serde(default)]
    pub flip_horizontal: bool,
}

impl PanelConfig {
    /// Returns the image path, if one is configured.
    pub fn image_path(&self) -> Option<PathBuf> {
        let trimmed = self.image.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }

    pub fn flip(&self) -> Flip {
        Flip::new(self.flip_vertical, self.flip_horizontal)
    }
}

/// Initial ring LED state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingConfig {
    /// Brightness level (0-3)
    #[serde(default = "default_brightness")]
    pub brightness: i32,

    /// Active ring segment (0-3)
    #[serde(default)]
    pub ring: i32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            brightness: default_brightness(),
            ring: 0,
        }
    }
}

impl LightingConfig {
    /// Returns the initial state, clamped into range.
    pub fn initial_state(&self) -> LightingState {
        LightingState::new(self.brightness, self.ring)
    }
}

/// D-Bus bus selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbusBusType {
    Session,
    System,
    /// Try session first, fall back to system
    #[default]
    Auto,
}

/// D-Bus configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbusConfig {
    #[serde(default)]
    pub bus: DbusBusType,
}

// Default value functions
fn default_device_path() -> String {
    "auto".to_string()
}

fn default_brightness() -> i32 {
    2
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.device.path, "auto");
        assert!(config.panels.top.image_path().is_none());
        assert!(config.panels.bottom.image_path().is_none());
        assert_eq!(config.lighting.initial_state(), LightingState::default());
        assert_eq!(config.dbus.bus, DbusBusType::Auto);
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [device]
            path = "/dev/hidraw3"

            [panels.top]
            image = "/home/user/top.png"
            flip_vertical = true

            [panels.bottom]
            image = "  "

            [lighting]
            brightness = 1
            ring = 9

            [dbus]
            bus = "system"
            "#,
        )
        .unwrap();

        assert_eq!(config.device.path, "/dev/hidraw3");
        assert_eq!(
            config.panels.get(Panel::Top).image_path(),
            Some(PathBuf::from("/home/user/top.png"))
        );
        assert_eq!(config.panels.top.flip(), Flip::new(true, false));
        assert!(config.panels.get(Panel::Bottom).image_path().is_none());

        let state = config.lighting.initial_state();
        assert_eq!(state.brightness(), 1);
        assert_eq!(state.active_ring(), 3);
        assert_eq!(config.dbus.bus, DbusBusType::System);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::parse("[dbus]\nbus = \"carrier-pigeon\"").is_err());
    }
}
