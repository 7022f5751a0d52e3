//! PTK Panel Hardware Library
//!
//! Encodes images for the two monochrome OLED panels and lighting state for
//! the ring LEDs of Wacom PTK tablets, and writes the resulting feature
//! reports to the device over USB HID.

pub mod channel;
pub mod device;
pub mod error;
pub mod lcd;
pub mod led;
pub mod panel;

pub use channel::{DeviceChannel, HidChannel};
pub use device::Tablet;
pub use error::{DecodeError, Error, Result};
pub use lcd::{Framebuffer, GrayscaleRaster, ReportBatch, ReportFrame};
pub use led::{LightingController, LightingState};
pub use panel::{Flip, Panel};

/// Panel dimensions in pixels.
pub const PANEL_WIDTH: usize = 64;
pub const PANEL_HEIGHT: usize = 128;

/// USB vendor ID (Wacom).
pub const WACOM_VID: u16 = 0x056A;

/// USB product IDs of the supported tablets (PTK-440, PTK-540WL, PTK-640, PTK-840, PTK-1240).
pub const SUPPORTED_PIDS: std::ops::RangeInclusive<u16> = 0x00B8..=0x00BC;
