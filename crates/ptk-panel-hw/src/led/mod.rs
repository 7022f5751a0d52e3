//! Ring LED module.
//!
//! Provides brightness and active ring segment control via a single
//! 9-byte feature report.

mod controller;
mod protocol;

pub use controller::LightingController;
pub use protocol::{
    brightness_levels, build_brightness_report, LightingState, BRIGHTNESS_REPORT_ID,
    BRIGHTNESS_REPORT_SIZE, MAX_BRIGHTNESS, MAX_RING,
};
