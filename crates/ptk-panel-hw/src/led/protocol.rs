//! Lighting report encoding.
//!
//! Report structure (9 bytes):
//! - Report ID: 0x20
//! - Ring selector: 4 + active ring segment
//! - Three brightness bytes from a fixed table
//! - Four zero bytes

/// Lighting report ID.
pub const BRIGHTNESS_REPORT_ID: u8 = 0x20;

/// Total report size.
pub const BRIGHTNESS_REPORT_SIZE: usize = 9;

/// Highest brightness level.
pub const MAX_BRIGHTNESS: u8 = 3;

/// Highest ring segment index.
pub const MAX_RING: u8 = 3;

const RING_SELECTOR_BASE: u8 = 4;

/// Brightness and active ring segment of the tablet's ring LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingState {
    brightness: u8,
    active_ring: u8,
}

impl Default for LightingState {
    fn default() -> Self {
        Self {
            brightness: 2,
            active_ring: 0,
        }
    }
}

impl LightingState {
    /// Creates a state, clamping both values into range.
    pub fn new(brightness: i32, active_ring: i32) -> Self {
        Self {
            brightness: clamp_level(brightness, MAX_BRIGHTNESS),
            active_ring: clamp_level(active_ring, MAX_RING),
        }
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn active_ring(&self) -> u8 {
        self.active_ring
    }

    /// Sets the active ring, clamped to 0-3. Returns true if it changed.
    pub fn set_active_ring(&mut self, value: i32) -> bool {
        let ring = clamp_level(value, MAX_RING);
        let changed = ring != self.active_ring;
        self.active_ring = ring;
        changed
    }

    /// Sets the brightness, clamped to 0-3. Returns true if it changed.
    pub fn set_brightness(&mut self, value: i32) -> bool {
        let brightness = clamp_level(value, MAX_BRIGHTNESS);
        let changed = brightness != self.brightness;
        self.brightness = brightness;
        changed
    }
}

fn clamp_level(value: i32, max: u8) -> u8 {
    value.clamp(0, max as i32) as u8
}

/// Returns the three brightness bytes for a level. Levels above 3 use the brightest entry.
pub fn brightness_levels(level: u8) -> [u8; 3] {
    match level {
        0 => [0x0A, 0x0A, 0x00],
        1 => [0x0A, 0x28, 0x15],
        2 => [0x0A, 0x28, 0x1A],
        _ => [0x20, 0x7F, 0x1F],
    }
}

/// Builds the lighting report for a state.
pub fn build_brightness_report(state: &LightingState) -> [u8; BRIGHTNESS_REPORT_SIZE] {
    let levels = brightness_levels(state.brightness);

    let mut buffer = [0u8; BRIGHTNESS_REPORT_SIZE];
    buffer[0] = BRIGHTNESS_REPORT_ID;
    buffer[1] = RING_SELECTOR_BASE + state.active_ring;
    buffer[2..5].copy_from_slice(&levels);
    buffer
}
