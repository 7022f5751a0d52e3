//! Lighting state ownership and change notification.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use super::protocol::LightingState;
use crate::device::Tablet;

/// Owns the lighting state and pushes every change to the tablet.
///
/// The state lock is released before the report is written, so a slow or
/// failing device never blocks readers. Callers that need mutation order to
/// match transmission order must funnel changes through a single task.
pub struct LightingController {
    state: Mutex<LightingState>,
    tablet: Option<Arc<Tablet>>,
}

impl LightingController {
    /// Creates a controller. Without a tablet, state changes are kept but not sent.
    pub fn new(initial: LightingState, tablet: Option<Arc<Tablet>>) -> Self {
        Self {
            state: Mutex::new(initial),
            tablet,
        }
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> LightingState {
        *self.state.lock().unwrap()
    }

    pub fn brightness(&self) -> u8 {
        self.state().brightness()
    }

    pub fn active_ring(&self) -> u8 {
        self.state().active_ring()
    }

    /// Selects the active ring segment (clamped to 0-3) and returns the stored value.
    pub fn set_ring_led(&self, value: i32) -> u8 {
        let (changed, snapshot) = {
            let mut state = self.state.lock().unwrap();
            let changed = state.set_active_ring(value);
            (changed, *state)
        };

        if changed {
            info!("Active ring set to {}", snapshot.active_ring());
            self.transmit(&snapshot);
        }
        snapshot.active_ring()
    }

    /// Sets the brightness level (clamped to 0-3) and returns the stored value.
    pub fn set_brightness(&self, value: i32) -> u8 {
        let (changed, snapshot) = {
            let mut state = self.state.lock().unwrap();
            let changed = state.set_brightness(value);
            (changed, *state)
        };

        if changed {
            info!("Brightness set to {}", snapshot.brightness());
            self.transmit(&snapshot);
        }
        snapshot.brightness()
    }

    /// Sends the current state regardless of whether it changed.
    pub fn apply(&self) {
        let snapshot = self.state();
        self.transmit(&snapshot);
    }

    fn transmit(&self, state: &LightingState) {
        if let Some(ref tablet) = self.tablet {
            if let Err(e) = tablet.send_lighting(state) {
                warn!(
                    "Lighting update (brightness {}, ring {}) not sent: {}",
                    state.brightness(),
                    state.active_ring(),
                    e
                );
            }
        }
    }
}
