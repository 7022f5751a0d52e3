//! On-device framebuffer layout.
//!
//! The panel controller multiplexes two scan lines per addressed row: even
//! image rows land on the odd byte lanes of a 128-byte block and odd image
//! rows on the even lanes of the same block. Each byte of the framebuffer
//! holds a single 4-bit density.

use super::density::DensityStream;
use crate::{Error, Result, PANEL_HEIGHT, PANEL_WIDTH};

/// Framebuffer size in bytes, one density nibble per byte.
pub const FRAMEBUFFER_SIZE: usize = PANEL_WIDTH * (32 * 4);

/// Maximum number of density bytes a framebuffer can take.
const DENSITY_CAPACITY: usize = PANEL_WIDTH * PANEL_HEIGHT / 2;

/// Interleaved nibble framebuffer for one panel.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    data: Vec<u8>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.data.iter().filter(|&&v| v != 0).count();
        f.debug_struct("Framebuffer")
            .field("len", &self.data.len())
            .field("lit", &lit)
            .finish()
    }
}

impl Framebuffer {
    /// Creates a blank framebuffer.
    pub fn new() -> Self {
        Self {
            data: vec![0; FRAMEBUFFER_SIZE],
        }
    }

    /// Copies a framebuffer from raw nibble bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != FRAMEBUFFER_SIZE {
            return Err(Error::FramebufferSize {
                expected: FRAMEBUFFER_SIZE,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: data.to_vec(),
        })
    }

    /// Distributes a density stream over the interleaved row layout.
    ///
    /// Densities beyond one full panel are ignored; anything the stream does
    /// not cover stays blank.
    pub fn layout(density: &DensityStream) -> Self {
        let mut data = vec![0u8; FRAMEBUFFER_SIZE];

        let mut counter: usize = 1;
        let mut x: usize = 0;
        let mut first_line = true;

        for &value in density.values().iter().take(DENSITY_CAPACITY) {
            data[counter] = value >> 4;
            data[counter + 2] = value & 0x0F;
            counter += 4;
            x += 2;

            if x == PANEL_WIDTH {
                x = 0;
                if first_line {
                    first_line = false;
                    counter -= PANEL_WIDTH * 2 + 1;
                } else {
                    first_line = true;
                    counter += 1;
                }
            }
        }

        Self { data }
    }

    /// Returns the raw nibble bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
