//! Error types for the PTK Panel hardware library.

use std::path::PathBuf;

use thiserror::Error;

use crate::panel::Panel;
use crate::{PANEL_HEIGHT, PANEL_WIDTH};

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an image cannot be turned into a panel raster.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The bytes are not an image format we can decode.
    #[error("image could not be decoded: {0}")]
    Unreadable(String),

    /// Decoded image does not fit the panel.
    #[error(
        "invalid image dimensions {width}x{height}, must be non-zero and at most {}x{}",
        PANEL_WIDTH,
        PANEL_HEIGHT
    )]
    OutOfBounds { width: u32, height: u32 },
}

/// Errors that can occur when interacting with the hardware.
#[derive(Error, Debug)]
pub enum Error {
    /// No supported tablet found or it could not be opened.
    #[error(
        "no supported tablet found (VID:056A PID:00B8-00BC); supported models are \
         PTK-440, PTK-540WL, PTK-640, PTK-840 and PTK-1240"
    )]
    DeviceNotFound,

    /// USB HID communication error.
    #[error("USB HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// Image could not be rasterized.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Image source file missing or unreadable.
    #[error("cannot read image {}: {source}", path.display())]
    ImageSource {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Unknown panel name.
    #[error("invalid panel: {0}")]
    InvalidPanel(String),

    /// Framebuffer size mismatch.
    #[error("framebuffer size mismatch: expected {expected}, got {actual}")]
    FramebufferSize { expected: usize, actual: usize },

    /// A frame of an image upload failed; the panel is only partially updated.
    #[error("{panel} panel upload aborted after {sent} frames: {source}")]
    BatchAborted {
        panel: Panel,
        sent: usize,
        source: Box<Error>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_not_found_names_models() {
        let message = Error::DeviceNotFound.to_string();
        for model in ["PTK-440", "PTK-540WL", "PTK-640", "PTK-840", "PTK-1240"] {
            assert!(message.contains(model), "{} missing from {}", model, message);
        }
    }

    #[test]
    fn test_batch_aborted_message() {
        let err = Error::BatchAborted {
            panel: Panel::Bottom,
            sent: 5,
            source: Box::new(Error::DeviceNotFound),
        };
        assert!(err.to_string().starts_with("bottom panel upload aborted after 5 frames"));
    }
}
