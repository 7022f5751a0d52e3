//! Panel addressing and image flip options.
//!
//! The tablet carries two OLED panels. Each one is addressed by the chunk
//! index of its first quadrant; the firmware expects four consecutive chunk
//! indices per panel.

use crate::{Error, Result};
use std::str::FromStr;

/// One of the two OLED panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    /// Upper panel, chunk indices 0-3.
    Top,
    /// Lower panel, chunk indices 4-7.
    Bottom,
}

impl Panel {
    /// Both panels in upload order.
    pub const ALL: [Panel; 2] = [Panel::Top, Panel::Bottom];

    /// Returns the chunk index of the panel's first quadrant.
    pub fn chunk_base(&self) -> u8 {
        match self {
            Panel::Top => 0,
            Panel::Bottom => 4,
        }
    }
}

impl FromStr for Panel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "top" => Ok(Panel::Top),
            "bottom" => Ok(Panel::Bottom),
            _ => Err(Error::InvalidPanel(s.to_string())),
        }
    }
}

impl std::fmt::Display for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Panel::Top => write!(f, "top"),
            Panel::Bottom => write!(f, "bottom"),
        }
    }
}

/// Geometric flips applied to a raster after grayscale reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flip {
    /// Mirror top to bottom.
    pub vertical: bool,
    /// Mirror left to right.
    pub horizontal: bool,
}

impl Flip {
    /// No flip.
    pub const NONE: Flip = Flip {
        vertical: false,
        horizontal: false,
    };

    pub fn new(vertical: bool, horizontal: bool) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }
}

impl std::fmt::Display for Flip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.vertical, self.horizontal) {
            (false, false) => write!(f, "none"),
            (true, false) => write!(f, "vertical"),
            (false, true) => write!(f, "horizontal"),
            (true, true) => write!(f, "vertical+horizontal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_base() {
        assert_eq!(Panel::Top.chunk_base(), 0);
        assert_eq!(Panel::Bottom.chunk_base(), 4);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("top".parse::<Panel>().unwrap(), Panel::Top);
        assert_eq!("Bottom".parse::<Panel>().unwrap(), Panel::Bottom);
        assert!("middle".parse::<Panel>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for panel in Panel::ALL {
            assert_eq!(panel.to_string().parse::<Panel>().unwrap(), panel);
        }
    }

    #[test]
    fn test_flip_display() {
        assert_eq!(Flip::NONE.to_string(), "none");
        assert_eq!(Flip::new(true, true).to_string(), "vertical+horizontal");
    }
}
