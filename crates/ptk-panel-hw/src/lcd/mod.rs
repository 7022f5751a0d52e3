//! OLED panel module.
//!
//! Turns an encoded image into the 16 feature reports that redraw one
//! 64x128 4-bit panel: decode, pack densities, interleave rows, chunk.

mod density;
mod raster;

pub mod framebuffer;
pub mod protocol;

pub use density::{pack, DensityStream};
pub use framebuffer::{Framebuffer, FRAMEBUFFER_SIZE};
pub use protocol::{chunk, pack_payload, ReportBatch, ReportFrame};
pub use raster::{load_image_source, rasterize, GrayscaleRaster};

use crate::panel::{Flip, Panel};
use crate::DecodeError;

/// Lays out and chunks an already decoded raster.
pub fn encode_raster(raster: &GrayscaleRaster, panel: Panel) -> ReportBatch {
    let density = pack(raster);
    let framebuffer = Framebuffer::layout(&density);
    chunk(&framebuffer, panel.chunk_base())
}

/// Runs the full image pipeline for one panel.
pub fn encode_image(
    bytes: &[u8],
    flip: Flip,
    panel: Panel,
) -> std::result::Result<ReportBatch, DecodeError> {
    let raster = rasterize(bytes, flip)?;
    Ok(encode_raster(&raster, panel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};

    #[test]
    fn test_mid_gray_end_to_end() {
        let raster = GrayscaleRaster::filled(64, 32, 0x80).unwrap();
        let batch = encode_raster(&raster, Panel::Top);

        assert_eq!(batch.len(), 16);
        assert_eq!(&batch.frames()[0].to_bytes()[..3], &[0x23, 0, 0]);

        // 32 rows fill the first 2048 framebuffer bytes, i.e. the first 4 reports.
        for frame in &batch.frames()[..4] {
            assert!(frame.payload().iter().all(|&b| b == 0x88));
        }
        for frame in &batch.frames()[4..] {
            assert!(frame.payload().iter().all(|&b| b == 0x00));
        }
    }

    #[test]
    fn test_encode_image_from_png() {
        let image = GrayImage::from_pixel(64, 128, Luma([0xF0]));
        let bytes = super::raster::tests::encode_png(DynamicImage::ImageLuma8(image));
        let batch = encode_image(&bytes, Flip::NONE, Panel::Bottom).unwrap();
        assert_eq!(batch.frames()[0].chunk_index(), 4);
        assert!(batch
            .iter()
            .all(|f| f.payload().iter().all(|&b| b == 0xFF)));
    }

    #[test]
    fn test_gradient_is_deterministic() {
        let image = GrayImage::from_fn(64, 128, |x, y| Luma([((x + y) * 2) as u8]));
        let bytes = super::raster::tests::encode_png(DynamicImage::ImageLuma8(image));
        let first = encode_image(&bytes, Flip::NONE, Panel::Top).unwrap();
        let second = encode_image(&bytes, Flip::NONE, Panel::Top).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_encode_image_rejects_bad_input() {
        assert!(encode_image(&[0u8; 16], Flip::NONE, Panel::Top).is_err());
    }
}
