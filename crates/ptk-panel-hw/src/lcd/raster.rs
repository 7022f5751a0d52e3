//! Image decoding and grayscale reduction.

use std::path::Path;

use image::{imageops, DynamicImage, GrayImage};
use tracing::debug;

use crate::panel::Flip;
use crate::{DecodeError, Error, Result, PANEL_HEIGHT, PANEL_WIDTH};

/// 8-bit grayscale raster, row-major, origin top-left.
///
/// Dimensions are always within `1..=64` x `1..=128`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleRaster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl GrayscaleRaster {
    /// Wraps raw luminance bytes, checking the panel bounds.
    pub fn from_luma(
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> std::result::Result<Self, DecodeError> {
        check_bounds(width, height)?;
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(DecodeError::Unreadable(format!(
                "luma plane holds {} bytes, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a raster filled with one luminance value.
    pub fn filled(width: u32, height: u32, value: u8) -> std::result::Result<Self, DecodeError> {
        Self::from_luma(width, height, vec![value; width as usize * height as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the luminance plane.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Gets a pixel at the given coordinates.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.data[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }
}

fn check_bounds(width: u32, height: u32) -> std::result::Result<(), DecodeError> {
    if width == 0 || height == 0 || width as usize > PANEL_WIDTH || height as usize > PANEL_HEIGHT
    {
        return Err(DecodeError::OutOfBounds { width, height });
    }
    Ok(())
}

/// Decodes an encoded image and reduces it to a panel raster.
///
/// Pixels are desaturated to luma and composited onto black, so transparent
/// regions come out dark. Flips are applied after the reduction.
pub fn rasterize(bytes: &[u8], flip: Flip) -> std::result::Result<GrayscaleRaster, DecodeError> {
    let image =
        image::load_from_memory(bytes).map_err(|e| DecodeError::Unreadable(e.to_string()))?;
    check_bounds(image.width(), image.height())?;

    let mut gray = to_grayscale(&image);
    if flip.vertical {
        imageops::flip_vertical_in_place(&mut gray);
    }
    if flip.horizontal {
        imageops::flip_horizontal_in_place(&mut gray);
    }

    debug!(
        "Rasterized {}x{} image (flip: {})",
        gray.width(),
        gray.height(),
        flip
    );

    let (width, height) = gray.dimensions();
    GrayscaleRaster::from_luma(width, height, gray.into_raw())
}

fn to_grayscale(image: &DynamicImage) -> GrayImage {
    if !image.color().has_alpha() {
        return image.to_luma8();
    }

    let luma_alpha = image.to_luma_alpha8();
    let (width, height) = luma_alpha.dimensions();
    let data = luma_alpha
        .pixels()
        .map(|p| ((p[0] as u16 * p[1] as u16 + 127) / 255) as u8)
        .collect();
    // Length matches by construction.
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Reads an image source file fully into memory.
pub fn load_image_source<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| Error::ImageSource {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Luma, LumaA, Rgb};
    use std::io::Cursor;

    pub(crate) fn encode_png(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn gradient(width: u32, height: u32) -> Vec<u8> {
        let image = GrayImage::from_fn(width, height, |x, y| Luma([(x * 4 + y) as u8]));
        encode_png(DynamicImage::ImageLuma8(image))
    }

    #[test]
    fn test_rasterize_grayscale_png() {
        let raster = rasterize(&gradient(64, 32), Flip::NONE).unwrap();
        assert_eq!(raster.width(), 64);
        assert_eq!(raster.height(), 32);
        assert_eq!(raster.data().len(), 64 * 32);
        assert_eq!(raster.get_pixel(3, 2), Some(14));
        assert_eq!(raster.get_pixel(64, 0), None);
    }

    #[test]
    fn test_rasterize_desaturates_rgb() {
        let image = image::RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        let raster = rasterize(&encode_png(DynamicImage::ImageRgb8(image)), Flip::NONE).unwrap();
        assert!(raster.data().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_rasterize_composites_alpha_onto_black() {
        let image = image::GrayAlphaImage::from_pixel(2, 2, LumaA([200, 0]));
        let raster =
            rasterize(&encode_png(DynamicImage::ImageLumaA8(image)), Flip::NONE).unwrap();
        assert!(raster.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_rasterize_flips() {
        let bytes = gradient(8, 4);

        let vertical = rasterize(&bytes, Flip::new(true, false)).unwrap();
        assert_eq!(vertical.get_pixel(0, 0), Some(3));
        assert_eq!(vertical.get_pixel(0, 3), Some(0));

        let horizontal = rasterize(&bytes, Flip::new(false, true)).unwrap();
        assert_eq!(horizontal.get_pixel(0, 0), Some(28));
        assert_eq!(horizontal.get_pixel(7, 0), Some(0));
    }

    #[test]
    fn test_rasterize_rejects_garbage() {
        let err = rasterize(b"definitely not an image", Flip::NONE).unwrap_err();
        assert!(matches!(err, DecodeError::Unreadable(_)));
    }

    #[test]
    fn test_rasterize_rejects_oversized() {
        let err = rasterize(&gradient(65, 10), Flip::NONE).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::OutOfBounds {
                width: 65,
                height: 10
            }
        ));

        let err = rasterize(&gradient(64, 129), Flip::NONE).unwrap_err();
        assert!(matches!(err, DecodeError::OutOfBounds { .. }));
    }

    #[test]
    fn test_from_luma_checks_length() {
        assert!(GrayscaleRaster::from_luma(4, 4, vec![0; 15]).is_err());
        assert!(GrayscaleRaster::from_luma(0, 4, Vec::new()).is_err());
        assert!(GrayscaleRaster::filled(64, 128, 0x80).is_ok());
    }

    #[test]
    fn test_load_missing_source() {
        let err = load_image_source("/nonexistent/ptk-panel/top.png").unwrap_err();
        assert!(matches!(err, Error::ImageSource { .. }));
    }
}
