//! Reduction of an 8-bit raster to 4-bit panel densities.

use super::raster::GrayscaleRaster;

/// Packed density values in device pixel order.
///
/// Each byte carries two 4-bit densities: the high nibble comes from the
/// first source pixel of a pair, the low nibble from the second.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DensityStream {
    values: Vec<u8>,
}

impl DensityStream {
    pub fn from_values(values: Vec<u8>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Packs a raster into a density stream.
///
/// The panel scans from the bottom-right corner, so every row is mirrored
/// and then the whole plane reversed before pairing pixels. Only the upper
/// nibble of each pixel survives. A trailing odd pixel is dropped.
pub fn pack(raster: &GrayscaleRaster) -> DensityStream {
    let mut plane = raster.data().to_vec();

    for row in plane.chunks_mut(raster.width() as usize) {
        row.reverse();
    }
    plane.reverse();

    let values = plane
        .chunks_exact(2)
        .map(|pair| ((pair[1] >> 4) & 0x0F) | (pair[0] & 0xF0))
        .collect();

    DensityStream { values }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_mid_gray() {
        let raster = GrayscaleRaster::filled(64, 32, 0x80).unwrap();
        let density = pack(&raster);
        assert_eq!(density.len(), 64 * 32 / 2);
        assert!(density.values().iter().all(|&b| b == 0x88));
    }

    #[test]
    fn test_pack_keeps_high_nibbles() {
        let raster = GrayscaleRaster::from_luma(2, 1, vec![0x3C, 0xA5]).unwrap();
        // Row mirror then plane reversal leaves a single row in source order.
        assert_eq!(pack(&raster).values(), &[0x3A]);
    }

    #[test]
    fn test_pack_reverses_row_order() {
        // Rows: [0x10, 0x20] on top, [0x30, 0x40] below.
        let raster = GrayscaleRaster::from_luma(2, 2, vec![0x10, 0x20, 0x30, 0x40]).unwrap();
        assert_eq!(pack(&raster).values(), &[0x34, 0x12]);
    }

    #[test]
    fn test_pack_drops_trailing_pixel() {
        let raster = GrayscaleRaster::from_luma(3, 1, vec![0xF0, 0x10, 0x20]).unwrap();
        assert_eq!(pack(&raster).values(), &[0xF1]);
    }

    #[test]
    fn test_pack_is_deterministic() {
        let data = (0..64u32 * 128).map(|i| ((i % 128) * 2) as u8).collect();
        let raster = GrayscaleRaster::from_luma(64, 128, data).unwrap();
        let first = pack(&raster);
        let second = pack(&raster);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4096);
    }
}
