//! Panel image report encoding.
//!
//! Report structure:
//! - Report size: 259 bytes (1 report ID + 2 address bytes + 256 data bytes)
//! - Report ID: 0x23
//! - Address: chunk index (panel quadrant), block index (0-3 within the quadrant)
//! - Data: two 4-bit densities per byte, high nibble first

use super::framebuffer::{Framebuffer, FRAMEBUFFER_SIZE};

/// Image report ID.
pub const IMAGE_REPORT_ID: u8 = 0x23;

/// Header size including the report ID.
pub const HEADER_SIZE: usize = 3;

/// Data payload size per report.
pub const DATA_SIZE: usize = 256;

/// Total report size.
pub const REPORT_SIZE: usize = HEADER_SIZE + DATA_SIZE;

/// Packed panel image size (two densities per byte).
pub const PAYLOAD_SIZE: usize = FRAMEBUFFER_SIZE / 2;

/// Reports per panel image.
pub const FRAME_COUNT: usize = PAYLOAD_SIZE / DATA_SIZE;

/// Blocks per chunk index.
pub const BLOCKS_PER_CHUNK: usize = 4;

/// One addressed image report.
#[derive(Clone, PartialEq, Eq)]
pub struct ReportFrame {
    chunk_index: u8,
    block_index: u8,
    payload: [u8; DATA_SIZE],
}

impl ReportFrame {
    pub fn chunk_index(&self) -> u8 {
        self.chunk_index
    }

    pub fn block_index(&self) -> u8 {
        self.block_index
    }

    pub fn payload(&self) -> &[u8; DATA_SIZE] {
        &self.payload
    }

    /// Serializes the frame into the bytes written as a feature report.
    pub fn to_bytes(&self) -> [u8; REPORT_SIZE] {
        let mut buffer = [0u8; REPORT_SIZE];
        buffer[0] = IMAGE_REPORT_ID;
        buffer[1] = self.chunk_index;
        buffer[2] = self.block_index;
        buffer[HEADER_SIZE..].copy_from_slice(&self.payload);
        buffer
    }
}

impl std::fmt::Debug for ReportFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportFrame")
            .field("chunk_index", &self.chunk_index)
            .field("block_index", &self.block_index)
            .finish_non_exhaustive()
    }
}

/// The ordered reports that make up one panel image.
///
/// Always holds exactly [`FRAME_COUNT`] frames in transmission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportBatch {
    frames: Vec<ReportFrame>,
}

impl ReportBatch {
    pub fn frames(&self) -> &[ReportFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReportFrame> {
        self.frames.iter()
    }

    /// Concatenates every frame's wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.frames.iter().flat_map(|f| f.to_bytes()).collect()
    }
}

impl<'a> IntoIterator for &'a ReportBatch {
    type Item = &'a ReportFrame;
    type IntoIter = std::slice::Iter<'a, ReportFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Packs framebuffer nibble pairs into wire bytes, first nibble high.
pub fn pack_payload(framebuffer: &Framebuffer) -> [u8; PAYLOAD_SIZE] {
    let mut payload = [0u8; PAYLOAD_SIZE];
    for (out, pair) in payload
        .iter_mut()
        .zip(framebuffer.data().chunks_exact(2))
    {
        *out = ((pair[0] << 4) & 0xF0) | pair[1];
    }
    payload
}

/// Slices a framebuffer into addressed reports for the panel starting at `chunk_base`.
pub fn chunk(framebuffer: &Framebuffer, chunk_base: u8) -> ReportBatch {
    let payload = pack_payload(framebuffer);

    let frames = payload
        .chunks_exact(DATA_SIZE)
        .enumerate()
        .map(|(segment, data)| {
            let mut block = [0u8; DATA_SIZE];
            block.copy_from_slice(data);
            ReportFrame {
                chunk_index: chunk_base + (segment / BLOCKS_PER_CHUNK) as u8,
                block_index: (segment % BLOCKS_PER_CHUNK) as u8,
                payload: block,
            }
        })
        .collect();

    ReportBatch { frames }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(REPORT_SIZE, 259);
        assert_eq!(PAYLOAD_SIZE, 4096);
        assert_eq!(FRAME_COUNT, 16);
    }

    #[test]
    fn test_pack_payload_concatenates_nibbles() {
        let mut data = vec![0u8; FRAMEBUFFER_SIZE];
        data[0] = 0x0A;
        data[1] = 0x05;
        data[2] = 0x1F; // stray high bits are masked on the leading nibble
        data[3] = 0x00;
        let fb = Framebuffer::from_bytes(&data).unwrap();
        let payload = pack_payload(&fb);
        assert_eq!(payload[0], 0xA5);
        assert_eq!(payload[1], 0xF0);
        assert!(payload[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_chunk_frame_shape() {
        let batch = chunk(&Framebuffer::new(), 0);
        assert_eq!(batch.len(), FRAME_COUNT);
        for frame in &batch {
            let bytes = frame.to_bytes();
            assert_eq!(bytes.len(), 259);
            assert_eq!(bytes[0], IMAGE_REPORT_ID);
        }
        assert_eq!(batch.to_bytes().len(), 16 * 259);
    }

    #[test]
    fn test_chunk_addressing_top() {
        let batch = chunk(&Framebuffer::new(), 0);
        let addresses: Vec<(u8, u8)> = batch
            .iter()
            .map(|f| (f.chunk_index(), f.block_index()))
            .collect();
        let expected: Vec<(u8, u8)> = (0..4u8)
            .flat_map(|c| (0..4u8).map(move |b| (c, b)))
            .collect();
        assert_eq!(addresses, expected);
    }

    #[test]
    fn test_chunk_addressing_bottom() {
        let batch = chunk(&Framebuffer::new(), 4);
        let first = &batch.frames()[0];
        let last = &batch.frames()[15];
        assert_eq!((first.chunk_index(), first.block_index()), (4, 0));
        assert_eq!((last.chunk_index(), last.block_index()), (7, 3));
        assert_eq!(&last.to_bytes()[..3], &[0x23, 7, 3]);
    }

    #[test]
    fn test_chunk_payload_order() {
        let mut data = vec![0u8; FRAMEBUFFER_SIZE];
        // First byte pair of the sixth segment.
        data[5 * DATA_SIZE * 2] = 0x03;
        data[5 * DATA_SIZE * 2 + 1] = 0x0C;
        let batch = chunk(&Framebuffer::from_bytes(&data).unwrap(), 0);
        let frame = &batch.frames()[5];
        assert_eq!((frame.chunk_index(), frame.block_index()), (1, 1));
        assert_eq!(frame.payload()[0], 0x3C);
        assert_eq!(frame.to_bytes()[HEADER_SIZE], 0x3C);
    }
}
