//! Tablet handle: serializes every feature report written to the device.

use std::path::Path;
use std::sync::Mutex;

use tracing::{debug, info};

use crate::channel::{DeviceChannel, HidChannel};
use crate::lcd::{self, GrayscaleRaster, ReportBatch};
use crate::led::{build_brightness_report, LightingState};
use crate::panel::{Flip, Panel};
use crate::{Error, Result};

/// Exclusive owner of the tablet's control channel.
pub struct Tablet {
    channel: Mutex<Box<dyn DeviceChannel>>,
}

impl Tablet {
    /// Opens the first supported tablet over HID.
    pub fn open() -> Result<Self> {
        Ok(Self::with_channel(HidChannel::open()?))
    }

    /// Opens a tablet by HID path.
    pub fn open_path(path: &str) -> Result<Self> {
        Ok(Self::with_channel(HidChannel::open_path(path)?))
    }

    /// Wraps an already open channel.
    pub fn with_channel<C: DeviceChannel + 'static>(channel: C) -> Self {
        Self {
            channel: Mutex::new(Box::new(channel)),
        }
    }

    /// Sends a panel image in order, holding the channel for the whole batch.
    ///
    /// Stops at the first failed report; the panel is left partially updated.
    pub fn send_batch(&self, panel: Panel, batch: &ReportBatch) -> Result<()> {
        let mut channel = self.channel.lock().unwrap();

        for (sent, frame) in batch.iter().enumerate() {
            channel
                .send_feature(&frame.to_bytes())
                .map_err(|e| Error::BatchAborted {
                    panel,
                    sent,
                    source: Box::new(e),
                })?;
        }

        debug!("{} panel batch sent ({} reports)", panel, batch.len());
        Ok(())
    }

    /// Encodes and sends a decoded raster.
    pub fn upload_raster(&self, panel: Panel, raster: &GrayscaleRaster) -> Result<()> {
        let batch = lcd::encode_raster(raster, panel);
        self.send_batch(panel, &batch)
    }

    /// Decodes, encodes and sends an image.
    pub fn upload_image(&self, panel: Panel, bytes: &[u8], flip: Flip) -> Result<()> {
        let batch = lcd::encode_image(bytes, flip, panel)?;
        self.send_batch(panel, &batch)?;
        info!("{} panel updated", panel);
        Ok(())
    }

    /// Reads an image file and uploads it.
    pub fn upload_file<P: AsRef<Path>>(&self, panel: Panel, path: P, flip: Flip) -> Result<()> {
        let bytes = lcd::load_image_source(path.as_ref())?;
        debug!(
            "Read {} bytes for {} panel from {}",
            bytes.len(),
            panel,
            path.as_ref().display()
        );
        self.upload_image(panel, &bytes, flip)
    }

    /// Sends the brightness report for a lighting state.
    pub fn send_lighting(&self, state: &LightingState) -> Result<()> {
        let report = build_brightness_report(state);

        let mut channel = self.channel.lock().unwrap();
        channel.send_feature(&report)?;

        debug!("Lighting report sent: {:02X?}", report);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every report; optionally fails from a given write onwards.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingChannel {
        pub reports: Arc<Mutex<Vec<Vec<u8>>>>,
        pub fail_from: Option<usize>,
    }

    impl RecordingChannel {
        pub fn failing_from(index: usize) -> Self {
            Self {
                fail_from: Some(index),
                ..Default::default()
            }
        }

        pub fn reports(&self) -> Vec<Vec<u8>> {
            self.reports.lock().unwrap().clone()
        }
    }

    impl DeviceChannel for RecordingChannel {
        fn send_feature(&mut self, report: &[u8]) -> Result<()> {
            let mut reports = self.reports.lock().unwrap();
            if let Some(limit) = self.fail_from {
                if reports.len() >= limit {
                    return Err(Error::DeviceNotFound);
                }
            }
            reports.push(report.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_upload_raster_sends_ordered_batch() {
        let channel = RecordingChannel::default();
        let tablet = Tablet::with_channel(channel.clone());
        let raster = GrayscaleRaster::filled(64, 128, 0x40).unwrap();

        tablet.upload_raster(Panel::Bottom, &raster).unwrap();

        let reports = channel.reports();
        assert_eq!(reports.len(), 16);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.len(), 259);
            assert_eq!(report[0], 0x23);
            assert_eq!(report[1], 4 + (i / 4) as u8);
            assert_eq!(report[2], (i % 4) as u8);
        }
    }

    #[test]
    fn test_send_batch_aborts_on_failure() {
        let channel = RecordingChannel::failing_from(5);
        let tablet = Tablet::with_channel(channel.clone());
        let raster = GrayscaleRaster::filled(8, 8, 0xFF).unwrap();

        let err = tablet.upload_raster(Panel::Top, &raster).unwrap_err();
        assert!(matches!(
            err,
            Error::BatchAborted {
                panel: Panel::Top,
                sent: 5,
                ..
            }
        ));
        assert_eq!(channel.reports().len(), 5);
    }

    #[test]
    fn test_upload_image_decode_failure_sends_nothing() {
        let channel = RecordingChannel::default();
        let tablet = Tablet::with_channel(channel.clone());

        let err = tablet
            .upload_image(Panel::Top, b"not an image", Flip::NONE)
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(channel.reports().is_empty());
    }

    #[test]
    fn test_upload_missing_file() {
        let channel = RecordingChannel::default();
        let tablet = Tablet::with_channel(channel.clone());

        let err = tablet
            .upload_file(Panel::Bottom, "/nonexistent/bottom.png", Flip::NONE)
            .unwrap_err();
        assert!(matches!(err, Error::ImageSource { .. }));
        assert!(channel.reports().is_empty());
    }

    #[test]
    fn test_concurrent_batches_do_not_interleave() {
        let channel = RecordingChannel::default();
        let tablet = Arc::new(Tablet::with_channel(channel.clone()));
        let raster = GrayscaleRaster::filled(64, 128, 0x10).unwrap();

        let handles: Vec<_> = Panel::ALL
            .into_iter()
            .map(|panel| {
                let tablet = tablet.clone();
                let raster = raster.clone();
                std::thread::spawn(move || tablet.upload_raster(panel, &raster))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let reports = channel.reports();
        assert_eq!(reports.len(), 32);
        for batch in reports.chunks(16) {
            let base = batch[0][1];
            for (i, report) in batch.iter().enumerate() {
                assert_eq!(report[1], base + (i / 4) as u8);
                assert_eq!(report[2], (i % 4) as u8);
            }
        }
    }

    #[test]
    fn test_send_lighting() {
        let channel = RecordingChannel::default();
        let tablet = Tablet::with_channel(channel.clone());

        tablet.send_lighting(&LightingState::default()).unwrap();

        assert_eq!(
            channel.reports(),
            vec![vec![0x20, 0x04, 0x0A, 0x28, 0x1A, 0, 0, 0, 0]]
        );
    }
}
