//! Feature report transport.

use crate::{Error, Result, SUPPORTED_PIDS, WACOM_VID};
use hidapi::{HidApi, HidDevice};
use tracing::{debug, info};

/// A synchronous, ordered write path to the tablet.
///
/// Each call writes one complete feature report. The first byte of the
/// report is its report ID.
pub trait DeviceChannel: Send {
    fn send_feature(&mut self, report: &[u8]) -> Result<()>;
}

/// Feature report channel over USB HID.
pub struct HidChannel {
    device: HidDevice,
}

impl HidChannel {
    /// Opens the first supported tablet.
    pub fn open() -> Result<Self> {
        let api = HidApi::new()?;

        let devices: Vec<_> = api
            .device_list()
            .filter(|d| d.vendor_id() == WACOM_VID && SUPPORTED_PIDS.contains(&d.product_id()))
            .collect();

        if devices.is_empty() {
            return Err(Error::DeviceNotFound);
        }

        for dev in &devices {
            debug!(
                "Found HID device: path={:?}, pid={:04X}, interface={}",
                dev.path(),
                dev.product_id(),
                dev.interface_number()
            );
        }

        // Feature reports are accepted on the first interface of the tablet.
        let device_info = devices
            .iter()
            .min_by_key(|d| d.interface_number())
            .ok_or(Error::DeviceNotFound)?;

        let device = device_info.open_device(&api).map_err(|e| {
            debug!("Failed to open device: {}", e);
            Error::DeviceNotFound
        })?;

        info!(
            "Tablet opened (VID:{:04X} PID:{:04X}, interface={})",
            WACOM_VID,
            device_info.product_id(),
            device_info.interface_number()
        );

        Ok(Self { device })
    }

    /// Opens a tablet by HID path.
    pub fn open_path(path: &str) -> Result<Self> {
        let api = HidApi::new()?;

        let path = std::ffi::CString::new(path).map_err(|_| Error::DeviceNotFound)?;
        let device = api
            .open_path(path.as_c_str())
            .map_err(|_| Error::DeviceNotFound)?;

        info!("Tablet opened at path: {:?}", path);

        Ok(Self { device })
    }
}

impl DeviceChannel for HidChannel {
    fn send_feature(&mut self, report: &[u8]) -> Result<()> {
        self.device.send_feature_report(report)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hardware tests are skipped by default
    #[test]
    #[ignore]
    fn test_device_open() {
        let channel = HidChannel::open();
        assert!(channel.is_ok());
    }
}
