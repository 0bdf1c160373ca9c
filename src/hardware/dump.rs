//! Dry-run backends.
//!
//! Used when dump mode is enabled and as test doubles. Nothing here touches a
//! real descriptor or USB handle: every operation is logged and written
//! payloads are kept in a [`Journal`] that tests can inspect.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use super::{
    hex_dump,
    serial::{PortSpec, SerialConfig, SerialLink},
    usb::{ControlRequest, UsbBackend},
};
use crate::error::{Error, Result};

/// Fixed payload returned by every dry-run read.
pub const DUMP_READ_PAYLOAD: &[u8] = b"DUMP";

/// Shared record of the payloads written through a dry-run backend.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Journal {
    fn record(&self, bytes: &[u8]) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(bytes.to_vec());
        }
    }

    /// Every payload written so far, oldest first.
    pub fn entries(&self) -> Vec<Vec<u8>> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Most recent write.
    pub fn last(&self) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.last().cloned())
    }

    /// Number of recorded writes.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn canned(max_length: usize) -> Vec<u8> {
    DUMP_READ_PAYLOAD[..max_length.min(DUMP_READ_PAYLOAD.len())].to_vec()
}

/// Serial link that only logs.
#[derive(Debug, Default)]
pub struct DumpLink {
    open: Option<PathBuf>,
    journal: Journal,
}

impl DumpLink {
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl SerialLink for DumpLink {
    fn resolve(&self, spec: &PortSpec) -> Result<PathBuf> {
        Ok(match spec {
            PortSpec::Path(path) => path.clone(),
            other => PathBuf::from(format!("dump:{other}")),
        })
    }

    fn open(&mut self, path: &Path, config: &SerialConfig) -> Result<()> {
        log::info!(
            "[dump] simulated serial open of {} at {} baud",
            path.display(),
            config.baud_rate
        );
        self.open = Some(path.to_path_buf());
        Ok(())
    }

    fn close(&mut self) {
        if let Some(path) = self.open.take() {
            log::info!("[dump] simulated serial close of {}", path.display());
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let Some(path) = &self.open else {
            return Err(Error::NotConnected);
        };
        log::debug!("[dump] {} <- [{}]", path.display(), hex_dump(bytes));
        self.journal.record(bytes);
        Ok(())
    }

    fn read(&mut self, max_length: usize) -> Result<Vec<u8>> {
        if self.open.is_none() {
            return Err(Error::NotConnected);
        }
        Ok(canned(max_length))
    }
}

/// USB backend that only logs.
#[derive(Debug, Default)]
pub struct DumpUsbBackend {
    device: Option<(u16, u16)>,
    claimed: Option<u8>,
    journal: Journal,
}

impl DumpUsbBackend {
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl UsbBackend for DumpUsbBackend {
    fn open(&mut self, vendor_id: u16, product_id: u16, _timeout: Duration) -> Result<()> {
        log::info!("[dump] simulated USB open of {vendor_id:04x}:{product_id:04x}");
        self.device = Some((vendor_id, product_id));
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn claim_interface(&mut self, interface: u8) -> Result<()> {
        if self.device.is_none() {
            return Err(Error::NotConnected);
        }
        log::debug!("[dump] claimed interface {interface}");
        self.claimed = Some(interface);
        Ok(())
    }

    fn release_interface(&mut self, interface: u8) -> Result<()> {
        log::debug!("[dump] released interface {interface}");
        self.claimed = None;
        Ok(())
    }

    fn close(&mut self) {
        if let Some((vendor_id, product_id)) = self.device.take() {
            log::info!("[dump] simulated USB close of {vendor_id:04x}:{product_id:04x}");
        }
        self.claimed = None;
    }

    fn control_out(
        &mut self,
        request: ControlRequest,
        data: &[u8],
        _timeout: Duration,
    ) -> Result<usize> {
        if self.device.is_none() {
            return Err(Error::NotConnected);
        }
        log::debug!(
            "[dump] control {:#04x}/{:#04x} value={:#06x} index={} <- [{}]",
            request.request_type,
            request.request,
            request.value,
            request.index,
            hex_dump(data)
        );
        self.journal.record(data);
        Ok(data.len())
    }

    fn interrupt_in(
        &mut self,
        endpoint: u8,
        max_length: usize,
        _timeout: Duration,
    ) -> Result<Vec<u8>> {
        if self.device.is_none() {
            return Err(Error::NotConnected);
        }
        log::debug!("[dump] interrupt read from endpoint {endpoint:#04x}");
        Ok(canned(max_length))
    }
}
