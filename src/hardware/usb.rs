//! USB transport.
//!
//! Boards of one model share a vendor/product id and are daisy-chained;
//! they are told apart by a board id in `1..=max_boards`. All instances
//! share one libusb session that lives until [`close_session`].

use std::{cell::RefCell, fmt, time::Duration};

use critical_section::Mutex;
use rusb::{Context, DeviceHandle, UsbContext};

use super::{Hardware, dump::DumpUsbBackend, is_dump_mode};
use crate::{
    config::Attributes,
    error::{Error, Result},
};

/// Transfer timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

pub(crate) const RUSB_LOG_LEVEL: rusb::LogLevel = rusb::LogLevel::Warning;

static SESSION: Mutex<RefCell<Option<Context>>> = Mutex::new(RefCell::new(None));

fn rusb_log_shim(level: rusb::LogLevel, message: String) {
    match level {
        rusb::LogLevel::Error => log::error!("{}", message.trim_end()),
        rusb::LogLevel::Warning => log::warn!("{}", message.trim_end()),
        rusb::LogLevel::Info => log::info!("{}", message.trim_end()),
        rusb::LogLevel::Debug => log::debug!("{}", message.trim_end()),
        rusb::LogLevel::None => (),
    }
}

/// Get the shared session, creating it on first use.
fn session() -> Result<Context> {
    critical_section::with(|cs| {
        let mut session = SESSION.borrow(cs).borrow_mut();
        if let Some(context) = session.as_ref() {
            return Ok(context.clone());
        }

        let mut context =
            Context::new().map_err(|e| Error::Connection(format!("usb session: {e}")))?;
        context.set_log_level(RUSB_LOG_LEVEL);
        context.set_log_callback(Box::new(rusb_log_shim), rusb::LogCallbackMode::Context);
        log::debug!("USB session opened");
        *session = Some(context.clone());
        Ok(context)
    })
}

/// Release the shared USB session.
///
/// Safe to call any number of times, with or without open devices. Devices
/// still open keep their own reference until they disconnect.
pub fn close_session() {
    let closed = critical_section::with(|cs| SESSION.borrow(cs).borrow_mut().take());
    if closed.is_some() {
        log::debug!("USB session closed");
    }
}

/// Whether the shared session is currently open.
pub fn has_session() -> bool {
    critical_section::with(|cs| SESSION.borrow(cs).borrow().is_some())
}

/// USB transport configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    pub interface: u8,
    pub board_id: u8,
    pub max_boards: u8,
    pub timeout: Duration,
}

impl UsbConfig {
    /// Validated config; `board_id` must be in `1..=max_boards`.
    pub fn new(
        vendor_id: u16,
        product_id: u16,
        interface: u8,
        board_id: u8,
        max_boards: u8,
    ) -> Result<Self> {
        let config = Self {
            vendor_id,
            product_id,
            interface,
            board_id,
            max_boards,
            timeout: DEFAULT_TIMEOUT,
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the transfer timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from `vendorId`, `productId` (hex), `interface` and `boardId`.
    pub fn from_attributes(attributes: &Attributes, max_boards: u8) -> Result<Self> {
        let vendor_id = attributes
            .get_hex_u16("vendorId")?
            .ok_or_else(|| Error::config("missing attribute `vendorId`"))?;
        let product_id = attributes
            .get_hex_u16("productId")?
            .ok_or_else(|| Error::config("missing attribute `productId`"))?;
        let interface = small_number(attributes, "interface", 0)?;
        let board_id = small_number(attributes, "boardId", 1)?;
        Self::new(vendor_id, product_id, interface, board_id, max_boards)
    }

    /// Check the board id against the board count.
    pub fn validate(&self) -> Result<()> {
        if self.max_boards == 0 {
            return Err(Error::config("max boards must be at least 1"));
        }
        if self.board_id == 0 || self.board_id > self.max_boards {
            return Err(Error::config(format!(
                "board id {} out of range 1..={}",
                self.board_id, self.max_boards
            )));
        }
        Ok(())
    }
}

pub(crate) fn small_number(attributes: &Attributes, name: &str, default: u8) -> Result<u8> {
    attributes
        .get_i64(name)?
        .map(|value| {
            u8::try_from(value).map_err(|_| Error::config(format!("`{name}` out of range: {value}")))
        })
        .transpose()
        .map(|value| value.unwrap_or(default))
}

/// Setup packet of a host to device control transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequest {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
}

impl ControlRequest {
    /// Class request to an interface, host to device.
    pub const CLASS_INTERFACE_OUT: u8 = 0x21;
    /// HID `SET_REPORT`.
    pub const SET_REPORT: u8 = 0x09;

    /// HID class `SET_REPORT` request.
    pub const fn set_report(value: u16, index: u16) -> Self {
        Self {
            request_type: Self::CLASS_INTERFACE_OUT,
            request: Self::SET_REPORT,
            value,
            index,
        }
    }
}

/// Device level USB access.
///
/// [`RusbBackend`] talks to libusb, [`DumpUsbBackend`] replaces it in dump
/// mode and in tests.
pub trait UsbBackend: fmt::Debug + Send {
    /// Open the first attached device matching the ids.
    fn open(&mut self, vendor_id: u16, product_id: u16, timeout: Duration) -> Result<()>;

    fn is_open(&self) -> bool;

    fn claim_interface(&mut self, interface: u8) -> Result<()>;

    fn release_interface(&mut self, interface: u8) -> Result<()>;

    fn close(&mut self);

    fn control_out(&mut self, request: ControlRequest, data: &[u8], timeout: Duration)
    -> Result<usize>;

    fn interrupt_in(&mut self, endpoint: u8, max_length: usize, timeout: Duration)
    -> Result<Vec<u8>>;
}

/// libusb backend.
#[derive(Default)]
pub struct RusbBackend {
    handle: Option<DeviceHandle<Context>>,
}

impl fmt::Debug for RusbBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RusbBackend")
            .field("open", &self.handle.is_some())
            .finish()
    }
}

impl UsbBackend for RusbBackend {
    fn open(&mut self, vendor_id: u16, product_id: u16, _timeout: Duration) -> Result<()> {
        let context = session()?;
        let devices = context
            .devices()
            .map_err(|e| Error::Connection(format!("usb enumeration: {e}")))?;
        log::debug!("Enumerating USB devices ({} total on bus)", devices.len());

        let device = devices
            .iter()
            .find(|device| {
                device.device_descriptor().is_ok_and(|descriptor| {
                    descriptor.vendor_id() == vendor_id && descriptor.product_id() == product_id
                })
            })
            .ok_or_else(|| {
                Error::Connection(format!("no USB device {vendor_id:04x}:{product_id:04x}"))
            })?;

        let handle = device.open().map_err(|e| {
            Error::Connection(format!(
                "failed to open {vendor_id:04x}:{product_id:04x} (bus={} addr={}): {e}",
                device.bus_number(),
                device.address()
            ))
        })?;
        self.handle = Some(handle);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn claim_interface(&mut self, interface: u8) -> Result<()> {
        let handle = self.handle.as_mut().ok_or(Error::NotConnected)?;

        #[cfg(target_os = "linux")]
        if let Ok(true) = handle.kernel_driver_active(interface) {
            match handle.detach_kernel_driver(interface) {
                Ok(()) => log::debug!("Detached kernel driver from interface {interface}"),
                Err(e) => log::warn!("Could not detach kernel driver: {e}"),
            }
        }

        handle.claim_interface(interface).map_err(|e| {
            Error::Connection(format!("failed to claim USB interface {interface}: {e}"))
        })
    }

    fn release_interface(&mut self, interface: u8) -> Result<()> {
        let handle = self.handle.as_mut().ok_or(Error::NotConnected)?;
        handle.release_interface(interface)?;
        Ok(())
    }

    fn close(&mut self) {
        self.handle = None;
    }

    fn control_out(
        &mut self,
        request: ControlRequest,
        data: &[u8],
        timeout: Duration,
    ) -> Result<usize> {
        let handle = self.handle.as_ref().ok_or(Error::NotConnected)?;
        let written = handle.write_control(
            request.request_type,
            request.request,
            request.value,
            request.index,
            data,
            timeout,
        )?;
        Ok(written)
    }

    fn interrupt_in(
        &mut self,
        endpoint: u8,
        max_length: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let handle = self.handle.as_ref().ok_or(Error::NotConnected)?;
        let mut buffer = vec![0u8; max_length];
        match handle.read_interrupt(endpoint, &mut buffer, timeout) {
            Ok(bytes_read) => {
                buffer.truncate(bytes_read);
                Ok(buffer)
            }
            Err(rusb::Error::Timeout) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// USB transport.
#[derive(Debug)]
pub struct Usb {
    name: String,
    config: UsbConfig,
    backend: Box<dyn UsbBackend>,
    claimed: bool,
}

impl Usb {
    /// Create a transport, backed by a dry-run backend in dump mode.
    pub fn new(name: &str, config: UsbConfig) -> Result<Self> {
        let backend: Box<dyn UsbBackend> = if is_dump_mode() {
            Box::new(DumpUsbBackend::default())
        } else {
            Box::new(RusbBackend::default())
        };
        Self::with_backend(name, config, backend)
    }

    /// Create a transport on top of an explicit backend.
    pub fn with_backend(name: &str, config: UsbConfig, backend: Box<dyn UsbBackend>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: name.to_string(),
            config,
            backend,
            claimed: false,
        })
    }

    /// Transport name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn config(&self) -> &UsbConfig {
        &self.config
    }

    /// Board id in `1..=max_boards`.
    pub const fn board_id(&self) -> u8 {
        self.config.board_id
    }

    /// Whether the device is open.
    pub fn is_connected(&self) -> bool {
        self.backend.is_open()
    }

    /// Whether the interface is claimed.
    pub const fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Open the first matching device and claim the interface.
    pub fn connect(&mut self) -> Result<()> {
        if self.backend.is_open() {
            return Ok(());
        }
        self.backend
            .open(self.config.vendor_id, self.config.product_id, self.config.timeout)?;
        if let Err(e) = self.claim_interface() {
            self.backend.close();
            return Err(e);
        }
        log::info!("{}: connected", self.full_name());
        Ok(())
    }

    /// Claim the configured interface; needs an open device.
    pub fn claim_interface(&mut self) -> Result<()> {
        if !self.backend.is_open() {
            return Err(Error::NotConnected);
        }
        if self.claimed {
            return Ok(());
        }
        self.backend.claim_interface(self.config.interface)?;
        self.claimed = true;
        Ok(())
    }

    /// Release the interface and close the device; does nothing when closed.
    pub fn disconnect(&mut self) {
        if !self.backend.is_open() {
            log::debug!("{}: no active connection", self.name);
            return;
        }
        if self.claimed {
            if let Err(e) = self.backend.release_interface(self.config.interface) {
                log::warn!("{}: failed to release interface: {e}", self.name);
            }
            self.claimed = false;
        }
        self.backend.close();
        log::info!("{}: disconnected", self.full_name());
    }

    /// Send `data` with a `SET_REPORT` addressed by `value`.
    pub fn transfer_to_connection(&mut self, value: u16, data: &[u8]) -> Result<()> {
        if !self.backend.is_open() {
            return Err(Error::NotConnected);
        }
        let request = ControlRequest::set_report(value, u16::from(self.config.interface));
        let written = self.backend.control_out(request, data, self.config.timeout)?;
        if written != data.len() {
            return Err(Error::Transfer(format!(
                "{}: short write, {written} of {} bytes",
                self.name,
                data.len()
            )));
        }
        Ok(())
    }

    /// Read up to `max_length` bytes from an interrupt endpoint.
    pub fn transfer_from_connection(&mut self, endpoint: u8, max_length: usize) -> Result<Vec<u8>> {
        if !self.backend.is_open() {
            return Err(Error::NotConnected);
        }
        self.backend
            .interrupt_in(endpoint, max_length, self.config.timeout)
    }
}

impl Hardware for Usb {
    fn initialize(&mut self) -> Result<()> {
        self.connect()
    }

    fn terminate(&mut self) -> Result<()> {
        self.disconnect();
        Ok(())
    }

    fn full_name(&self) -> String {
        format!(
            "USB {} {:04x}:{:04x} board {}",
            self.name, self.config.vendor_id, self.config.product_id, self.config.board_id
        )
    }
}
