//! Serial transport over a terminal device.

use std::{
    fmt,
    io::{ErrorKind, Read as _, Write as _},
    path::{Path, PathBuf},
    time::Duration,
};

use serialport::{SerialPort, SerialPortType};

use super::{Hardware, dump::DumpLink, hex_dump, is_dump_mode};
use crate::{
    config::{Attributes, parse_hex_u16},
    error::{Error, Result},
};

/// Baud rate used when none is configured.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Read timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Namespace of stable USB serial device names.
pub const BY_ID_DIR: &str = "/dev/serial/by-id";

/// How the serial device is located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSpec {
    /// Explicit device path.
    Path(PathBuf),
    /// USB `vendor:product` identifier.
    UsbId { vendor_id: u16, product_id: u16 },
    /// Fragment of a name under [`BY_ID_DIR`].
    ById(String),
}

impl PortSpec {
    /// Parse the `port` attribute.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::config("empty serial port"));
        }
        if raw.starts_with('/') {
            return Ok(Self::Path(PathBuf::from(raw)));
        }
        if let Some((vendor, product)) = raw.split_once(':') {
            if is_usb_id_part(vendor) && is_usb_id_part(product) {
                return Ok(Self::UsbId {
                    vendor_id: parse_hex_u16("vendor", vendor)?,
                    product_id: parse_hex_u16("product", product)?,
                });
            }
        }
        if raw.contains('/') {
            return Err(Error::config(format!("invalid serial port identifier {raw}")));
        }
        Ok(Self::ById(raw.to_string()))
    }
}

fn is_usb_id_part(part: &str) -> bool {
    part.len() == 4 && part.chars().all(|c| c.is_ascii_hexdigit())
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::UsbId {
                vendor_id,
                product_id,
            } => write!(f, "{vendor_id:04x}:{product_id:04x}"),
            Self::ById(fragment) => write!(f, "{fragment}"),
        }
    }
}

/// Serial transport configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub port: PortSpec,
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl SerialConfig {
    /// Config with the default baud rate and timeout.
    pub const fn new(port: PortSpec) -> Self {
        Self {
            port,
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build from `port`, `baudRate` and `timeout` (milliseconds).
    pub fn from_attributes(attributes: &Attributes) -> Result<Self> {
        let port = PortSpec::parse(attributes.require("port")?)?;
        let baud_rate = match attributes.get_i64("baudRate")? {
            Some(rate) => u32::try_from(rate)
                .ok()
                .filter(|rate| *rate > 0)
                .ok_or_else(|| Error::config(format!("invalid baud rate {rate}")))?,
            None => DEFAULT_BAUD_RATE,
        };
        let timeout = match attributes.get_i64("timeout")? {
            Some(ms) => u64::try_from(ms)
                .map(Duration::from_millis)
                .map_err(|_| Error::config(format!("invalid serial timeout {ms}")))?,
            None => DEFAULT_TIMEOUT,
        };
        Ok(Self {
            port,
            baud_rate,
            timeout,
        })
    }
}

/// Byte level access to a serial device.
///
/// [`PortLink`] talks to the operating system, [`DumpLink`] replaces it in
/// dump mode and in tests.
pub trait SerialLink: fmt::Debug + Send {
    /// Turn a port spec into a device path.
    fn resolve(&self, spec: &PortSpec) -> Result<PathBuf>;

    fn open(&mut self, path: &Path, config: &SerialConfig) -> Result<()>;

    fn close(&mut self);

    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read at most `max_length` bytes; a timeout yields an empty buffer.
    fn read(&mut self, max_length: usize) -> Result<Vec<u8>>;
}

/// Resolve a port spec against the system.
pub fn detect_port(spec: &PortSpec, by_id_dir: &Path) -> Result<PathBuf> {
    match spec {
        PortSpec::Path(path) => Ok(path.clone()),
        PortSpec::UsbId {
            vendor_id,
            product_id,
        } => find_usb_port(*vendor_id, *product_id),
        PortSpec::ById(fragment) => scan_by_id(by_id_dir, fragment),
    }
}

fn find_usb_port(vendor_id: u16, product_id: u16) -> Result<PathBuf> {
    let ports = serialport::available_ports()
        .map_err(|e| Error::NotFound(format!("serial ports ({e})")))?;

    ports
        .into_iter()
        .find_map(|port| match port.port_type {
            SerialPortType::UsbPort(info) if info.vid == vendor_id && info.pid == product_id => {
                Some(PathBuf::from(port.port_name))
            }
            _ => None,
        })
        .ok_or_else(|| {
            Error::NotFound(format!("serial device {vendor_id:04x}:{product_id:04x}"))
        })
}

/// Find the first entry of `dir` whose name contains `fragment`.
///
/// Entries are links, the resolved target is returned when possible.
pub fn scan_by_id(dir: &Path, fragment: &str) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir)
        .map_err(|_| Error::NotFound(format!("serial device `{fragment}` in {}", dir.display())))?;

    let mut matches = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(fragment))
        })
        .collect::<Vec<_>>();
    matches.sort();

    let first = matches
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(format!("serial device `{fragment}` in {}", dir.display())))?;
    Ok(std::fs::canonicalize(&first).unwrap_or(first))
}

/// Fail with [`Error::NotATerminal`] unless `path` opens as a terminal.
///
/// The device is opened non-blocking so a modem line without carrier does
/// not hang the check.
#[cfg(unix)]
fn check_terminal(path: &Path) -> Result<()> {
    use std::{io::IsTerminal as _, os::unix::fs::OpenOptionsExt as _};

    let file = std::fs::OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK | libc::O_NOCTTY)
        .open(path)
        .map_err(|e| Error::Connection(format!("{}: {e}", path.display())))?;
    if file.is_terminal() {
        Ok(())
    } else {
        Err(Error::NotATerminal(path.display().to_string()))
    }
}

#[cfg(not(unix))]
fn check_terminal(_path: &Path) -> Result<()> {
    Ok(())
}

/// Operating system serial port.
pub struct PortLink {
    port: Option<Box<dyn SerialPort>>,
    by_id_dir: PathBuf,
}

impl Default for PortLink {
    fn default() -> Self {
        Self::with_by_id_dir(BY_ID_DIR)
    }
}

impl PortLink {
    /// Resolve by-id names under `dir` instead of [`BY_ID_DIR`].
    pub fn with_by_id_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            port: None,
            by_id_dir: dir.into(),
        }
    }
}

impl fmt::Debug for PortLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortLink")
            .field("open", &self.port.is_some())
            .field("by_id_dir", &self.by_id_dir)
            .finish()
    }
}

impl SerialLink for PortLink {
    fn resolve(&self, spec: &PortSpec) -> Result<PathBuf> {
        detect_port(spec, &self.by_id_dir)
    }

    fn open(&mut self, path: &Path, config: &SerialConfig) -> Result<()> {
        check_terminal(path)?;
        log::debug!("Opening serial device {}", path.display());

        let mut port = serialport::new(path.to_string_lossy(), config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(|e| Error::Connection(format!("{}: {e}", path.display())))?;

        // Raw 8N1 without flow control; boards reset if DTR/RTS toggle.
        port.set_flow_control(serialport::FlowControl::None)?;
        port.set_data_bits(serialport::DataBits::Eight)?;
        port.set_parity(serialport::Parity::None)?;
        port.set_stop_bits(serialport::StopBits::One)?;
        port.write_data_terminal_ready(false)?;

        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        self.port = None;
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }

    fn read(&mut self, max_length: usize) -> Result<Vec<u8>> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;
        let mut buffer = vec![0u8; max_length];
        match port.read(&mut buffer) {
            Ok(bytes_read) => {
                buffer.truncate(bytes_read);
                Ok(buffer)
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Serial transport.
#[derive(Debug)]
pub struct Serial {
    name: String,
    config: SerialConfig,
    link: Box<dyn SerialLink>,
    port: Option<PathBuf>,
    connected: bool,
}

impl Serial {
    /// Create a transport, backed by a dry-run link in dump mode.
    pub fn new(name: &str, config: SerialConfig) -> Self {
        let link: Box<dyn SerialLink> = if is_dump_mode() {
            Box::new(DumpLink::default())
        } else {
            Box::new(PortLink::default())
        };
        Self::with_link(name, config, link)
    }

    /// Create a transport on top of an explicit link.
    pub fn with_link(name: &str, config: SerialConfig, link: Box<dyn SerialLink>) -> Self {
        Self {
            name: name.to_string(),
            config,
            link,
            port: None,
            connected: false,
        }
    }

    /// Transport name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Device path once detected.
    pub fn port(&self) -> Option<&Path> {
        self.port.as_deref()
    }

    /// Whether the device is open.
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Resolve the configured port into a device path.
    pub fn detect_port(&mut self) -> Result<PathBuf> {
        let path = self.link.resolve(&self.config.port)?;
        log::debug!("{}: port {} resolved to {}", self.name, self.config.port, path.display());
        self.port = Some(path.clone());
        Ok(path)
    }

    /// Detect and open the device; connecting twice is a no-op.
    pub fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Ok(());
        }
        let path = self.detect_port()?;
        self.link.open(&path, &self.config)?;
        self.connected = true;
        log::info!("{}: connected to {}", self.name, path.display());
        Ok(())
    }

    /// Close the device; does nothing without a connection.
    pub fn disconnect(&mut self) {
        if !self.connected {
            log::debug!("{}: no active connection", self.name);
            return;
        }
        self.link.close();
        self.connected = false;
        log::info!("{}: disconnected", self.name);
    }

    /// Write a whole frame to the device.
    pub fn transfer_to_connection(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        log::trace!("{}: write [{}]", self.name, hex_dump(bytes));
        self.link.write(bytes)
    }

    /// Read at most `max_length` bytes from the device.
    pub fn transfer_from_connection(&mut self, max_length: usize) -> Result<Vec<u8>> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.link.read(max_length)
    }
}

impl Hardware for Serial {
    fn initialize(&mut self) -> Result<()> {
        self.connect()
    }

    fn terminate(&mut self) -> Result<()> {
        self.disconnect();
        Ok(())
    }

    fn full_name(&self) -> String {
        format!("Serial {} at {}", self.name, self.config.port)
    }
}
