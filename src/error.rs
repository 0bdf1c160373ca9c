use core::fmt;

/// Crate-wide result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised by the rendering core and the board transports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Bad, missing or unparseable configuration value.
    Configuration(String),
    /// A named color, element, group or port does not exist.
    NotFound(String),
    /// A write-once registry was populated twice.
    AlreadyLoaded,
    /// The transport could not be opened or claimed.
    Connection(String),
    /// The serial path exists but is not a terminal device.
    NotATerminal(String),
    /// A transfer was attempted before `connect()`.
    NotConnected,
    /// I/O failure while reading or writing.
    Transfer(String),
    /// An IPC record could not be decoded.
    Protocol(String),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "configuration error: {message}"),
            Self::NotFound(what) => write!(f, "{what} not found"),
            Self::AlreadyLoaded => f.write_str("registry already loaded"),
            Self::Connection(message) => write!(f, "connection error: {message}"),
            Self::NotATerminal(path) => write!(f, "{path} is not a terminal device"),
            Self::NotConnected => f.write_str("no active connection"),
            Self::Transfer(message) => write!(f, "transfer error: {message}"),
            Self::Protocol(message) => write!(f, "protocol error: {message}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<rusb::Error> for Error {
    fn from(e: rusb::Error) -> Self {
        Self::Transfer(format!("usb: {e}"))
    }
}

impl From<serialport::Error> for Error {
    fn from(e: serialport::Error) -> Self {
        match e.kind() {
            serialport::ErrorKind::NoDevice => Self::Connection(e.to_string()),
            _ => Self::Transfer(format!("serialport: {e}")),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Transfer(e.to_string())
    }
}
