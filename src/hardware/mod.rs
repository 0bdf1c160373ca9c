//! Board transports.
//!
//! Every transport follows the same lifecycle: it is constructed from a
//! validated config, [`Hardware::initialize`] opens it and
//! [`Hardware::terminate`] closes it. Both are idempotent.
//!
//! When dump mode is enabled before a transport is constructed, the
//! transport is built on top of a dry-run backend from [`dump`] instead of
//! the real device: opens, closes and transfers are only logged and reads
//! return [`dump::DUMP_READ_PAYLOAD`].

use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::Result;

pub mod dump;
pub mod serial;
pub mod usb;

pub use serial::{PortSpec, Serial, SerialConfig, SerialLink};
pub use usb::{ControlRequest, Usb, UsbBackend, UsbConfig, close_session};

static DUMP_MODE: AtomicBool = AtomicBool::new(false);

/// Switch every transport constructed afterwards to dry-run backends.
pub fn set_dump_mode(enabled: bool) {
    if DUMP_MODE.swap(enabled, Ordering::SeqCst) != enabled {
        log::info!("Dump mode {}", if enabled { "enabled" } else { "disabled" });
    }
}

/// Whether new transports are built in dump mode.
pub fn is_dump_mode() -> bool {
    DUMP_MODE.load(Ordering::SeqCst)
}

/// Lifecycle shared by all transports and the devices built on them.
pub trait Hardware {
    /// Open the underlying transport; calling it again is a no-op.
    fn initialize(&mut self) -> Result<()>;

    /// Close the underlying transport; safe to call at any time.
    fn terminate(&mut self) -> Result<()>;

    /// Human readable identification used in logs.
    fn full_name(&self) -> String;
}

/// Render bytes as space separated hex for transfer logs.
pub(crate) fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
