//! Controller boards.
//!
//! A device owns one transport and a pin map. On every flush it reads the
//! settled element colors, encodes them into its board frame and pushes the
//! frame through the transport.

mod adalight;
mod pac_drive;

pub use adalight::{Adalight, MAX_LEDS, encode_frame};
pub use pac_drive::{
    MAX_BOARDS, OUTPUT_COUNT, PRODUCT_ID_BASE, PacDrive, REPORT_VALUE, VENDOR_ID, encode_state,
};

use crate::{
    color::Rgb,
    element::{ElementId, ElementRegistry},
    error::{Error, Result},
    hardware::Hardware,
};

/// Board driven by the animation loop.
pub trait Device: Hardware {
    /// Number of outputs of the board.
    fn led_count(&self) -> usize;

    /// Send the current element colors to the board.
    fn update(&mut self, elements: &ElementRegistry) -> Result<()>;
}

/// Output pin to element assignment of a board.
///
/// Unassigned pins render black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinMap {
    pins: Vec<Option<ElementId>>,
}

impl PinMap {
    /// Create a map of `count` unassigned pins.
    pub fn new(count: usize) -> Self {
        Self {
            pins: vec![None; count],
        }
    }

    /// Wire `pin` to `element`, replacing a previous assignment.
    pub fn assign(&mut self, pin: usize, element: ElementId) -> Result<()> {
        let count = self.pins.len();
        let slot = self
            .pins
            .get_mut(pin)
            .ok_or_else(|| Error::config(format!("pin {pin} out of range 0..{count}")))?;
        *slot = Some(element);
        Ok(())
    }

    /// Element driving `pin`, if assigned.
    pub fn get(&self, pin: usize) -> Option<ElementId> {
        self.pins.get(pin).copied().flatten()
    }

    /// Number of pins.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Color of every pin, in pin order.
    pub fn colors<'a>(&'a self, elements: &'a ElementRegistry) -> impl ExactSizeIterator<Item = Rgb> + 'a {
        self.pins.iter().map(|pin| {
            pin.and_then(|id| elements.get(id))
                .map_or(Rgb::default(), |element| element.color())
        })
    }
}
