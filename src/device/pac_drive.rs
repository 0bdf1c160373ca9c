use super::{Device, PinMap};
use crate::{
    color::brightness,
    config::Attributes,
    element::{ElementId, ElementRegistry},
    error::Result,
    hardware::{Hardware, Usb, UsbBackend, UsbConfig, usb::small_number},
    monochromatic::{Monochromatic, Thresholded},
};

/// USB vendor id of every board.
pub const VENDOR_ID: u16 = 0xD209;
/// Product id of board 1; board `n` answers on `PRODUCT_ID_BASE + n - 1`.
pub const PRODUCT_ID_BASE: u16 = 0x1500;
/// Boards that can share one host.
pub const MAX_BOARDS: u8 = 4;
/// On/off outputs per board.
pub const OUTPUT_COUNT: usize = 16;
/// Value code of the output state report.
pub const REPORT_VALUE: u16 = 0x0200;

const INTERFACE: u8 = 0;

/// Output state report for a 16 bit on/off mask.
#[allow(clippy::cast_possible_truncation)]
pub const fn encode_state(state: u16) -> [u8; 4] {
    [0, 0, (state >> 8) as u8, (state & 0xFF) as u8]
}

/// Sixteen output on/off board on USB.
#[derive(Debug)]
pub struct PacDrive {
    usb: Usb,
    pins: PinMap,
    monochromatic: Monochromatic,
    state: u16,
}

impl PacDrive {
    /// Create a board device; `board_id` selects the product id.
    pub fn new(name: &str, board_id: u8, monochromatic: Monochromatic) -> Result<Self> {
        let usb = Usb::new(name, Self::usb_config(board_id)?)?;
        Ok(Self::with_usb(usb, monochromatic))
    }

    /// Same as [`PacDrive::new`] on an explicit backend.
    pub fn with_backend(
        name: &str,
        board_id: u8,
        monochromatic: Monochromatic,
        backend: Box<dyn UsbBackend>,
    ) -> Result<Self> {
        let usb = Usb::with_backend(name, Self::usb_config(board_id)?, backend)?;
        Ok(Self::with_usb(usb, monochromatic))
    }

    /// Build from `boardId` and `changePoint`.
    pub fn from_attributes(name: &str, attributes: &Attributes) -> Result<Self> {
        let board_id = small_number(attributes, "boardId", 1)?;
        let monochromatic = Monochromatic::from_attributes(attributes)?;
        Self::new(name, board_id, monochromatic)
    }

    fn usb_config(board_id: u8) -> Result<UsbConfig> {
        let product_id = PRODUCT_ID_BASE + u16::from(board_id.saturating_sub(1));
        UsbConfig::new(VENDOR_ID, product_id, INTERFACE, board_id, MAX_BOARDS)
    }

    fn with_usb(usb: Usb, monochromatic: Monochromatic) -> Self {
        Self {
            usb,
            pins: PinMap::new(OUTPUT_COUNT),
            monochromatic,
            state: 0,
        }
    }

    /// Drive output `pin` from `element`.
    pub fn assign(&mut self, pin: usize, element: ElementId) -> Result<()> {
        self.pins.assign(pin, element)
    }

    /// Underlying transport.
    pub const fn usb(&self) -> &Usb {
        &self.usb
    }

    /// Last output mask sent, bit `n` is pin `n`.
    pub const fn state(&self) -> u16 {
        self.state
    }

    /// Output mask for the current element colors.
    pub fn compute_state(&self, elements: &ElementRegistry) -> u16 {
        self.pins
            .colors(elements)
            .enumerate()
            .filter(|(_, color)| self.binarize(brightness(*color)))
            .fold(0, |state, (pin, _)| state | (1u16 << pin))
    }
}

impl Thresholded for PacDrive {
    fn monochromatic(&self) -> &Monochromatic {
        &self.monochromatic
    }
}

impl Hardware for PacDrive {
    fn initialize(&mut self) -> Result<()> {
        self.usb.initialize()
    }

    fn terminate(&mut self) -> Result<()> {
        self.usb.terminate()
    }

    fn full_name(&self) -> String {
        format!("PacDrive ({})", self.usb.full_name())
    }
}

impl Device for PacDrive {
    fn led_count(&self) -> usize {
        OUTPUT_COUNT
    }

    fn update(&mut self, elements: &ElementRegistry) -> Result<()> {
        let state = self.compute_state(elements);
        self.usb
            .transfer_to_connection(REPORT_VALUE, &encode_state(state))?;
        self.state = state;
        Ok(())
    }
}
