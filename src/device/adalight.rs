use super::{Device, PinMap};
use crate::{
    color::Rgb,
    config::Attributes,
    element::{ElementId, ElementRegistry},
    error::{Error, Result},
    hardware::{Hardware, Serial, SerialConfig},
};

/// Largest strip a frame header can describe.
pub const MAX_LEDS: usize = 1 << 16;

const MAGIC: &[u8; 3] = b"Ada";
const HEADER_LEN: usize = 6;

/// Encode an Adalight frame into `out`.
///
/// Header is `Ada`, then the LED count minus one as big endian u16, then
/// the checksum `hi ^ lo ^ 0x55`. RGB triplets follow.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_frame(colors: impl ExactSizeIterator<Item = Rgb>, out: &mut Vec<u8>) {
    let count = colors.len().clamp(1, MAX_LEDS) - 1;
    let hi = (count >> 8) as u8;
    let lo = (count & 0xFF) as u8;

    out.clear();
    out.reserve(HEADER_LEN + colors.len() * 3);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[hi, lo, hi ^ lo ^ 0x55]);
    for color in colors.take(MAX_LEDS) {
        out.extend_from_slice(&[color.r, color.g, color.b]);
    }
}

/// RGB strip behind an Adalight compatible serial controller.
#[derive(Debug)]
pub struct Adalight {
    serial: Serial,
    pins: PinMap,
    frame: Vec<u8>,
}

impl Adalight {
    /// Create a strip of `led_count` LEDs on top of `serial`.
    pub fn new(serial: Serial, led_count: usize) -> Result<Self> {
        if led_count == 0 || led_count > MAX_LEDS {
            return Err(Error::config(format!(
                "led count {led_count} out of range 1..={MAX_LEDS}"
            )));
        }
        Ok(Self {
            serial,
            pins: PinMap::new(led_count),
            frame: Vec::new(),
        })
    }

    /// Build from the serial attributes plus `ledCount`.
    pub fn from_attributes(name: &str, attributes: &Attributes) -> Result<Self> {
        let config = SerialConfig::from_attributes(attributes)?;
        let raw = attributes.require("ledCount")?;
        let led_count = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| Error::config(format!("`ledCount` is not a number: {raw}")))?;
        Self::new(Serial::new(name, config), led_count)
    }

    /// Drive LED `pin` from `element`.
    pub fn assign(&mut self, pin: usize, element: ElementId) -> Result<()> {
        self.pins.assign(pin, element)
    }

    /// LED to element mapping.
    pub const fn pins(&self) -> &PinMap {
        &self.pins
    }

    /// Underlying transport.
    pub const fn serial(&self) -> &Serial {
        &self.serial
    }

    /// Last frame sent to the board.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }
}

impl Hardware for Adalight {
    fn initialize(&mut self) -> Result<()> {
        self.serial.initialize()
    }

    fn terminate(&mut self) -> Result<()> {
        self.serial.terminate()
    }

    fn full_name(&self) -> String {
        format!("Adalight ({})", self.serial.full_name())
    }
}

impl Device for Adalight {
    fn led_count(&self) -> usize {
        self.pins.len()
    }

    fn update(&mut self, elements: &ElementRegistry) -> Result<()> {
        encode_frame(self.pins.colors(elements), &mut self.frame);
        self.serial.transfer_to_connection(&self.frame)
    }
}
