mod colorful;
mod filter;
mod registry;
mod utils;

use std::sync::Arc;

use smart_leds::RGB8;

pub use colorful::Colorful;
pub use filter::Filter;
pub use registry::ColorRegistry;
pub use utils::{blend_colors, blend_percent, brightness, rgb_from_u32};

use crate::error::{Error, Result};

/// RGB color with 8 bits per channel.
pub type Rgb = RGB8;

const NAME_ON: &str = "On";
const NAME_OFF: &str = "Off";

/// Textual encoding of color values in the profile document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    /// `RRGGBB`, optionally prefixed by `#` or `0x`.
    Hex,
    /// `r,g,b` decimal components.
    Decimal,
}

impl ColorFormat {
    /// Parse `hex` or `decimal`.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "decimal" | "dec" => Ok(Self::Decimal),
            other => Err(Error::config(format!("unknown color format `{other}`"))),
        }
    }
}

/// Immutable named RGB value.
///
/// Cloning is cheap, the name is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    name: Arc<str>,
    rgb: Rgb,
}

impl Color {
    /// Create a named color from its components.
    pub fn new(name: &str, r: u8, g: u8, b: u8) -> Self {
        Self {
            name: Arc::from(name),
            rgb: Rgb { r, g, b },
        }
    }

    /// Create a named color from an [`Rgb`] value.
    pub fn from_rgb(name: &str, rgb: Rgb) -> Self {
        Self::new(name, rgb.r, rgb.g, rgb.b)
    }

    /// Parse a color value in the given format.
    pub fn parse(name: &str, value: &str, format: ColorFormat) -> Result<Self> {
        let rgb = match format {
            ColorFormat::Hex => parse_hex(value),
            ColorFormat::Decimal => parse_decimal(value),
        }
        .ok_or_else(|| Error::config(format!("malformed color `{name}`: {value}")))?;
        Ok(Self::from_rgb(name, rgb))
    }

    /// Full white.
    pub fn on() -> Self {
        Self::new(NAME_ON, 255, 255, 255)
    }

    /// Black.
    pub fn off() -> Self {
        Self::new(NAME_OFF, 0, 0, 0)
    }

    /// Name the color was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color value.
    pub const fn rgb(&self) -> Rgb {
        self.rgb
    }

    /// Components as an `(r, g, b)` tuple.
    pub const fn components(&self) -> (u8, u8, u8) {
        (self.rgb.r, self.rgb.g, self.rgb.b)
    }

    /// Mean of the three channels.
    pub const fn brightness(&self) -> u8 {
        brightness(self.rgb)
    }
}

fn parse_hex(value: &str) -> Option<Rgb> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);
    if digits.len() != 6 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().map(rgb_from_u32)
}

fn parse_decimal(value: &str) -> Option<Rgb> {
    let mut parts = value.split(',').map(|part| part.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Rgb { r, g, b })
}
