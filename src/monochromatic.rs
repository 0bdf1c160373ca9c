//! Binary on/off output for boards that cannot dim.

use crate::{config::Attributes, error::Result};

/// Change point used when none is configured.
pub const DEFAULT_CHANGE_POINT: u8 = 64;
/// Lowest accepted change point.
pub const MIN_CHANGE_POINT: u8 = 10;
/// Highest accepted change point.
pub const MAX_CHANGE_POINT: u8 = 245;

const ATTR_CHANGE_POINT: &str = "changePoint";

/// Brightness threshold splitting graded output into on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monochromatic {
    change_point: u8,
}

impl Default for Monochromatic {
    fn default() -> Self {
        Self {
            change_point: DEFAULT_CHANGE_POINT,
        }
    }
}

impl Monochromatic {
    /// Clamp `change_point` into the supported range.
    pub fn new(change_point: i64) -> Self {
        let clamped = change_point.clamp(i64::from(MIN_CHANGE_POINT), i64::from(MAX_CHANGE_POINT));
        Self {
            change_point: u8::try_from(clamped).unwrap_or(DEFAULT_CHANGE_POINT),
        }
    }

    /// Read `changePoint`; out of range values are clamped, not rejected.
    pub fn from_attributes(attributes: &Attributes) -> Result<Self> {
        let monochromatic = attributes
            .get_saturating_i64(ATTR_CHANGE_POINT)?
            .map_or_else(Self::default, Self::new);
        log::debug!("Monochromatic change point {}", monochromatic.change_point);
        Ok(monochromatic)
    }

    /// Brightness at or below which the output is off.
    pub const fn change_point(&self) -> u8 {
        self.change_point
    }

    /// Whether a graded brightness turns the output on.
    pub const fn is_on(&self, brightness: u8) -> bool {
        brightness > self.change_point
    }
}

/// Implemented by devices composing a [`Monochromatic`].
pub trait Thresholded {
    fn monochromatic(&self) -> &Monochromatic;

    fn change_point(&self) -> u8 {
        self.monochromatic().change_point()
    }

    fn binarize(&self, brightness: u8) -> bool {
        self.monochromatic().is_on(brightness)
    }
}
