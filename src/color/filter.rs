use crate::{
    color::{
        Rgb,
        utils::{blend_percent, scale8},
    },
    error::{Error, Result},
};

const FILTER_NAME_NORMAL: &str = "Normal";
const FILTER_NAME_COMBINE: &str = "Combine";
const FILTER_NAME_COVERT: &str = "Covert";
const FILTER_NAME_MASK: &str = "Mask";
const FILTER_NAME_INVERT: &str = "Invert";

/// How an incoming color is combined with an element's current color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Overwrite unconditionally.
    #[default]
    Normal,
    /// Blend weighted by intensity.
    Combine,
    /// Keep the brighter channel of both.
    Covert,
    /// Scale the current color by the incoming one.
    Mask,
    /// Blend the complement of the incoming color weighted by intensity.
    Invert,
}

impl Filter {
    /// Combine `incoming` into `current`.
    ///
    /// `intensity` is a percentage and is ignored by [`Filter::Normal`].
    pub fn apply(self, current: Rgb, incoming: Rgb, intensity: u8) -> Rgb {
        match self {
            Self::Normal => incoming,
            Self::Combine => blend_percent(current, incoming, intensity),
            Self::Covert => Rgb {
                r: current.r.max(incoming.r),
                g: current.g.max(incoming.g),
                b: current.b.max(incoming.b),
            },
            Self::Mask => Rgb {
                r: scale8(current.r, incoming.r),
                g: scale8(current.g, incoming.g),
                b: scale8(current.b, incoming.b),
            },
            Self::Invert => {
                let inverted = Rgb {
                    r: 255 - incoming.r,
                    g: 255 - incoming.g,
                    b: 255 - incoming.b,
                };
                blend_percent(current, inverted, intensity)
            }
        }
    }

    /// Parse a filter by its profile name.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim() {
            FILTER_NAME_NORMAL => Ok(Self::Normal),
            FILTER_NAME_COMBINE => Ok(Self::Combine),
            FILTER_NAME_COVERT => Ok(Self::Covert),
            FILTER_NAME_MASK => Ok(Self::Mask),
            FILTER_NAME_INVERT => Ok(Self::Invert),
            other => Err(Error::config(format!("unknown filter `{other}`"))),
        }
    }

    /// Profile name of the filter.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => FILTER_NAME_NORMAL,
            Self::Combine => FILTER_NAME_COMBINE,
            Self::Covert => FILTER_NAME_COVERT,
            Self::Mask => FILTER_NAME_MASK,
            Self::Invert => FILTER_NAME_INVERT,
        }
    }
}
