//! Two-phase fade.
//!
//! The first half fades the primary colors out, the second half fades the
//! secondary colors in. Without secondary colors the second half renders
//! nothing.

use super::{DEFAULT_DURATION_TICKS, Progressive, Targets, Transition, fade_percent};
use crate::{
    color::{ColorRegistry, Colorful, Filter},
    config::Attributes,
    element::ElementRegistry,
    error::{Error, Result},
};

const ATTR_DURATION: &str = "duration";
const ATTR_COLORS: &str = "colors";
const ATTR_SECONDARY_COLORS: &str = "secondaryColors";
const ATTR_CYCLE: &str = "cycle";

/// Phase of the fade and its raw (not yet eased) factor.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Out(f32),
    In(f32),
}

impl Phase {
    fn at(fraction: f32) -> Self {
        if fraction < 0.5 {
            Self::Out(1.0 - fraction / 0.5)
        } else {
            Self::In((fraction - 0.5) / 0.5)
        }
    }
}

/// Fade the primary colors out, then the secondary colors in.
///
/// Both phases get half of the ticks; with an even total they are equal.
#[derive(Debug, Clone)]
pub struct FadeOutIn {
    progress: Progressive,
    primary: Colorful,
    secondary: Option<Colorful>,
    targets: Targets,
    cycle: bool,
}

impl FadeOutIn {
    /// Create a fade over `total` ticks.
    pub fn new(total: u32, primary: Colorful, secondary: Option<Colorful>) -> Self {
        Self {
            progress: Progressive::new(total),
            primary,
            secondary,
            targets: Targets::All,
            cycle: false,
        }
    }

    /// Build from `duration`, `colors`, `secondaryColors` and `cycle`.
    pub fn from_attributes(attributes: &Attributes, colors: &ColorRegistry) -> Result<Self> {
        let duration = match attributes.get_i64(ATTR_DURATION)? {
            Some(ticks) => u32::try_from(ticks)
                .ok()
                .filter(|ticks| *ticks > 0)
                .ok_or_else(|| Error::config(format!("invalid fade duration {ticks}")))?,
            None => DEFAULT_DURATION_TICKS,
        };
        let primary = Colorful::from_names(attributes.get(ATTR_COLORS).unwrap_or_default(), colors)?;
        let secondary = attributes
            .get(ATTR_SECONDARY_COLORS)
            .map(|list| Colorful::from_names(list, colors))
            .transpose()?;
        let cycle = attributes.get_bool(ATTR_CYCLE)?.unwrap_or(false);

        Ok(Self::new(duration, primary, secondary).with_cycle(cycle))
    }

    /// Render into a subset of elements only.
    #[must_use]
    pub fn with_targets(mut self, targets: Targets) -> Self {
        self.targets = targets;
        self
    }

    /// Restart with the next colors instead of completing.
    #[must_use]
    pub fn with_cycle(mut self, cycle: bool) -> Self {
        self.cycle = cycle;
        self
    }

    /// Tick counter of the current run.
    pub const fn progress(&self) -> &Progressive {
        &self.progress
    }

    /// Colors faded out in the first phase.
    pub const fn primary(&self) -> &Colorful {
        &self.primary
    }

    /// Colors faded in during the second phase, if any.
    pub const fn secondary(&self) -> Option<&Colorful> {
        self.secondary.as_ref()
    }

    fn next_cycle(&mut self) {
        self.primary.advance_color();
        if let Some(secondary) = &mut self.secondary {
            secondary.advance_color();
        }
        self.progress.restart();
    }
}

impl Transition for FadeOutIn {
    fn calculate(&mut self, elements: &mut ElementRegistry) {
        if self.progress.is_complete() {
            if !self.cycle {
                return;
            }
            self.next_cycle();
        }

        match Phase::at(self.progress.fraction()) {
            Phase::Out(raw) => {
                let color = self.primary.current_color();
                self.targets
                    .render(elements, color, Filter::Combine, fade_percent(raw));
            }
            Phase::In(raw) => {
                if let Some(secondary) = &self.secondary {
                    let color = secondary.current_color();
                    self.targets
                        .render(elements, color, Filter::Combine, fade_percent(raw));
                }
            }
        }

        self.progress.advance();
    }

    fn is_complete(&self) -> bool {
        self.progress.is_complete() && !self.cycle
    }

    fn restart(&mut self) {
        self.progress.restart();
        self.primary.reset();
        if let Some(secondary) = &mut self.secondary {
            secondary.reset();
        }
    }
}
