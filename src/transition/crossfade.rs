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

/// Single phase blend from the primary to the secondary colors.
#[derive(Debug, Clone)]
pub struct Crossfade {
    progress: Progressive,
    from: Colorful,
    to: Colorful,
    targets: Targets,
    cycle: bool,
}

impl Crossfade {
    /// Create a blend from `from` to `to` over `total` ticks.
    pub fn new(total: u32, from: Colorful, to: Colorful) -> Self {
        Self {
            progress: Progressive::new(total),
            from,
            to,
            targets: Targets::All,
            cycle: false,
        }
    }

    /// Build from `duration`, `colors`, the required `secondaryColors` and `cycle`.
    pub fn from_attributes(attributes: &Attributes, colors: &ColorRegistry) -> Result<Self> {
        let duration = attributes
            .get_i64(ATTR_DURATION)?
            .map(|ticks| {
                u32::try_from(ticks)
                    .ok()
                    .filter(|ticks| *ticks > 0)
                    .ok_or_else(|| Error::config(format!("invalid crossfade duration {ticks}")))
            })
            .transpose()?
            .unwrap_or(DEFAULT_DURATION_TICKS);
        let from = Colorful::from_names(attributes.get(ATTR_COLORS).unwrap_or_default(), colors)?;
        let to = Colorful::from_names(attributes.require(ATTR_SECONDARY_COLORS)?, colors)?;
        let cycle = attributes.get_bool(ATTR_CYCLE)?.unwrap_or(false);

        Ok(Self::new(duration, from, to).with_cycle(cycle))
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

    /// Colors blended away from.
    pub const fn primary(&self) -> &Colorful {
        &self.from
    }

    /// Colors blended towards.
    pub const fn secondary(&self) -> &Colorful {
        &self.to
    }

    fn next_cycle(&mut self) {
        self.from.advance_color();
        self.to.advance_color();
        self.progress.restart();
    }
}

impl Transition for Crossfade {
    fn calculate(&mut self, elements: &mut ElementRegistry) {
        if self.progress.is_complete() {
            if !self.cycle {
                return;
            }
            self.next_cycle();
        }

        let amount = fade_percent(self.progress.fraction());
        self.targets
            .render(elements, self.from.current_color(), Filter::Normal, 100);
        self.targets
            .render(elements, self.to.current_color(), Filter::Combine, amount);

        self.progress.advance();
    }

    fn is_complete(&self) -> bool {
        self.progress.is_complete() && !self.cycle
    }

    fn restart(&mut self) {
        self.progress.restart();
        self.from.reset();
        self.to.reset();
    }
}
