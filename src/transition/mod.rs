//! Per-tick color transitions.
//!
//! A transition is advanced once per tick through [`Transition::calculate`]
//! and writes its output into the element registry through
//! [`Element::set_color`](crate::element::Element::set_color). The concrete
//! set is closed, so the animation loop stores them in a [`TransitionSlot`].

mod crossfade;
mod fade_out_in;
mod progressive;

pub use crossfade::Crossfade;
pub use fade_out_in::FadeOutIn;
pub use progressive::Progressive;

use crate::{
    color::{Color, Filter},
    element::{ElementId, ElementRegistry},
};

/// Default transition length in ticks.
pub const DEFAULT_DURATION_TICKS: u32 = 60;

/// A per-tick color state machine.
pub trait Transition {
    /// Advance by one tick and render into `elements`.
    fn calculate(&mut self, elements: &mut ElementRegistry);

    /// Whether the transition reached its terminal state.
    fn is_complete(&self) -> bool;

    /// Start over from the first tick and the first colors.
    fn restart(&mut self);
}

/// Elements a transition renders into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Targets {
    /// Every element of the registry.
    #[default]
    All,
    Elements(Vec<ElementId>),
}

impl Targets {
    pub(crate) fn render(
        &self,
        elements: &mut ElementRegistry,
        color: &Color,
        filter: Filter,
        intensity: u8,
    ) {
        match self {
            Self::All => elements.set_all(color, filter, intensity),
            Self::Elements(ids) => {
                for id in ids {
                    if let Some(element) = elements.get_mut(*id) {
                        element.set_color(color, filter, intensity);
                    }
                }
            }
        }
    }
}

/// Cubic easing `x²(3 - 2x)` over `[0, 1]`.
///
/// Input outside of the range is clamped first.
pub fn smoothstep(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Smoothed fade factor as a 0-100 percentage.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fade_percent(factor: f32) -> u8 {
    libm::roundf(smoothstep(factor) * 100.0) as u8
}

/// Transition slot - enum containing all transition kinds.
#[derive(Debug, Clone)]
pub enum TransitionSlot {
    FadeOutIn(FadeOutIn),
    Crossfade(Crossfade),
}

impl Transition for TransitionSlot {
    fn calculate(&mut self, elements: &mut ElementRegistry) {
        match self {
            Self::FadeOutIn(transition) => transition.calculate(elements),
            Self::Crossfade(transition) => transition.calculate(elements),
        }
    }

    fn is_complete(&self) -> bool {
        match self {
            Self::FadeOutIn(transition) => transition.is_complete(),
            Self::Crossfade(transition) => transition.is_complete(),
        }
    }

    fn restart(&mut self) {
        match self {
            Self::FadeOutIn(transition) => transition.restart(),
            Self::Crossfade(transition) => transition.restart(),
        }
    }
}

impl From<FadeOutIn> for TransitionSlot {
    fn from(transition: FadeOutIn) -> Self {
        Self::FadeOutIn(transition)
    }
}

impl From<Crossfade> for TransitionSlot {
    fn from(transition: Crossfade) -> Self {
        Self::Crossfade(transition)
    }
}
