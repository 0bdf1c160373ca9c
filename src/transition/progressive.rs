/// Tick counter shared by every progressive transition.
///
/// Progress runs from `0` up to `total`; reaching `total` completes, so a
/// transition renders exactly `total` frames. Progress never decreases
/// except through [`Progressive::restart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progressive {
    progress: u32,
    total: u32,
}

impl Progressive {
    /// Create a counter over `total` ticks. A zero total is raised to one tick.
    pub const fn new(total: u32) -> Self {
        Self {
            progress: 0,
            total: if total == 0 { 1 } else { total },
        }
    }

    /// Ticks rendered so far.
    pub const fn progress(&self) -> u32 {
        self.progress
    }

    /// Ticks in one full run.
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Completion as a fraction in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f32 {
        (self.progress as f32 / self.total as f32).clamp(0.0, 1.0)
    }

    /// Step one tick forward, saturating at `total`.
    pub fn advance(&mut self) {
        if self.progress < self.total {
            self.progress += 1;
        }
    }

    /// Whether every tick has been rendered.
    pub const fn is_complete(&self) -> bool {
        self.progress >= self.total
    }

    /// Go back to the first tick.
    pub fn restart(&mut self) {
        self.progress = 0;
    }
}
