//! Animation loop and frame pacing.
//!
//! Provides portable frame pacing without async/await or platform-specific
//! timers. The caller is responsible for sleeping between frames.

use core::fmt;

use embassy_time::{Duration, Instant};

use crate::{
    device::Device,
    element::ElementRegistry,
    error::{Error, Result},
    message::Message,
    message_processor::{MessageProcessor, Overrides},
    scene::Scene,
    transition::{Transition, TransitionSlot},
};

/// Default target frame rate.
pub const DEFAULT_FPS: u32 = 60;

/// Default frame duration based on target FPS.
pub const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(1000 / DEFAULT_FPS as u64);

/// Failure of one device during a lifecycle call or a flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceError {
    pub device: String,
    pub error: Error,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.device, self.error)
    }
}

/// Transitions and devices of the running profile.
///
/// Every tick starts from the default element colors, runs the active
/// transitions in insertion order (last writer wins) and only then writes to
/// the devices, again in insertion order.
#[derive(Default)]
pub struct AnimationLoop {
    transitions: Vec<TransitionSlot>,
    devices: Vec<Box<dyn Device>>,
}

impl AnimationLoop {
    /// Create a loop without transitions or devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition; it renders after the existing ones.
    pub fn add_transition(&mut self, transition: impl Into<TransitionSlot>) {
        self.transitions.push(transition.into());
    }

    /// Append a device; it is flushed after the existing ones.
    pub fn add_device(&mut self, device: Box<dyn Device>) {
        self.devices.push(device);
    }

    /// Active transitions, in render order.
    pub fn transitions(&self) -> &[TransitionSlot] {
        &self.transitions
    }

    /// Number of devices.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Open every device.
    pub fn initialize(&mut self) -> Vec<DeviceError> {
        self.each_device(|device| device.initialize())
    }

    /// Close every device.
    pub fn terminate(&mut self) -> Vec<DeviceError> {
        self.each_device(|device| device.terminate())
    }

    /// Compute the element colors of one tick.
    pub fn render(&mut self, elements: &mut ElementRegistry) {
        elements.reset_all();
        for transition in &mut self.transitions {
            transition.calculate(elements);
        }
        self.transitions.retain(|transition| !transition.is_complete());
    }

    /// Send the settled element colors to every device.
    ///
    /// A failing device does not stop the others; nothing is retried.
    pub fn flush(&mut self, elements: &ElementRegistry) -> Vec<DeviceError> {
        self.each_device(|device| device.update(elements))
    }

    /// Render, paint the overrides, then flush.
    pub fn tick(&mut self, elements: &mut ElementRegistry, overrides: &Overrides) -> Vec<DeviceError> {
        self.render(elements);
        overrides.apply(elements);
        self.flush(elements)
    }

    fn each_device(
        &mut self,
        mut call: impl FnMut(&mut dyn Device) -> Result<()>,
    ) -> Vec<DeviceError> {
        let mut errors = Vec::new();
        for device in &mut self.devices {
            if let Err(error) = call(device.as_mut()) {
                let device = device.full_name();
                log::error!("{device}: {error}");
                errors.push(DeviceError { device, error });
            }
        }
        errors
    }
}

/// Result of a frame tick operation.
#[derive(Debug, Clone)]
pub struct FrameResult {
    /// The deadline for the next frame.
    pub next_deadline: Instant,
    /// How long to wait until the next frame (zero if behind schedule).
    pub sleep_duration: Duration,
    /// Profile level messages received during this frame.
    pub deferred: Vec<Message>,
    /// Devices that failed to update.
    pub errors: Vec<DeviceError>,
}

/// Paces the animation loop with drift correction.
///
/// ```ignore
/// let mut scheduler = FrameScheduler::new(animation, processor);
///
/// loop {
///     let result = scheduler.tick(Instant::now(), &mut scene);
///     std::thread::sleep(result.sleep_duration.into());
/// }
/// ```
pub struct FrameScheduler<'a, const SIZE: usize> {
    animation: AnimationLoop,
    processor: MessageProcessor<'a, SIZE>,
    next_frame: Instant,
    frame_duration: Duration,
}

impl<'a, const SIZE: usize> FrameScheduler<'a, SIZE> {
    /// Create a scheduler running at [`DEFAULT_FPS`].
    pub fn new(animation: AnimationLoop, processor: MessageProcessor<'a, SIZE>) -> Self {
        Self::with_frame_duration(animation, processor, DEFAULT_FRAME_DURATION)
    }

    /// Create a scheduler with a custom frame duration.
    pub fn with_frame_duration(
        animation: AnimationLoop,
        processor: MessageProcessor<'a, SIZE>,
        frame_duration: Duration,
    ) -> Self {
        Self {
            animation,
            processor,
            next_frame: Instant::from_millis(0),
            frame_duration,
        }
    }

    /// Process one frame and return timing information.
    ///
    /// Drains pending messages, renders, flushes and schedules the next
    /// frame. Falling behind by more than two frames restarts the schedule
    /// from `now` instead of bursting through the backlog.
    pub fn tick(&mut self, now: Instant, scene: &mut Scene) -> FrameResult {
        let max_drift = self.frame_duration * 2;
        if now > self.next_frame + max_drift {
            self.next_frame = now;
        }

        let deferred = self.processor.process_pending(scene);
        let errors = self
            .animation
            .tick(&mut scene.elements, self.processor.overrides());

        self.next_frame += self.frame_duration;
        let sleep_duration = self
            .next_frame
            .checked_duration_since(now)
            .unwrap_or(Duration::from_ticks(0));

        FrameResult {
            next_deadline: self.next_frame,
            sleep_duration,
            deferred,
            errors,
        }
    }

    /// Get the animation loop.
    pub const fn animation(&self) -> &AnimationLoop {
        &self.animation
    }

    /// Get the animation loop for changes.
    pub const fn animation_mut(&mut self) -> &mut AnimationLoop {
        &mut self.animation
    }

    /// Get the message processor.
    pub const fn processor(&self) -> &MessageProcessor<'a, SIZE> {
        &self.processor
    }
}
