//! Real-time LED rendering core for arcade control panels.
//!
//! Colors and elements are loaded once into a [`Scene`]. Every tick the
//! [`AnimationLoop`] runs its transitions over the elements and flushes the
//! result to the controller boards through their serial or USB transport.
//! [`set_dump_mode`] swaps every transport constructed afterwards for a
//! dry-run backend.

pub mod channel;
pub mod color;
pub mod config;
pub mod device;
pub mod element;
pub mod error;
pub mod hardware;
pub mod message;
pub mod message_processor;
pub mod monochromatic;
pub mod scene;
pub mod scheduler;
pub mod transition;

pub use channel::{MessageChannel, MessageReceiver, MessageSender};
pub use color::{Color, ColorFormat, ColorRegistry, Colorful, Filter, Rgb};
pub use config::Attributes;
pub use device::{Adalight, Device, PacDrive};
pub use element::{Element, ElementId, ElementRegistry, GroupRegistry};
pub use error::{Error, Result};
pub use hardware::{Hardware, Serial, Usb, close_session, is_dump_mode, set_dump_mode};
pub use message::{Flags, Message, MessageType};
pub use message_processor::{MessageProcessor, Overrides};
pub use monochromatic::{Monochromatic, Thresholded};
pub use scene::Scene;
pub use scheduler::{AnimationLoop, FrameScheduler};
pub use transition::{Crossfade, FadeOutIn, Transition, TransitionSlot, smoothstep};

pub use embassy_time::{Duration, Instant};
