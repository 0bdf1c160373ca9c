//! Bounded message queue between the IPC listener and the animation loop.
//!
//! Built on `critical-section` and `heapless::Deque`, so a channel can live
//! in a `static` and be shared by any number of senders. The loop drains it
//! once per tick.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::message::Message;

/// Default number of messages queued between two ticks.
pub const DEFAULT_CAPACITY: usize = 32;

/// Returned with the rejected message when the queue is full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueFull(pub Message);

/// A bounded, thread-safe message queue.
pub struct MessageChannel<const SIZE: usize = DEFAULT_CAPACITY> {
    queue: Mutex<RefCell<Deque<Message, SIZE>>>,
}

impl<const SIZE: usize> MessageChannel<SIZE> {
    /// Create a new empty channel.
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Get a sender handle for this channel.
    pub const fn sender(&self) -> MessageSender<'_, SIZE> {
        MessageSender { channel: self }
    }

    /// Get a receiver handle for this channel.
    pub const fn receiver(&self) -> MessageReceiver<'_, SIZE> {
        MessageReceiver { channel: self }
    }

    /// Queue a message, handing it back when the queue is full.
    pub fn try_send(&self, message: Message) -> Result<(), QueueFull> {
        critical_section::with(|cs| {
            let mut queue = self.queue.borrow(cs).borrow_mut();
            queue.push_back(message).map_err(QueueFull)
        })
    }

    /// Take the oldest message, if any.
    pub fn try_receive(&self) -> Option<Message> {
        critical_section::with(|cs| self.queue.borrow(cs).borrow_mut().pop_front())
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.queue.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for MessageChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending half, freely copyable.
#[derive(Clone, Copy)]
pub struct MessageSender<'a, const SIZE: usize> {
    channel: &'a MessageChannel<SIZE>,
}

impl<const SIZE: usize> MessageSender<'_, SIZE> {
    /// Try to queue a message.
    ///
    /// Returns `Err(QueueFull(message))` if the channel is full.
    pub fn try_send(&self, message: Message) -> Result<(), QueueFull> {
        self.channel.try_send(message).inspect_err(|QueueFull(message)| {
            log::warn!("Message queue full, dropping {message}");
        })
    }
}

/// A receiver handle for a [`MessageChannel`].
#[derive(Clone, Copy)]
pub struct MessageReceiver<'a, const SIZE: usize> {
    channel: &'a MessageChannel<SIZE>,
}

impl<const SIZE: usize> MessageReceiver<'_, SIZE> {
    /// Take the oldest message, if any.
    pub fn try_receive(&self) -> Option<Message> {
        self.channel.try_receive()
    }
}
