//! Transport event queue.
//!
//! The broker client runs its callbacks on its own task. Each callback is
//! turned into a [`TransportEvent`] and pushed into a bounded queue; the
//! main loop drains it between sampling rounds, so all gate state is
//! mutated from one place.
//!
//! Inbound messages may only fill the queue up to [`CONTROL_RESERVE`]
//! slots short of capacity. The rest is kept for link events and acks,
//! which the subscription count depends on. If one of those is still
//! lost, the next drain fails with [`CommsError::EventsLost`].
//!
//! ```text
//! ┌──────────────┐  TransportEvent  ┌──────────────┐
//! │ broker task  │─────────────────▶│  Main Loop   │
//! │ (callbacks)  │   EventQueue     │  (consumer)  │
//! └──────────────┘                  └──────────────┘
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::error;

use crate::app::topics::{MAX_TOPIC_LEN, TopicString};
use crate::error::{self, CommsError};

/// Longest inbound payload kept; the rest is dropped.
pub const MAX_PAYLOAD_LEN: usize = 128;

/// Queue depth.
pub const EVENT_QUEUE_CAP: usize = 16;

/// Slots inbound messages never take: one connect, four acks, one
/// disconnect.
pub const CONTROL_RESERVE: usize = 6;

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: TopicString,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD_LEN>,
    /// The payload was longer than [`MAX_PAYLOAD_LEN`].
    pub truncated: bool,
}

impl InboundMessage {
    /// `None` if the topic does not fit. Oversized payloads are cut.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        if topic.len() > MAX_TOPIC_LEN {
            return None;
        }
        let mut t = TopicString::new();
        t.push_str(topic).ok()?;

        let keep = payload.len().min(MAX_PAYLOAD_LEN);
        let mut p = heapless::Vec::new();
        p.extend_from_slice(&payload[..keep]).ok()?;

        Some(Self {
            topic: t,
            payload: p,
            truncated: payload.len() > MAX_PAYLOAD_LEN,
        })
    }
}

/// Everything the broker client reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    /// Result of a subscribe request; `Err` carries the client code.
    SubscribeAck(Result<(), i32>),
    UnsubscribeAck(Result<(), i32>),
    /// Asynchronous client error (failed publish, socket error).
    Error(i32),
    Message(InboundMessage),
}

impl TransportEvent {
    /// Link and ack events. Losing one leaves the link bookkeeping wrong.
    pub fn is_control(&self) -> bool {
        !matches!(self, Self::Message(_) | Self::Error(_))
    }
}

/// Bounded MPSC queue of transport events.
pub struct EventQueue {
    inner: Channel<CriticalSectionRawMutex, TransportEvent, EVENT_QUEUE_CAP>,
    control_lost: AtomicBool,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
            control_lost: AtomicBool::new(false),
        }
    }

    /// Returns `false` if the event was dropped.
    pub fn push(&self, event: TransportEvent) -> bool {
        if !event.is_control() {
            if self.inner.len() >= EVENT_QUEUE_CAP - CONTROL_RESERVE {
                return false;
            }
            return self.inner.try_send(event).is_ok();
        }

        match self.inner.try_send(event) {
            Ok(()) => true,
            Err(_) => {
                error!("Event queue full, control event lost");
                self.control_lost.store(true, Ordering::Release);
                false
            }
        }
    }

    pub fn pop(&self) -> Option<TransportEvent> {
        self.inner.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Pop events in FIFO order until `handler` fails or the queue empties.
    ///
    /// Fails without handling anything once a control event has been lost.
    pub fn try_drain(
        &self,
        mut handler: impl FnMut(TransportEvent) -> error::Result<()>,
    ) -> error::Result<()> {
        if self.control_lost.load(Ordering::Acquire) {
            return Err(CommsError::EventsLost.into());
        }
        while let Some(event) = self.pop() {
            handler(event)?;
        }
        Ok(())
    }
}

/// Queue shared between the broker callback and the main loop.
pub static TRANSPORT_EVENTS: EventQueue = EventQueue::new();
