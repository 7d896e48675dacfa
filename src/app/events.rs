//! Outbound application events.
//!
//! The [`GateService`](super::service::GateService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them; on target they go to the serial log.

use crate::fsm::GateState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started(GateState),

    StateChanged { from: GateState, to: GateState },

    /// Broker link is up and subscriptions are requested.
    LinkUp,

    /// Broker link closed after it had been up.
    LinkClosed,

    /// An `exit` command started the shutdown handshake.
    ShutdownRequested,

    /// Every subscription is gone; the link is being closed.
    DisconnectRequested,

    /// Status telemetry was published.
    Telemetry(TelemetryData),
}

/// A point-in-time snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryData {
    pub state: GateState,
    pub distance_cm: u16,
}
