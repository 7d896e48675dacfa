//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::LinkUp => info!("LINK  | up"),
            AppEvent::LinkClosed => info!("LINK  | closed"),
            AppEvent::ShutdownRequested => info!("EXIT  | unsubscribing"),
            AppEvent::DisconnectRequested => info!("EXIT  | disconnecting"),
            AppEvent::Telemetry(t) => {
                info!("TELEM | state={:?} | distance={} cm", t.state, t.distance_cm);
            }
        }
    }
}
