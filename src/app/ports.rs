//! Port traits: the hexagonal boundary between gate logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GateService (domain)
//! ```
//!
//! Driven adapters (ranger, annunciator, broker client, clock, storage)
//! implement these traits. The [`GateService`](super::service::GateService)
//! consumes them via generics, so the domain core never touches hardware
//! or the network directly.

use crate::config::GateConfig;
use crate::fsm::context::{Glyph, Icon, Rgb, Sound};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// Run one filtered sampling round. Always in `2..=400`.
    fn read_distance_cm(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Annunciator port (driven adapter: domain → LED, display, buzzer)
// ───────────────────────────────────────────────────────────────

/// Everything the gate shows or plays. Implementations own the rendering;
/// the domain only says what.
pub trait AnnunciatorPort {
    fn set_led(&mut self, colour: Rgb);

    fn show_icon(&mut self, icon: Icon);

    fn show_glyph(&mut self, glyph: Glyph);

    fn clear_matrix(&mut self);

    /// Play a sound to completion.
    fn play_sound(&mut self, sound: Sound);

    /// LED off, matrix cleared, buzzers silent.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Message port (driven adapter: domain ↔ broker client)
// ───────────────────────────────────────────────────────────────

/// Delivery guarantee for a publish or subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

/// Request-side broker primitives. Completions (acks, inbound messages,
/// link changes) come back asynchronously as
/// [`TransportEvent`](crate::events::TransportEvent)s.
pub trait MessagePort {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), TransportError>;

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), TransportError>;

    fn unsubscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Close the broker link. A `Disconnected` event follows.
    fn disconnect(&mut self) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic time since boot.
pub trait TimePort {
    fn uptime_us(&self) -> u64;

    fn uptime_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }

    fn uptime_secs(&self) -> u64 {
        self.uptime_us() / 1_000_000
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists gate configuration.
///
/// Implementations MUST call [`GateConfig::validate`] before persisting.
pub trait ConfigPort {
    /// Returns [`GateConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<GateConfig, ConfigError>;

    fn save(&self, config: &GateConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the publisher)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the [`Scheduler`](crate::scheduler::Scheduler)
/// invokes when a telemetry job comes due.
pub trait SchedulerDelegate {
    fn on_schedule_fired(&mut self, label: &str, job: TelemetryJob);
}

/// The periodic telemetry jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryJob {
    /// Publish the filtered distance if it changed.
    Distance,
    /// Publish the status string for the current state.
    Status,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`MessagePort`] requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The link is down or already closed.
    NotConnected,
    /// The client rejected the request (platform error code).
    Rejected(i32),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Rejected(rc) => write!(f, "request rejected (rc={})", rc),
        }
    }
}
