//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the latest filtered distance, the indicator outputs the
//! annunciator should show, the outbox of one-shot effects, timing and
//! configuration. The service owns it; nothing else mutates gate state.

use crate::config::GateConfig;
use crate::sensors::FAR_DISTANCE_CM;

// ---------------------------------------------------------------------------
// Indicator outputs (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

/// RGB indicator colour, each channel on/off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: bool,
    pub g: bool,
    pub b: bool,
}

impl Rgb {
    pub const OFF: Self = Self { r: false, g: false, b: false };
    pub const RED: Self = Self { r: true, g: false, b: false };
    pub const GREEN: Self = Self { r: false, g: true, b: false };
    pub const BLUE: Self = Self { r: false, g: false, b: true };
}

/// Icon on the status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    ClosedLock,
    Alert,
    OpenLock,
}

/// Glyph on the LED matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Blank,
    Cross,
    Check,
}

/// One-shot and repeating sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Startup,
    GateOpen,
    GateClose,
    PresenceAlarm,
}

/// What the annunciator should be showing for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorCommands {
    pub led: Rgb,
    pub icon: Icon,
    pub glyph: Glyph,
    /// Sound the presence alarm on every loop iteration.
    pub presence_alarm: bool,
}

impl Default for IndicatorCommands {
    fn default() -> Self {
        Self {
            led: Rgb::OFF,
            icon: Icon::ClosedLock,
            glyph: Glyph::Blank,
            presence_alarm: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Effect outbox
// ---------------------------------------------------------------------------

/// Side effects raised by a transition and performed once by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    PlayOpenSound,
    PlayCloseSound,
    ClearMatrix,
}

const OUTBOX_CAP: usize = 4;

/// Pending one-shot effects. Each effect is held at most once until drained.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: heapless::Vec<Effect, OUTBOX_CAP>,
}

impl Outbox {
    /// Queue `effect`. Returns `false` if it was already pending.
    pub fn raise(&mut self, effect: Effect) -> bool {
        if self.pending.contains(&effect) {
            return false;
        }
        self.pending.push(effect).is_ok()
    }

    pub fn is_pending(&self, effect: Effect) -> bool {
        self.pending.contains(&effect)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending effect in the order raised, leaving the outbox empty.
    pub fn drain(&mut self) -> heapless::Vec<Effect, OUTBOX_CAP> {
        core::mem::take(&mut self.pending)
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Sensor data --
    /// Latest filtered distance (cm). Updated before each FSM tick.
    pub distance_cm: u16,

    // -- Outputs --
    pub indicators: IndicatorCommands,
    pub effects: Outbox,

    // -- Configuration --
    pub config: GateConfig,
}

impl FsmContext {
    pub fn new(config: GateConfig) -> Self {
        Self {
            distance_cm: FAR_DISTANCE_CM,
            indicators: IndicatorCommands::default(),
            effects: Outbox::default(),
            config,
        }
    }

    /// Someone is within the presence threshold.
    pub fn presence(&self) -> bool {
        self.distance_cm <= self.config.presence_threshold_cm
    }
}
