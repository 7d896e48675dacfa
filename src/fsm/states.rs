//! Concrete state handler functions and table builder.
//!
//! ```text
//!             [distance ≤ threshold]
//!   IDLE ───────────────────────────▶ PRESENCE_DETECTED
//!    ▲  ◀───────────────────────────     │     ▲
//!    │        [distance > threshold]     │     │
//!    │                            [open] │     │ [close, near]
//!    │ [close, far]                      ▼     │
//!    └────────────────────────────────── OPEN ─┘
//!
//!  Any state ──[open]──▶ OPEN
//! ```
//!
//! Distance never moves the gate out of `Open`; only a close command does.
//! Command-driven transitions are applied by the service through
//! [`Fsm::force_transition`](super::Fsm::force_transition).

use super::context::{FsmContext, Glyph, Icon, IndicatorCommands, Rgb};
use super::{GateState, StateDescriptor};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; GateState::COUNT] {
    [
        StateDescriptor {
            id: GateState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: GateState::PresenceDetected,
            name: "PresenceDetected",
            on_enter: Some(presence_enter),
            on_exit: Some(presence_exit),
            on_update: presence_update,
        },
        StateDescriptor {
            id: GateState::Open,
            name: "Open",
            on_enter: Some(open_enter),
            on_exit: None,
            on_update: open_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: gate closed, nobody in range
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.indicators = IndicatorCommands {
        led: Rgb::BLUE,
        icon: Icon::ClosedLock,
        glyph: Glyph::Blank,
        presence_alarm: false,
    };
}

fn idle_update(ctx: &mut FsmContext) -> Option<GateState> {
    if ctx.presence() {
        info!("IDLE: presence at {} cm", ctx.distance_cm);
        return Some(GateState::PresenceDetected);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  PRESENCE_DETECTED: someone at the gate, waiting for a command
// ═══════════════════════════════════════════════════════════════════════════

fn presence_enter(ctx: &mut FsmContext) {
    ctx.indicators = IndicatorCommands {
        led: Rgb::RED,
        icon: Icon::Alert,
        glyph: Glyph::Cross,
        presence_alarm: true,
    };
}

fn presence_exit(ctx: &mut FsmContext) {
    ctx.indicators.presence_alarm = false;
}

fn presence_update(ctx: &mut FsmContext) -> Option<GateState> {
    if !ctx.presence() {
        info!("PRESENCE: cleared at {} cm", ctx.distance_cm);
        return Some(GateState::Idle);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  OPEN: access granted
// ═══════════════════════════════════════════════════════════════════════════

fn open_enter(ctx: &mut FsmContext) {
    ctx.indicators = IndicatorCommands {
        led: Rgb::GREEN,
        icon: Icon::OpenLock,
        glyph: Glyph::Check,
        presence_alarm: false,
    };
}

fn open_update(_ctx: &mut FsmContext) -> Option<GateState> {
    None
}
