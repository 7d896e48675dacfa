//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                    │
//! │  ┌──────────────────┬──────────┬──────────┬───────────────────┐ │
//! │  │ GateState        │ on_enter │ on_exit  │ on_update         │ │
//! │  ├──────────────────┼──────────┼──────────┼───────────────────┤ │
//! │  │ Idle             │ fn(ctx)  │ -        │ fn(ctx)->Option<> │ │
//! │  │ PresenceDetected │ fn(ctx)  │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ Open             │ fn(ctx)  │ -        │ fn(ctx)->Option<> │ │
//! │  └──────────────────┴──────────┴──────────┴───────────────────┘ │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next. Commands bypass `on_update` via
//! [`Fsm::force_transition`].

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// The three access states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GateState {
    Idle = 0,
    PresenceDetected = 1,
    Open = 2,
}

impl GateState {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert an index back to `GateState`. Out-of-range indices map to
    /// `Idle` in release builds.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::PresenceDetected,
            2 => Self::Open,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut FsmContext);

/// Per-tick update handler. Returns `Some(next)` to transition.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<GateState>;

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: GateState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `GateState as usize`.
    table: [StateDescriptor; GateState::COUNT],
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; GateState::COUNT], initial: GateState) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one sampling round.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        if let Some(next_id) = (self.table[self.current].on_update)(ctx) {
            self.transition(next_id, ctx);
        }
    }

    /// Jump to `next` immediately (command-driven). A no-op when already
    /// there, so `on_enter` is not re-run.
    pub fn force_transition(&mut self, next: GateState, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> GateState {
        GateState::from_index(self.current)
    }

    fn transition(&mut self, next_id: GateState, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
