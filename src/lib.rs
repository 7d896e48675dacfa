//! SmartGate firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod scheduler;

pub mod pins;

// Hardware-facing modules. Each carries host simulations next to its
// `target_os = "espidf"` code, so the host build tests them too.
pub mod adapters;
pub mod drivers;
pub mod sensors;
