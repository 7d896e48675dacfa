//! Application core: pure domain logic, zero I/O.
//!
//! The gate's business rules live here: command decoding, topic naming,
//! the shutdown handshake and the service that ties them to the FSM and
//! the telemetry scheduler. All interaction with hardware and the broker
//! happens through **port traits** defined in [`ports`].

pub mod commands;
pub mod events;
pub mod ledger;
pub mod ports;
pub mod service;
pub mod topics;
