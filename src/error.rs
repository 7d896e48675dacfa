//! Unified error types for the SmartGate firmware.
//!
//! Every fatal condition in the dispatch loop funnels into [`Error`], which
//! `main` turns into an `anyhow::Error` and returns, aborting the process.
//! All variants are `Copy` so they travel through the service without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fatal operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The broker link or a subscription request failed.
    Comms(CommsError),
    /// The subscription ledger invariant was violated.
    Ledger(LedgerError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Ledger(e) => write!(f, "ledger: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    /// The broker closed the link before the first successful connect.
    BrokerConnectFailed,
    /// A subscribe request was rejected or its acknowledgement failed.
    SubscribeFailed,
    /// An unsubscribe request was rejected or its acknowledgement failed.
    UnsubscribeFailed,
    /// A link event or acknowledgement was dropped by the event queue.
    EventsLost,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::BrokerConnectFailed => write!(f, "broker connection refused"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::UnsubscribeFailed => write!(f, "unsubscribe failed"),
            Self::EventsLost => write!(f, "transport event queue overflowed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Ledger errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    /// An unsubscribe acknowledgement arrived with no active subscription.
    Underflow,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Underflow => write!(f, "subscription count would go negative"),
        }
    }
}

impl From<LedgerError> for Error {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
