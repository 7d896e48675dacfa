//! Subscription bookkeeping for the shutdown handshake.
//!
//! The gate counts acknowledged subscriptions. An `exit` command starts
//! unsubscribing everything; once the count is back to zero the link is
//! closed, exactly once.

use crate::error::LedgerError;

/// What the caller should do after an unsubscribe acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAction {
    None,
    Disconnect,
}

#[derive(Debug, Default)]
pub struct SubscriptionLedger {
    active: u8,
    stop_requested: bool,
    disconnect_requested: bool,
}

impl SubscriptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_subscribed(&mut self) {
        self.active = self.active.saturating_add(1);
    }

    /// Mark shutdown as requested. Returns `false` if it already was.
    pub fn request_stop(&mut self) -> bool {
        if self.stop_requested {
            return false;
        }
        self.stop_requested = true;
        true
    }

    /// Count one unsubscribe acknowledgement.
    ///
    /// More acks than subscriptions is a protocol violation.
    pub fn on_unsubscribed(&mut self) -> Result<LedgerAction, LedgerError> {
        self.active = self.active.checked_sub(1).ok_or(LedgerError::Underflow)?;

        if self.active == 0 && self.stop_requested && !self.disconnect_requested {
            self.disconnect_requested = true;
            return Ok(LedgerAction::Disconnect);
        }
        Ok(LedgerAction::None)
    }

    pub fn active(&self) -> u8 {
        self.active
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    pub fn disconnect_requested(&self) -> bool {
        self.disconnect_requested
    }
}
