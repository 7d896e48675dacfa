//! Topic naming.
//!
//! With unique topics enabled every topic is prefixed with `/{client_id}`,
//! so several gates can share a broker. Outbound names are built with
//! [`TopicNamer::full`]; inbound topics are mapped back with
//! [`TopicNamer::strip`] before routing.

use core::fmt::Write;

pub const MAX_TOPIC_LEN: usize = 100;

pub type TopicString = heapless::String<MAX_TOPIC_LEN>;
pub type ClientId = heapless::String<24>;

// ── Outbound topics ──

pub const DISTANCE: &str = "/distance";
pub const STATUS: &str = "/status";
pub const GATE_STATE: &str = "/gate/state";
pub const UPTIME: &str = "/uptime";
/// Last-will topic: retained `"0"` from the broker on unexpected loss,
/// retained `"1"` from us on connect.
pub const ONLINE: &str = "/online";

#[derive(Debug, Clone)]
pub struct TopicNamer {
    client_id: ClientId,
    unique: bool,
}

impl TopicNamer {
    pub fn new(client_id: ClientId, unique: bool) -> Self {
        Self { client_id, unique }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Broker topic for `name`. Output that would exceed
    /// [`MAX_TOPIC_LEN`] is cut short.
    pub fn full(&self, name: &str) -> TopicString {
        let mut out = TopicString::new();
        // Overflow leaves a cut topic, which the broker treats as any other.
        if self.unique {
            let _ = write!(out, "/{}{}", self.client_id, name);
        } else {
            let _ = out.push_str(name);
        }
        out
    }

    /// Map a broker topic back to its un-prefixed name. `None` when unique
    /// topics are on and the prefix is missing.
    pub fn strip<'a>(&self, topic: &'a str) -> Option<&'a str> {
        if !self.unique {
            return Some(topic);
        }
        topic
            .strip_prefix('/')
            .and_then(|t| t.strip_prefix(self.client_id.as_str()))
            .filter(|rest| rest.starts_with('/'))
    }
}
