//! Inbound commands and the payload decoder.
//!
//! Each subscribed [`Channel`] carries one kind of command. Payloads are
//! raw bytes from the broker; decoding never allocates and never fails
//! loudly. Anything unrecognised decodes to `None`.

/// Longest `print` text kept; longer payloads are truncated.
pub const MAX_PRINT_LEN: usize = 128;

pub type PrintText = heapless::String<MAX_PRINT_LEN>;

/// The four command channels the gate subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Gate,
    Print,
    Ping,
    Exit,
}

impl Channel {
    /// Subscription order.
    pub const ALL: [Self; 4] = [Self::Gate, Self::Print, Self::Ping, Self::Exit];

    /// Un-prefixed topic name.
    pub fn topic(self) -> &'static str {
        match self {
            Self::Gate => "/gate",
            Self::Print => "/print",
            Self::Ping => "/ping",
            Self::Exit => "/exit",
        }
    }

    /// Exact match on an un-prefixed topic name.
    pub fn from_topic(topic: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.topic() == topic)
    }
}

/// Commands that the broker can send into the gate core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateCommand {
    Open,
    Close,
    /// Log the text verbatim.
    Print(PrintText),
    /// Reply with uptime seconds.
    Ping,
    /// Unsubscribe everything and disconnect.
    Exit,
}

/// Decode a payload received on `channel`.
pub fn decode(channel: Channel, payload: &[u8]) -> Option<GateCommand> {
    match channel {
        Channel::Gate => decode_gate(payload),
        Channel::Print => Some(GateCommand::Print(bounded_text(payload))),
        Channel::Ping => Some(GateCommand::Ping),
        Channel::Exit => Some(GateCommand::Exit),
    }
}

/// `open`/`1` and `close`/`0`; word forms are case-insensitive.
pub fn decode_gate(payload: &[u8]) -> Option<GateCommand> {
    if payload.eq_ignore_ascii_case(b"open") || payload == b"1" {
        Some(GateCommand::Open)
    } else if payload.eq_ignore_ascii_case(b"close") || payload == b"0" {
        Some(GateCommand::Close)
    } else {
        None
    }
}

/// Longest valid UTF-8 prefix of `payload` that fits in [`PrintText`].
fn bounded_text(payload: &[u8]) -> PrintText {
    let text = match core::str::from_utf8(payload) {
        Ok(s) => s,
        Err(e) => core::str::from_utf8(&payload[..e.valid_up_to()]).unwrap_or_default(),
    };

    let mut out = PrintText::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
