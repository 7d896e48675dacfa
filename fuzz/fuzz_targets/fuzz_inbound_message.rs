//! Fuzz target: inbound message → command decoder
//!
//! Splits the input into a topic and a payload, builds an
//! `InboundMessage` and decodes it on every channel. Asserts that the
//! fixed buffers hold and that `print` text never outgrows its bound.
//!
//! cargo fuzz run fuzz_inbound_message

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartgate::app::commands::{self, Channel, GateCommand, MAX_PRINT_LEN};
use smartgate::events::{InboundMessage, MAX_PAYLOAD_LEN};

fuzz_target!(|data: &[u8]| {
    // First byte picks where the topic ends.
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());
    let (topic, payload) = rest.split_at(split);
    let Ok(topic) = core::str::from_utf8(topic) else {
        return;
    };

    let Some(msg) = InboundMessage::new(topic, payload) else {
        return;
    };
    assert!(msg.payload.len() <= MAX_PAYLOAD_LEN);
    assert_eq!(msg.truncated, payload.len() > MAX_PAYLOAD_LEN);

    for channel in Channel::ALL {
        match commands::decode(channel, &msg.payload) {
            Some(GateCommand::Print(text)) => assert!(text.len() <= MAX_PRINT_LEN),
            Some(GateCommand::Open) | Some(GateCommand::Close) => {
                assert_eq!(channel, Channel::Gate);
                assert!(msg.payload.len() <= 5);
            }
            _ => {}
        }
    }
});
