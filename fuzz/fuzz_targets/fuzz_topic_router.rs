//! Fuzz target: `TopicNamer::strip` + `Channel::from_topic`
//!
//! Routes arbitrary topics through both naming modes. A topic that routes
//! to a channel must be exactly that channel's broker topic.
//!
//! cargo fuzz run fuzz_topic_router

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartgate::app::commands::Channel;
use smartgate::app::topics::{ClientId, TopicNamer};

fuzz_target!(|topic: &str| {
    let mut id = ClientId::new();
    let _ = id.push_str("picocafe");

    for unique in [false, true] {
        let namer = TopicNamer::new(id.clone(), unique);
        if let Some(channel) = namer.strip(topic).and_then(Channel::from_topic) {
            assert_eq!(namer.full(channel.topic()).as_str(), topic);
        }
    }
});
