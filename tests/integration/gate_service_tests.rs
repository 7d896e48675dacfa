//! Integration tests for the GateService → FSM → annunciator/broker pipeline.
//!
//! These run on the host and drive the service the way the control loop
//! does: ticks for sampling, broker events for commands and acks, and
//! `poll_telemetry` for the periodic publishers.

use smartgate::app::events::{AppEvent, TelemetryData};
use smartgate::app::ports::QoS;
use smartgate::app::service::{LinkState, status_message};
use smartgate::config::GateConfig;
use smartgate::error::{CommsError, Error};
use smartgate::events::TransportEvent;
use smartgate::fsm::GateState;
use smartgate::fsm::context::{Effect, Rgb, Sound};

use super::mock_hw::{Call, MockHardware, Published, Rig};

fn connected_at(cm: u16) -> Rig {
    Rig::connected(GateConfig::default(), MockHardware::at(cm))
}

// ── Startup and connect ──────────────────────────────────────

#[test]
fn start_plays_startup_sound_and_shows_idle() {
    let rig = Rig::with_defaults(400);
    assert_eq!(rig.service.state(), GateState::Idle);
    assert_eq!(rig.hw.sounds(), vec![Sound::Startup]);
    assert_eq!(rig.hw.last_led(), Some(Rgb::BLUE));
    assert_eq!(rig.sink.events[0], AppEvent::Started(GateState::Idle));
    assert_eq!(rig.service.link_state(), LinkState::Connecting);
}

#[test]
fn connect_subscribes_all_channels_and_announces_online() {
    let rig = connected_at(400);

    assert_eq!(rig.broker.subscribed, vec!["/gate", "/print", "/ping", "/exit"]);
    assert_eq!(rig.service.ledger().active(), 4);
    assert_eq!(rig.service.link_state(), LinkState::Connected);
    assert_eq!(
        rig.broker.published[0],
        Published {
            topic: "/online".into(),
            payload: "1".into(),
            qos: QoS::AtLeastOnce,
            retain: true,
        }
    );
    assert_eq!(rig.sink.count(&AppEvent::LinkUp), 1);
}

#[test]
fn subscribe_request_failure_is_fatal() {
    let mut rig = Rig::with_defaults(400);
    rig.broker.fail_subscribe = true;
    rig.broker.pending.push_back(TransportEvent::Connected);
    assert_eq!(rig.pump(), Err(Error::Comms(CommsError::SubscribeFailed)));
}

#[test]
fn subscribe_ack_failure_is_fatal() {
    let mut rig = Rig::with_defaults(400);
    rig.broker.pending.push_back(TransportEvent::SubscribeAck(Err(5)));
    assert_eq!(rig.pump(), Err(Error::Comms(CommsError::SubscribeFailed)));
}

#[test]
fn client_error_event_is_not_fatal() {
    let mut rig = connected_at(400);
    rig.broker.pending.push_back(TransportEvent::Error(-1));
    assert!(rig.pump().is_ok());
    assert!(rig.service.is_running());
}

// ── Distance-driven transitions ──────────────────────────────

#[test]
fn idle_to_presence_and_back() {
    let mut rig = Rig::with_defaults(10);
    rig.tick();
    assert_eq!(rig.service.state(), GateState::PresenceDetected);
    assert_eq!(rig.hw.last_led(), Some(Rgb::RED));

    rig.hw.move_to(50);
    rig.tick();
    assert_eq!(rig.service.state(), GateState::Idle);
    assert_eq!(rig.hw.last_led(), Some(Rgb::BLUE));

    assert_eq!(
        rig.sink.count(&AppEvent::StateChanged {
            from: GateState::Idle,
            to: GateState::PresenceDetected,
        }),
        1
    );
    assert_eq!(
        rig.sink.count(&AppEvent::StateChanged {
            from: GateState::PresenceDetected,
            to: GateState::Idle,
        }),
        1
    );
}

#[test]
fn threshold_distance_counts_as_presence() {
    let mut rig = Rig::with_defaults(30);
    rig.tick();
    assert_eq!(rig.service.state(), GateState::PresenceDetected);

    rig.hw.move_to(31);
    rig.tick();
    assert_eq!(rig.service.state(), GateState::Idle);
}

#[test]
fn presence_alarm_sounds_every_iteration() {
    let mut rig = Rig::with_defaults(10);
    for _ in 0..3 {
        rig.tick();
    }
    assert_eq!(rig.hw.count_sound(Sound::PresenceAlarm), 3);

    rig.hw.move_to(200);
    rig.tick();
    rig.tick();
    assert_eq!(rig.hw.count_sound(Sound::PresenceAlarm), 3);
}

#[test]
fn scripted_approach_and_retreat() {
    let hw = MockHardware::scripted(&[200, 120, 25, 20, 35, 400]);
    let mut rig = Rig::new(GateConfig::default(), hw);

    let mut states = Vec::new();
    for _ in 0..6 {
        rig.tick();
        states.push(rig.service.state());
    }
    assert_eq!(
        states,
        vec![
            GateState::Idle,
            GateState::Idle,
            GateState::PresenceDetected,
            GateState::PresenceDetected,
            GateState::Idle,
            GateState::Idle,
        ]
    );
}

// ── Gate commands ────────────────────────────────────────────

#[test]
fn open_from_idle() {
    let mut rig = connected_at(50);
    rig.tick();
    assert_eq!(rig.service.state(), GateState::Idle);

    rig.send("/gate", "open").unwrap();
    assert_eq!(rig.service.state(), GateState::Open);
    assert!(rig.service.is_effect_pending(Effect::PlayOpenSound));
    assert_eq!(rig.broker.published_on("/gate/state"), vec!["Open"]);

    rig.tick();
    assert_eq!(rig.hw.count_sound(Sound::GateOpen), 1);
    assert!(!rig.service.is_effect_pending(Effect::PlayOpenSound));
    assert_eq!(rig.hw.last_led(), Some(Rgb::GREEN));

    // Effect fires once only.
    rig.tick();
    assert_eq!(rig.hw.count_sound(Sound::GateOpen), 1);
}

#[test]
fn open_is_left_only_by_close() {
    let mut rig = connected_at(10);
    rig.send("/gate", "1").unwrap();
    for _ in 0..5 {
        rig.tick();
    }
    assert_eq!(rig.service.state(), GateState::Open);

    rig.hw.move_to(300);
    for _ in 0..5 {
        rig.tick();
    }
    assert_eq!(rig.service.state(), GateState::Open);
}

#[test]
fn close_with_someone_near_returns_to_presence() {
    let mut rig = connected_at(10);
    rig.tick();
    rig.send("/gate", "open").unwrap();
    rig.tick();

    rig.send("/gate", "close").unwrap();
    assert_eq!(rig.service.state(), GateState::PresenceDetected);
    assert_eq!(rig.broker.published_on("/gate/state"), vec!["Open", "Close"]);
    assert!(rig.service.is_effect_pending(Effect::PlayCloseSound));
    assert!(rig.service.is_effect_pending(Effect::ClearMatrix));

    rig.hw.clear();
    rig.tick();
    assert_eq!(rig.hw.calls[0], Call::ClearMatrix);
    assert_eq!(rig.hw.calls[1], Call::Sound(Sound::GateClose));
}

#[test]
fn close_with_nobody_near_returns_to_idle() {
    let mut rig = connected_at(50);
    rig.tick();
    rig.send("/gate", "open").unwrap();
    rig.tick();

    rig.send("/gate", "0").unwrap();
    assert_eq!(rig.service.state(), GateState::Idle);
    assert_eq!(rig.broker.published_on("/gate/state"), vec!["Open", "Close"]);
}

#[test]
fn gate_payload_spellings_are_equivalent() {
    for payload in ["Open", "OPEN", "1", "open"] {
        let mut rig = connected_at(50);
        rig.tick();
        rig.send("/gate", payload).unwrap();
        assert_eq!(rig.service.state(), GateState::Open, "payload {payload:?}");
    }

    for payload in ["close", "Close", "0", "CLOSE"] {
        let mut rig = connected_at(50);
        rig.tick();
        rig.send("/gate", "open").unwrap();
        rig.send("/gate", payload).unwrap();
        assert_eq!(rig.service.state(), GateState::Idle, "payload {payload:?}");
    }
}

#[test]
fn unrecognised_gate_payload_is_ignored() {
    let mut rig = connected_at(50);
    rig.tick();
    for payload in ["maybe", "", "opened", " open", "2"] {
        rig.send("/gate", payload).unwrap();
        assert_eq!(rig.service.state(), GateState::Idle, "payload {payload:?}");
    }
    assert!(rig.broker.published_on("/gate/state").is_empty());
}

#[test]
fn publish_failure_does_not_stop_the_gate() {
    let mut rig = connected_at(50);
    rig.broker.fail_publish = true;
    rig.send("/gate", "open").unwrap();
    assert_eq!(rig.service.state(), GateState::Open);
    assert!(rig.service.is_running());
}

#[test]
fn messages_on_unknown_topics_are_ignored() {
    let mut rig = connected_at(50);
    let before = rig.broker.published.len();
    rig.send("/gate/state", "open").unwrap();
    rig.send("/weather", "1").unwrap();
    assert_eq!(rig.service.state(), GateState::Idle);
    assert_eq!(rig.broker.published.len(), before);
}

// ── Print and ping ───────────────────────────────────────────

#[test]
fn print_has_no_side_effects() {
    let mut rig = connected_at(50);
    let before = rig.broker.published.len();
    rig.send("/print", "hello gate").unwrap();
    rig.send("/print", &"x".repeat(500)).unwrap();
    assert_eq!(rig.broker.published.len(), before);
    assert_eq!(rig.service.state(), GateState::Idle);
}

#[test]
fn ping_publishes_uptime_seconds() {
    let mut rig = connected_at(50);
    rig.clock.now_us = 12_345_678;
    rig.send("/ping", "").unwrap();
    rig.clock.now_us = 3_600_000_000;
    rig.send("/ping", "whatever").unwrap();
    assert_eq!(rig.broker.published_on("/uptime"), vec!["12", "3600"]);
}

// ── Telemetry ────────────────────────────────────────────────

#[test]
fn telemetry_waits_for_connect() {
    let mut rig = Rig::with_defaults(50);
    rig.tick();
    rig.poll_telemetry();
    rig.clock.advance_ms(10_000);
    rig.poll_telemetry();
    assert!(rig.broker.published.is_empty());
}

#[test]
fn identical_distances_publish_once() {
    let mut rig = connected_at(50);
    rig.tick();

    rig.poll_telemetry();
    for _ in 0..5 {
        rig.clock.advance_ms(2_000);
        rig.tick();
        rig.poll_telemetry();
    }
    assert_eq!(rig.broker.published_on("/distance"), vec!["50"]);

    rig.hw.move_to(120);
    rig.tick();
    rig.clock.advance_ms(2_000);
    rig.poll_telemetry();
    assert_eq!(rig.broker.published_on("/distance"), vec!["50", "120"]);
}

#[test]
fn first_distance_is_always_published() {
    // Nothing in range: the far sentinel still goes out once.
    let mut rig = connected_at(400);
    rig.tick();
    rig.poll_telemetry();
    assert_eq!(rig.broker.published_on("/distance"), vec!["400"]);
}

#[test]
fn status_follows_gate_state() {
    let mut rig = connected_at(50);
    rig.tick();
    rig.poll_telemetry();

    rig.send("/gate", "open").unwrap();
    rig.clock.advance_ms(800);
    rig.poll_telemetry();

    rig.send("/gate", "close").unwrap();
    rig.hw.move_to(10);
    rig.tick();
    rig.clock.advance_ms(800);
    rig.poll_telemetry();

    assert_eq!(
        rig.broker.published_on("/status"),
        vec![
            status_message(GateState::Idle),
            status_message(GateState::Open),
            status_message(GateState::PresenceDetected),
        ]
    );
    assert!(rig.sink.events.contains(&AppEvent::Telemetry(TelemetryData {
        state: GateState::Open,
        distance_cm: 50,
    })));
}

#[test]
fn status_runs_faster_than_distance() {
    let mut rig = connected_at(50);
    let script = [50u16, 60, 70];
    for step in 0..=50u64 {
        rig.hw.move_to(script[(step / 20) as usize]);
        rig.tick();
        rig.poll_telemetry();
        rig.clock.advance_ms(100);
    }
    // 5 s of 100 ms steps from the arm point: status every 800 ms,
    // distance checks every 2 s.
    assert_eq!(rig.broker.published_on("/status").len(), 7);
    assert_eq!(rig.broker.published_on("/distance"), vec!["50", "60", "70"]);
}

// ── Unique topic mode ────────────────────────────────────────

#[test]
fn unique_topics_prefix_everything() {
    let config = GateConfig {
        unique_topics: true,
        ..GateConfig::default()
    };
    let mut rig = Rig::connected(config, MockHardware::at(50));

    assert_eq!(
        rig.broker.subscribed,
        vec![
            "/picocafe/gate",
            "/picocafe/print",
            "/picocafe/ping",
            "/picocafe/exit",
        ]
    );
    assert_eq!(rig.broker.published_on("/picocafe/online"), vec!["1"]);

    // Unprefixed topics are not ours.
    rig.send("/gate", "open").unwrap();
    assert_eq!(rig.service.state(), GateState::Idle);

    rig.send("/picocafe/gate", "open").unwrap();
    assert_eq!(rig.service.state(), GateState::Open);
    assert_eq!(rig.broker.published_on("/picocafe/gate/state"), vec!["Open"]);

    rig.tick();
    rig.poll_telemetry();
    assert_eq!(rig.broker.published_on("/picocafe/distance"), vec!["50"]);
    assert!(rig.broker.published_on("/distance").is_empty());
}
