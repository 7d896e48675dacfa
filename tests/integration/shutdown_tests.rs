//! Shutdown handshake and broker link lifecycle.

use smartgate::app::events::AppEvent;
use smartgate::app::service::LinkState;
use smartgate::config::GateConfig;
use smartgate::error::{CommsError, Error, LedgerError};
use smartgate::events::TransportEvent;

use super::mock_hw::{MockHardware, Rig};

fn connected() -> Rig {
    Rig::connected(GateConfig::default(), MockHardware::at(100))
}

#[test]
fn exit_unsubscribes_everything_then_disconnects_once() {
    let mut rig = connected();
    rig.send("/exit", "").unwrap();

    assert_eq!(rig.broker.unsubscribed, vec!["/gate", "/print", "/ping", "/exit"]);
    assert_eq!(rig.broker.disconnects, 1);
    assert_eq!(rig.service.ledger().active(), 0);
    assert!(rig.service.ledger().disconnect_requested());

    assert_eq!(rig.service.link_state(), LinkState::Closed);
    assert!(!rig.service.is_running());

    assert_eq!(rig.sink.count(&AppEvent::ShutdownRequested), 1);
    assert_eq!(rig.sink.count(&AppEvent::DisconnectRequested), 1);
    assert_eq!(rig.sink.count(&AppEvent::LinkClosed), 1);
}

#[test]
fn disconnect_waits_for_the_last_ack() {
    let mut rig = connected();
    rig.broker.deliver("/exit", "");

    // Message plus three of the four acks.
    for _ in 0..4 {
        let event = rig.broker.pending.pop_front().unwrap();
        rig.service
            .handle_transport_event(event, &mut rig.broker, &rig.clock, &mut rig.sink)
            .unwrap();
    }
    assert_eq!(rig.service.ledger().active(), 1);
    assert_eq!(rig.broker.disconnects, 0);
    assert!(rig.service.is_running());

    rig.pump().unwrap();
    assert_eq!(rig.broker.disconnects, 1);
}

#[test]
fn fifth_unsubscribe_ack_is_fatal() {
    let mut rig = connected();
    rig.send("/exit", "").unwrap();

    rig.broker
        .pending
        .push_back(TransportEvent::UnsubscribeAck(Ok(())));
    assert_eq!(rig.pump(), Err(Error::Ledger(LedgerError::Underflow)));
    assert_eq!(rig.broker.disconnects, 1);
}

#[test]
fn second_exit_is_ignored() {
    let mut rig = connected();
    rig.broker.deliver("/exit", "");
    rig.broker.deliver("/exit", "now");
    rig.pump().unwrap();

    assert_eq!(rig.broker.unsubscribed.len(), 4);
    assert_eq!(rig.broker.disconnects, 1);
    assert_eq!(rig.sink.count(&AppEvent::ShutdownRequested), 1);
}

#[test]
fn unsubscribe_ack_failure_is_fatal() {
    let mut rig = connected();
    rig.broker
        .pending
        .push_back(TransportEvent::UnsubscribeAck(Err(3)));
    assert_eq!(rig.pump(), Err(Error::Comms(CommsError::UnsubscribeFailed)));
}

#[test]
fn ack_without_subscription_is_fatal() {
    let mut rig = Rig::with_defaults(100);
    rig.broker
        .pending
        .push_back(TransportEvent::UnsubscribeAck(Ok(())));
    assert_eq!(rig.pump(), Err(Error::Ledger(LedgerError::Underflow)));
}

#[test]
fn disconnect_before_connect_is_fatal() {
    let mut rig = Rig::with_defaults(100);
    rig.broker.pending.push_back(TransportEvent::Disconnected);
    assert_eq!(rig.pump(), Err(Error::Comms(CommsError::BrokerConnectFailed)));
}

#[test]
fn link_loss_ends_the_loop_and_stops_telemetry() {
    let mut rig = connected();
    rig.broker.pending.push_back(TransportEvent::Disconnected);
    rig.pump().unwrap();

    assert!(!rig.service.is_running());
    assert_eq!(rig.sink.count(&AppEvent::LinkClosed), 1);

    let before = rig.broker.published.len();
    rig.tick();
    rig.poll_telemetry();
    rig.clock.advance_ms(5_000);
    rig.poll_telemetry();
    assert_eq!(rig.broker.published.len(), before);
}

#[test]
fn failed_disconnect_still_closes_the_link() {
    let mut rig = connected();
    rig.broker.connected = false;
    rig.send("/exit", "").unwrap();

    assert_eq!(rig.broker.disconnects, 0);
    assert_eq!(rig.service.link_state(), LinkState::Closed);
    assert!(!rig.service.is_running());
    assert_eq!(rig.sink.count(&AppEvent::LinkClosed), 1);
}

#[test]
fn reconnect_after_link_loss_is_not_followed() {
    let mut rig = connected();
    rig.broker.pending.push_back(TransportEvent::Disconnected);
    rig.broker.pending.push_back(TransportEvent::Connected);
    rig.pump().unwrap();

    assert_eq!(rig.service.link_state(), LinkState::Closed);
    assert!(!rig.service.is_running());
    assert_eq!(rig.broker.subscribed.len(), 4);
    assert_eq!(rig.service.ledger().active(), 4);
    assert_eq!(rig.sink.count(&AppEvent::LinkUp), 1);

    // The ledger still balances, so a late exit disconnects exactly once.
    rig.send("/exit", "").unwrap();
    assert_eq!(rig.service.ledger().active(), 0);
    assert_eq!(rig.broker.disconnects, 1);
}

#[test]
fn duplicate_connected_does_not_resubscribe() {
    let mut rig = connected();
    rig.broker.pending.push_back(TransportEvent::Connected);
    rig.pump().unwrap();

    assert_eq!(rig.broker.subscribed.len(), 4);
    assert_eq!(rig.service.ledger().active(), 4);

    rig.send("/exit", "").unwrap();
    assert_eq!(rig.broker.disconnects, 1);
    assert!(!rig.service.is_running());
}
