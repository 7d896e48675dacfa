//! Application service: the hexagonal core.
//!
//! [`GateService`] owns the FSM, its context, the telemetry scheduler and
//! the subscription ledger. All I/O flows through port traits injected at
//! call sites, so the whole service runs against mock adapters in tests.
//!
//! ```text
//!    SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                   │       GateService        │
//! AnnunciatorPort ◀─│ FSM · Scheduler · Ledger │─▶ MessagePort
//!                   └──────────────────────────┘
//!                        ▲ TransportEvent
//! ```

use core::fmt::Write;

use log::{debug, info, warn};

use crate::config::GateConfig;
use crate::error::{self, CommsError};
use crate::events::{InboundMessage, TransportEvent};
use crate::fsm::context::{Effect, FsmContext, IndicatorCommands, Sound};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, GateState};
use crate::scheduler::{MAX_SCHEDULES, Scheduler};

use super::commands::{self, Channel, GateCommand};
use super::events::{AppEvent, TelemetryData};
use super::ledger::{LedgerAction, SubscriptionLedger};
use super::ports::{
    AnnunciatorPort, EventSink, MessagePort, QoS, SchedulerDelegate, SensorPort, TelemetryJob,
    TimePort,
};
use super::topics::{self, ClientId, TopicNamer};

/// Commands and telemetry all travel at least once.
const QOS: QoS = QoS::AtLeastOnce;

/// Fixed `/status` text for each state.
pub fn status_message(state: GateState) -> &'static str {
    match state {
        GateState::Idle => "Gate closed - no presence detected",
        GateState::PresenceDetected => "Presence detected - awaiting action",
        GateState::Open => "Gate open - access granted",
    }
}

/// Where the broker link is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Waiting for the first `Connected`.
    Connecting,
    Connected,
    /// The link went down after being up. The service is finished.
    Closed,
}

// ───────────────────────────────────────────────────────────────
// GateService
// ───────────────────────────────────────────────────────────────

pub struct GateService {
    fsm: Fsm,
    ctx: FsmContext,
    scheduler: Scheduler,
    ledger: SubscriptionLedger,
    topics: TopicNamer,
    link: LinkState,
    /// Last value sent on `/distance`; `None` until the first publish.
    last_published_cm: Option<u16>,
}

impl GateService {
    /// Construct the service. Does **not** start the FSM; call
    /// [`start`](Self::start) next.
    pub fn new(config: GateConfig, client_id: ClientId) -> Self {
        let scheduler = Scheduler::telemetry(&config);
        let topics = TopicNamer::new(client_id, config.unique_topics);
        Self {
            fsm: Fsm::new(build_state_table(), GateState::Idle),
            ctx: FsmContext::new(config),
            scheduler,
            ledger: SubscriptionLedger::new(),
            topics,
            link: LinkState::Connecting,
            last_published_cm: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Play the startup sound and enter `Idle`.
    pub fn start(&mut self, hw: &mut impl AnnunciatorPort, sink: &mut impl EventSink) {
        hw.play_sound(Sound::Startup);
        self.fsm.start(&mut self.ctx);
        self.apply_indicators(hw);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("GateService started in {:?}", self.fsm.current_state());
    }

    /// `false` once the broker link has closed.
    pub fn is_running(&self) -> bool {
        self.link != LinkState::Closed
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One loop iteration: sample → pending effects → FSM → indicators.
    ///
    /// `hw` satisfies both [`SensorPort`] and [`AnnunciatorPort`], which
    /// avoids a double mutable borrow while keeping the port boundary
    /// explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + AnnunciatorPort),
        sink: &mut impl EventSink,
    ) {
        let prev_state = self.fsm.current_state();

        // 1. Filtered distance
        self.ctx.distance_cm = hw.read_distance_cm();
        debug!("Distance: {} cm", self.ctx.distance_cm);

        // 2. One-shot effects raised by commands since the last iteration
        for effect in self.ctx.effects.drain() {
            match effect {
                Effect::ClearMatrix => hw.clear_matrix(),
                Effect::PlayOpenSound => hw.play_sound(Sound::GateOpen),
                Effect::PlayCloseSound => hw.play_sound(Sound::GateClose),
            }
        }

        // 3. Distance-driven transitions
        self.fsm.tick(&mut self.ctx);

        // 4. Indicators for whatever state we are in now
        self.apply_indicators(hw);

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Transport events ──────────────────────────────────────

    /// Dispatch one event from the broker client.
    ///
    /// Returns `Err` for the fatal cases: refused connection, failed
    /// subscribe or unsubscribe, and more unsubscribe acks than
    /// subscriptions.
    pub fn handle_transport_event(
        &mut self,
        event: TransportEvent,
        transport: &mut impl MessagePort,
        clock: &impl TimePort,
        sink: &mut impl EventSink,
    ) -> error::Result<()> {
        match event {
            // The ledger counts one session's subscriptions; a reconnect by
            // the client after the link closed is not followed.
            TransportEvent::Connected if self.link != LinkState::Connecting => {
                warn!("Broker reconnect ignored (link {:?})", self.link);
            }
            TransportEvent::Connected => self.on_connected(transport, clock, sink)?,

            TransportEvent::Disconnected => {
                if self.link == LinkState::Connecting {
                    return Err(CommsError::BrokerConnectFailed.into());
                }
                if self.link == LinkState::Connected {
                    info!("Broker link closed");
                    self.scheduler.disarm();
                    self.link = LinkState::Closed;
                    sink.emit(&AppEvent::LinkClosed);
                }
            }

            TransportEvent::SubscribeAck(Ok(())) => {
                self.ledger.on_subscribed();
                debug!("Subscribed ({} active)", self.ledger.active());
            }
            TransportEvent::SubscribeAck(Err(rc)) => {
                warn!("Subscribe ack failed (rc={})", rc);
                return Err(CommsError::SubscribeFailed.into());
            }

            TransportEvent::UnsubscribeAck(Ok(())) => {
                if self.ledger.on_unsubscribed()? == LedgerAction::Disconnect {
                    self.close_link(transport, sink);
                }
            }
            TransportEvent::UnsubscribeAck(Err(rc)) => {
                warn!("Unsubscribe ack failed (rc={})", rc);
                return Err(CommsError::UnsubscribeFailed.into());
            }

            TransportEvent::Error(rc) => {
                warn!("Broker client error (rc={})", rc);
            }

            TransportEvent::Message(msg) => self.on_message(&msg, transport, clock, sink)?,
        }
        Ok(())
    }

    fn on_connected(
        &mut self,
        transport: &mut impl MessagePort,
        clock: &impl TimePort,
        sink: &mut impl EventSink,
    ) -> error::Result<()> {
        info!("Broker connected as '{}'", self.topics.client_id());
        self.link = LinkState::Connected;

        for channel in Channel::ALL {
            let topic = self.topics.full(channel.topic());
            if let Err(e) = transport.subscribe(&topic, QOS) {
                warn!("Subscribe to {} failed: {}", topic, e);
                return Err(CommsError::SubscribeFailed.into());
            }
        }

        let online = self.topics.full(topics::ONLINE);
        if let Err(e) = transport.publish(&online, b"1", QOS, true) {
            warn!("Publish to {} failed: {}", online, e);
        }

        self.scheduler.arm(clock.uptime_ms());
        sink.emit(&AppEvent::LinkUp);
        Ok(())
    }

    fn on_message(
        &mut self,
        msg: &InboundMessage,
        transport: &mut impl MessagePort,
        clock: &impl TimePort,
        sink: &mut impl EventSink,
    ) -> error::Result<()> {
        let Some(channel) = self
            .topics
            .strip(&msg.topic)
            .and_then(Channel::from_topic)
        else {
            debug!("Ignoring message on {}", msg.topic);
            return Ok(());
        };

        if msg.truncated {
            warn!("Payload on {} truncated to {} bytes", msg.topic, msg.payload.len());
        }

        match commands::decode(channel, &msg.payload) {
            Some(cmd) => self.handle_command(cmd, transport, clock, sink),
            None => {
                debug!("Unrecognised payload on {}", msg.topic);
                Ok(())
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a decoded command. Gate commands take effect immediately;
    /// their sounds play on the next [`tick`](Self::tick).
    pub fn handle_command(
        &mut self,
        cmd: GateCommand,
        transport: &mut impl MessagePort,
        clock: &impl TimePort,
        sink: &mut impl EventSink,
    ) -> error::Result<()> {
        match cmd {
            GateCommand::Open => {
                self.ctx.effects.raise(Effect::PlayOpenSound);
                self.force_state(GateState::Open, sink);
                self.publish(transport, topics::GATE_STATE, b"Open");
            }
            GateCommand::Close => {
                self.ctx.effects.raise(Effect::ClearMatrix);
                self.ctx.effects.raise(Effect::PlayCloseSound);
                let target = if self.ctx.presence() {
                    GateState::PresenceDetected
                } else {
                    GateState::Idle
                };
                self.force_state(target, sink);
                self.publish(transport, topics::GATE_STATE, b"Close");
            }
            GateCommand::Print(text) => {
                info!(target: "smartgate::print", "{}", text);
            }
            GateCommand::Ping => {
                // 20 bytes hold any u64.
                let mut payload: heapless::String<20> = heapless::String::new();
                let _ = write!(payload, "{}", clock.uptime_secs());
                self.publish(transport, topics::UPTIME, payload.as_bytes());
            }
            GateCommand::Exit => {
                if !self.ledger.request_stop() {
                    debug!("Exit already in progress");
                    return Ok(());
                }
                info!("Exit requested, unsubscribing");
                sink.emit(&AppEvent::ShutdownRequested);
                for channel in Channel::ALL {
                    let topic = self.topics.full(channel.topic());
                    if let Err(e) = transport.unsubscribe(&topic) {
                        warn!("Unsubscribe from {} failed: {}", topic, e);
                        return Err(CommsError::UnsubscribeFailed.into());
                    }
                }
            }
        }
        Ok(())
    }

    // ── Telemetry ─────────────────────────────────────────────

    /// Run whichever telemetry jobs are due at `now_ms`.
    pub fn poll_telemetry(
        &mut self,
        now_ms: u64,
        transport: &mut impl MessagePort,
        sink: &mut impl EventSink,
    ) {
        let mut due = DueJobs::default();
        self.scheduler.poll(now_ms, &mut due);

        for job in due.jobs {
            match job {
                TelemetryJob::Distance => self.publish_distance(transport),
                TelemetryJob::Status => {
                    let state = self.fsm.current_state();
                    self.publish(transport, topics::STATUS, status_message(state).as_bytes());
                    sink.emit(&AppEvent::Telemetry(TelemetryData {
                        state,
                        distance_cm: self.ctx.distance_cm,
                    }));
                }
            }
        }
    }

    fn publish_distance(&mut self, transport: &mut impl MessagePort) {
        let cm = self.ctx.distance_cm;
        if self.last_published_cm == Some(cm) {
            return;
        }
        self.last_published_cm = Some(cm);

        // 8 bytes hold any u16.
        let mut payload: heapless::String<8> = heapless::String::new();
        let _ = write!(payload, "{}", cm);
        self.publish(transport, topics::DISTANCE, payload.as_bytes());
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> GateState {
        self.fsm.current_state()
    }

    pub fn distance_cm(&self) -> u16 {
        self.ctx.distance_cm
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn ledger(&self) -> &SubscriptionLedger {
        &self.ledger
    }

    pub fn indicators(&self) -> IndicatorCommands {
        self.ctx.indicators
    }

    pub fn is_effect_pending(&self, effect: Effect) -> bool {
        self.ctx.effects.is_pending(effect)
    }

    pub fn config(&self) -> &GateConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn force_state(&mut self, target: GateState, sink: &mut impl EventSink) {
        let prev = self.fsm.current_state();
        self.fsm.force_transition(target, &mut self.ctx);
        if prev != target {
            sink.emit(&AppEvent::StateChanged {
                from: prev,
                to: target,
            });
        }
    }

    fn apply_indicators(&self, hw: &mut impl AnnunciatorPort) {
        let ind = self.ctx.indicators;
        hw.set_led(ind.led);
        hw.show_icon(ind.icon);
        hw.show_glyph(ind.glyph);
        if ind.presence_alarm {
            hw.play_sound(Sound::PresenceAlarm);
        }
    }

    /// Publish under the device's topic naming. Failures are logged only.
    fn publish(&self, transport: &mut impl MessagePort, name: &str, payload: &[u8]) {
        let topic = self.topics.full(name);
        if let Err(e) = transport.publish(&topic, payload, QOS, false) {
            warn!("Publish to {} failed: {}", topic, e);
        }
    }

    fn close_link(&mut self, transport: &mut impl MessagePort, sink: &mut impl EventSink) {
        info!("All subscriptions released, disconnecting");
        sink.emit(&AppEvent::DisconnectRequested);
        if let Err(e) = transport.disconnect() {
            warn!("Disconnect failed: {}", e);
            self.scheduler.disarm();
            self.link = LinkState::Closed;
            sink.emit(&AppEvent::LinkClosed);
        }
    }
}

/// Collects due jobs so they can run after the scheduler borrow ends.
#[derive(Default)]
struct DueJobs {
    jobs: heapless::Vec<TelemetryJob, MAX_SCHEDULES>,
}

impl SchedulerDelegate for DueJobs {
    fn on_schedule_fired(&mut self, label: &str, job: TelemetryJob) {
        debug!("Telemetry '{}' due", label);
        let _ = self.jobs.push(job);
    }
}
