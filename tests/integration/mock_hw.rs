//! Mock adapters for integration tests.
//!
//! Records every annunciator call and every broker request so tests can
//! assert on the full history without touching GPIO or a real broker.

use std::collections::VecDeque;

use smartgate::app::events::AppEvent;
use smartgate::app::ports::{
    AnnunciatorPort, EventSink, MessagePort, QoS, SensorPort, TimePort, TransportError,
};
use smartgate::app::service::GateService;
use smartgate::app::topics::ClientId;
use smartgate::config::GateConfig;
use smartgate::events::{InboundMessage, TransportEvent};
use smartgate::fsm::context::{Glyph, Icon, Rgb, Sound};

// ── Annunciator call record ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Led(Rgb),
    Icon(Icon),
    Glyph(Glyph),
    ClearMatrix,
    Sound(Sound),
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

/// Scripted distances plus a recording annunciator. Once the script runs
/// out the last distance repeats.
pub struct MockHardware {
    script: VecDeque<u16>,
    last_cm: u16,
    pub calls: Vec<Call>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn at(cm: u16) -> Self {
        Self {
            script: VecDeque::new(),
            last_cm: cm,
            calls: Vec::new(),
        }
    }

    pub fn scripted(distances: &[u16]) -> Self {
        Self {
            script: distances.iter().copied().collect(),
            last_cm: distances.last().copied().unwrap_or(400),
            calls: Vec::new(),
        }
    }

    /// Every later reading returns `cm`.
    pub fn move_to(&mut self, cm: u16) {
        self.script.clear();
        self.last_cm = cm;
    }

    pub fn sounds(&self) -> Vec<Sound> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Sound(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn count_sound(&self, sound: Sound) -> usize {
        self.sounds().iter().filter(|s| **s == sound).count()
    }

    pub fn last_led(&self) -> Option<Rgb> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Led(rgb) => Some(*rgb),
            Call::AllOff => Some(Rgb::OFF),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl SensorPort for MockHardware {
    fn read_distance_cm(&mut self) -> u16 {
        self.script.pop_front().unwrap_or(self.last_cm)
    }
}

impl AnnunciatorPort for MockHardware {
    fn set_led(&mut self, colour: Rgb) {
        self.calls.push(Call::Led(colour));
    }

    fn show_icon(&mut self, icon: Icon) {
        self.calls.push(Call::Icon(icon));
    }

    fn show_glyph(&mut self, glyph: Glyph) {
        self.calls.push(Call::Glyph(glyph));
    }

    fn clear_matrix(&mut self) {
        self.calls.push(Call::ClearMatrix);
    }

    fn play_sound(&mut self, sound: Sound) {
        self.calls.push(Call::Sound(sound));
    }

    fn all_off(&mut self) {
        self.calls.push(Call::AllOff);
    }
}

// ── MockBroker ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub qos: QoS,
    pub retain: bool,
}

/// Records requests and queues the acknowledgements a broker would send.
#[derive(Default)]
pub struct MockBroker {
    pub published: Vec<Published>,
    pub subscribed: Vec<String>,
    pub unsubscribed: Vec<String>,
    pub disconnects: u32,
    /// Events the broker task would push next.
    pub pending: VecDeque<TransportEvent>,
    pub fail_publish: bool,
    pub fail_subscribe: bool,
    pub connected: bool,
}

#[allow(dead_code)]
impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published_on(&self, topic: &str) -> Vec<String> {
        self.published
            .iter()
            .filter(|p| p.topic == topic)
            .map(|p| p.payload.clone())
            .collect()
    }

    pub fn deliver(&mut self, topic: &str, payload: &str) {
        let msg = InboundMessage::new(topic, payload.as_bytes()).expect("topic fits");
        self.pending.push_back(TransportEvent::Message(msg));
    }
}

impl MessagePort for MockBroker {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), TransportError> {
        if self.fail_publish {
            return Err(TransportError::Rejected(-1));
        }
        self.published.push(Published {
            topic: topic.to_string(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            qos,
            retain,
        });
        Ok(())
    }

    fn subscribe(&mut self, topic: &str, _qos: QoS) -> Result<(), TransportError> {
        if self.fail_subscribe {
            return Err(TransportError::Rejected(-1));
        }
        self.subscribed.push(topic.to_string());
        self.pending.push_back(TransportEvent::SubscribeAck(Ok(())));
        Ok(())
    }

    fn unsubscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.unsubscribed.push(topic.to_string());
        self.pending.push_back(TransportEvent::UnsubscribeAck(Ok(())));
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.connected = false;
        self.disconnects += 1;
        self.pending.push_back(TransportEvent::Disconnected);
        Ok(())
    }
}

// ── FixedClock ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock {
    pub now_us: u64,
}

#[allow(dead_code)]
impl FixedClock {
    pub fn at_ms(ms: u64) -> Self {
        Self { now_us: ms * 1_000 }
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.now_us += ms * 1_000;
    }
}

impl TimePort for FixedClock {
    fn uptime_us(&self) -> u64 {
        self.now_us
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, event: &AppEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A started service wired to mocks.
pub struct Rig {
    pub service: GateService,
    pub hw: MockHardware,
    pub broker: MockBroker,
    pub clock: FixedClock,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: GateConfig, hw: MockHardware) -> Self {
        let mut id = ClientId::new();
        id.push_str("picocafe").expect("fits");

        let mut rig = Self {
            service: GateService::new(config, id),
            hw,
            broker: MockBroker::new(),
            clock: FixedClock::at_ms(1_000),
            sink: RecordingSink::new(),
        };
        rig.service.start(&mut rig.hw, &mut rig.sink);
        rig
    }

    pub fn with_defaults(cm: u16) -> Self {
        Self::new(GateConfig::default(), MockHardware::at(cm))
    }

    /// Start, then bring the link up and process the subscribe acks.
    pub fn connected(config: GateConfig, hw: MockHardware) -> Self {
        let mut rig = Self::new(config, hw);
        rig.broker.connected = true;
        rig.broker.pending.push_back(TransportEvent::Connected);
        rig.pump().expect("connect succeeds");
        rig
    }

    /// Feed queued broker events to the service until none remain.
    pub fn pump(&mut self) -> smartgate::error::Result<()> {
        while let Some(event) = self.broker.pending.pop_front() {
            self.service.handle_transport_event(
                event,
                &mut self.broker,
                &self.clock,
                &mut self.sink,
            )?;
        }
        Ok(())
    }

    pub fn tick(&mut self) {
        self.service.tick(&mut self.hw, &mut self.sink);
    }

    pub fn send(&mut self, topic: &str, payload: &str) -> smartgate::error::Result<()> {
        self.broker.deliver(topic, payload);
        self.pump()
    }

    pub fn poll_telemetry(&mut self) {
        self.service
            .poll_telemetry(self.clock.uptime_ms(), &mut self.broker, &mut self.sink);
    }
}
