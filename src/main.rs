//! SmartGate Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink   NvsAdapter   Esp32Time  │
//! │  (Sensor+Annunciator)   (EventSink)    (Config)     (TimePort) │
//! │  WifiAdapter            MqttAdapter                            │
//! │  (Connectivity)         (MessagePort)                          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              GateService (pure logic)                  │    │
//! │  │  FSM · Scheduler · Subscription ledger                 │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  TRANSPORT_EVENTS (broker task → main loop)                    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use smartgate::adapters::device_id;
use smartgate::adapters::hardware::HardwareAdapter;
use smartgate::adapters::log_sink::LogEventSink;
use smartgate::adapters::mqtt::MqttAdapter;
use smartgate::adapters::nvs::NvsAdapter;
use smartgate::adapters::time::Esp32TimeAdapter;
use smartgate::adapters::wifi::{ConnectivityPort, WifiAdapter};
use smartgate::app::ports::{AnnunciatorPort, ConfigPort, TimePort};
use smartgate::app::service::GateService;
use smartgate::app::topics::{self, TopicNamer};
use smartgate::config::{GateConfig, NetworkSettings};
use smartgate::drivers::buzzer::Buzzer;
use smartgate::drivers::panel::Panel;
use smartgate::drivers::status_led::StatusLed;
use smartgate::drivers::{hw_init, watchdog::Watchdog};
use smartgate::error::{CommsError, Error};
use smartgate::events::TRANSPORT_EVENTS;
use smartgate::pins;
use smartgate::sensors::RangeFinder;
use smartgate::sensors::ultrasonic::UltrasonicSensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartGate v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 3. Configuration ──────────────────────────────────────
    let config = match NvsAdapter::new().and_then(|nvs| nvs.load()) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            GateConfig::default()
        }
    };
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config not printable: {}", e),
    }

    let network = NetworkSettings::from_build_env();
    if network.broker_url.is_empty() {
        return Err(Error::Config("broker URL is empty").into());
    }

    // ── 4. WiFi (blocking until the netif is up) ──────────────
    let esp_wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_partition))?;
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(esp_wifi, sysloop)?);
    wifi.set_credentials(network.wifi_ssid, network.wifi_password)
        .map_err(Error::from)?;
    wifi.connect().map_err(Error::from)?;

    // ── 5. Ranging + annunciators ─────────────────────────────
    let clock = Esp32TimeAdapter::new();
    // SAFETY: the ranger pins are claimed nowhere else; `pins` is the only
    // source of GPIO numbers.
    let trigger = PinDriver::output(unsafe { AnyOutputPin::new(pins::TRIGGER_GPIO) })?;
    let echo = PinDriver::input(unsafe { AnyInputPin::new(pins::ECHO_GPIO) })?;
    let sensor = UltrasonicSensor::new(trigger, echo, Ets, clock, &config);
    let ranger = RangeFinder::new(sensor, FreeRtos, &config);
    let mut hw = HardwareAdapter::new(ranger, StatusLed::new(), Buzzer::new(), Panel::new());

    // ── 6. Broker ─────────────────────────────────────────────
    let client_id = device_id::client_id(&config.device_name, &device_id::read_mac());
    info!("Client ID: {}", client_id);

    let will_topic =
        TopicNamer::new(client_id.clone(), config.unique_topics).full(topics::ONLINE);
    let mut mqtt = MqttAdapter::connect(
        &network,
        &client_id,
        &will_topic,
        config.keep_alive_secs,
        &TRANSPORT_EVENTS,
    )
    .map_err(|e| {
        warn!("Broker client: {}", e);
        Error::from(CommsError::BrokerConnectFailed)
    })?;

    // ── 7. Service ────────────────────────────────────────────
    let loop_delay_ms = config.loop_delay_ms;
    let mut sink = LogEventSink::new();
    let mut service = GateService::new(config, client_id);
    service.start(&mut hw, &mut sink);

    // Subscribed only now: the WiFi join above can outlast the timeout.
    let watchdog = Watchdog::default();
    info!("System ready. Entering control loop.");

    // ── 8. Control loop ───────────────────────────────────────
    while service.is_running() {
        TRANSPORT_EVENTS
            .try_drain(|event| service.handle_transport_event(event, &mut mqtt, &clock, &mut sink))?;

        service.poll_telemetry(clock.uptime_ms(), &mut mqtt, &mut sink);
        service.tick(&mut hw, &mut sink);

        watchdog.feed();
        FreeRtos::delay_ms(loop_delay_ms);
    }

    hw.all_off();
    wifi.disconnect();
    info!("Broker link closed, exiting");
    Ok(())
}
