//! System configuration parameters
//!
//! All tunable parameters for the SmartGate controller. Values can be
//! overridden via NVS; network credentials are fixed at build time.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::sensors::median::MAX_SAMPLES;
use crate::sensors::{MAX_VALID_CM, MIN_VALID_CM};

/// Short device-name prefix used to build the broker client id.
pub type DeviceName = heapless::String<8>;

/// Core gate configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    // --- Presence ---
    /// Distance (cm) at or below which someone is considered present
    pub presence_threshold_cm: u16,

    // --- Ranging ---
    /// Raw measurements taken per filtered reading
    pub sample_count: u8,
    /// Pause after each raw measurement (milliseconds)
    pub inter_sample_delay_ms: u32,
    /// Width of the trigger pulse (microseconds)
    pub trigger_pulse_us: u32,
    /// Maximum wait for the echo line to rise (microseconds)
    pub echo_rise_timeout_us: u32,
    /// Maximum echo pulse width before it counts as a timeout (microseconds)
    pub pulse_width_timeout_us: u32,

    // --- Timing ---
    /// Pause at the end of each control loop iteration (milliseconds)
    pub loop_delay_ms: u32,
    /// Distance telemetry check interval (milliseconds)
    pub distance_publish_interval_ms: u32,
    /// Status telemetry interval (milliseconds)
    pub status_publish_interval_ms: u32,

    // --- Broker ---
    /// Prefix every topic with `/{client_id}`
    pub unique_topics: bool,
    /// Device-name prefix of the client id
    pub device_name: DeviceName,
    /// Broker keep-alive (seconds)
    pub keep_alive_secs: u16,
}

impl Default for GateConfig {
    fn default() -> Self {
        let mut device_name = DeviceName::new();
        let _ = device_name.push_str("pico");

        Self {
            // Presence
            presence_threshold_cm: 30,

            // Ranging
            sample_count: 6,
            inter_sample_delay_ms: 15,
            trigger_pulse_us: 10,
            echo_rise_timeout_us: 30_000,
            pulse_width_timeout_us: 25_000,

            // Timing
            loop_delay_ms: 30,
            distance_publish_interval_ms: 2_000,
            status_publish_interval_ms: 800,

            // Broker
            unique_topics: false,
            device_name,
            keep_alive_secs: 60,
        }
    }
}

impl GateConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = u32::from(self.presence_threshold_cm);
        if !(MIN_VALID_CM..MAX_VALID_CM).contains(&threshold) {
            return Err(ConfigError::ValidationFailed(
                "presence_threshold_cm must be 2–399",
            ));
        }
        if self.sample_count == 0 || usize::from(self.sample_count) > MAX_SAMPLES {
            return Err(ConfigError::ValidationFailed("sample_count must be 1–16"));
        }
        if self.inter_sample_delay_ms > 100 {
            return Err(ConfigError::ValidationFailed(
                "inter_sample_delay_ms must be 0–100",
            ));
        }
        if !(2..=50).contains(&self.trigger_pulse_us) {
            return Err(ConfigError::ValidationFailed("trigger_pulse_us must be 2–50"));
        }
        if self.pulse_width_timeout_us == 0 || self.echo_rise_timeout_us > 100_000 {
            return Err(ConfigError::ValidationFailed(
                "echo timeouts must be 1–100000 µs",
            ));
        }
        if self.echo_rise_timeout_us <= self.pulse_width_timeout_us {
            return Err(ConfigError::ValidationFailed(
                "echo_rise_timeout_us must exceed pulse_width_timeout_us",
            ));
        }
        if self.loop_delay_ms > 1_000 {
            return Err(ConfigError::ValidationFailed("loop_delay_ms must be 0–1000"));
        }
        if !(100..=60_000).contains(&self.distance_publish_interval_ms)
            || !(100..=60_000).contains(&self.status_publish_interval_ms)
        {
            return Err(ConfigError::ValidationFailed(
                "publish intervals must be 100–60000 ms",
            ));
        }
        if self.device_name.is_empty()
            || !self.device_name.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(ConfigError::ValidationFailed(
                "device_name must be 1–8 ASCII alphanumerics",
            ));
        }
        if !(10..=3_600).contains(&self.keep_alive_secs) {
            return Err(ConfigError::ValidationFailed(
                "keep_alive_secs must be 10–3600",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Network settings (build-time)
// ---------------------------------------------------------------------------

/// Wi-Fi and broker settings baked in from the build environment.
#[derive(Debug, Clone, Copy)]
pub struct NetworkSettings {
    pub wifi_ssid: &'static str,
    pub wifi_password: &'static str,
    pub broker_url: &'static str,
    pub broker_user: Option<&'static str>,
    pub broker_password: Option<&'static str>,
}

const DEFAULT_BROKER_URL: &str = "mqtt://broker.local:1883";

impl NetworkSettings {
    /// Read `SMARTGATE_*` variables captured at compile time.
    pub const fn from_build_env() -> Self {
        Self {
            wifi_ssid: match option_env!("SMARTGATE_WIFI_SSID") {
                Some(v) => v,
                None => "",
            },
            wifi_password: match option_env!("SMARTGATE_WIFI_PASSWORD") {
                Some(v) => v,
                None => "",
            },
            broker_url: match option_env!("SMARTGATE_MQTT_URL") {
                Some(v) => v,
                None => DEFAULT_BROKER_URL,
            },
            broker_user: option_env!("SMARTGATE_MQTT_USER"),
            broker_password: option_env!("SMARTGATE_MQTT_PASSWORD"),
        }
    }
}
