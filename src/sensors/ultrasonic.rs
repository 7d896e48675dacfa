//! HC-SR04-style ultrasonic ranger.
//!
//! One measurement is a fixed-width trigger pulse followed by two bounded
//! waits on the echo line:
//!
//! ```text
//!  trigger ─┐‾‾‾‾┌──────────────────────────────────────────
//!           │10µs│
//!  echo    ─────────────┐‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾┌──────────────
//!                 ◀────▶│◀──── pulse width ─▶│
//!            rise wait  (≤ 30 ms)  (≤ 25 ms)
//! ```
//!
//! The waits are deadline comparisons against a monotonic microsecond
//! clock inside [`EchoTracker::poll`], so the timing logic is testable
//! without hardware. Either bound expiring yields the timeout sentinel
//! [`TIMEOUT_PULSE_US`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;

use crate::app::ports::TimePort;
use crate::config::GateConfig;

use super::median::DistanceSource;

/// Returned by [`UltrasonicSensor::measure_pulse`] when either wait expires.
pub const TIMEOUT_PULSE_US: u64 = 0;

/// Microseconds per centimetre of sound travel (one way).
const US_PER_CM: u64 = 29;
/// Microseconds per inch of sound travel (one way).
const US_PER_INCH: f32 = 74.0;

/// Round-trip pulse width to centimetres (integer division, truncating).
pub fn pulse_to_cm(pulse_us: u64) -> u32 {
    u32::try_from(pulse_us / US_PER_CM / 2).unwrap_or(u32::MAX)
}

/// Round-trip pulse width to inches.
pub fn pulse_to_inches(pulse_us: u64) -> f32 {
    pulse_us as f32 / US_PER_INCH / 2.0
}

// ---------------------------------------------------------------------------
// Echo timing
// ---------------------------------------------------------------------------

/// The two independent echo bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoTimeouts {
    /// How long to wait for the echo line to go high.
    pub rise_us: u64,
    /// How long the echo line may stay high.
    pub width_us: u64,
}

impl EchoTimeouts {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            rise_us: u64::from(config.echo_rise_timeout_us),
            width_us: u64::from(config.pulse_width_timeout_us),
        }
    }
}

impl Default for EchoTimeouts {
    fn default() -> Self {
        Self::from_config(&GateConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EchoPhase {
    AwaitRise { since_us: u64 },
    AwaitFall { rise_at_us: u64 },
}

/// Outcome of one [`EchoTracker::poll`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoPoll {
    Pending,
    /// Measurement finished: pulse width in µs, or [`TIMEOUT_PULSE_US`].
    Complete(u64),
}

/// Non-blocking echo edge tracker.
#[derive(Debug, Clone, Copy)]
pub struct EchoTracker {
    phase: EchoPhase,
    timeouts: EchoTimeouts,
}

impl EchoTracker {
    /// Begin waiting for the echo rise; call right after the trigger falls.
    pub fn start(now_us: u64, timeouts: EchoTimeouts) -> Self {
        Self {
            phase: EchoPhase::AwaitRise { since_us: now_us },
            timeouts,
        }
    }

    /// Feed one sample of the echo line taken at `now_us`.
    pub fn poll(&mut self, now_us: u64, echo_high: bool) -> EchoPoll {
        match self.phase {
            EchoPhase::AwaitRise { since_us } => {
                if echo_high {
                    self.phase = EchoPhase::AwaitFall { rise_at_us: now_us };
                    EchoPoll::Pending
                } else if now_us.saturating_sub(since_us) > self.timeouts.rise_us {
                    EchoPoll::Complete(TIMEOUT_PULSE_US)
                } else {
                    EchoPoll::Pending
                }
            }
            EchoPhase::AwaitFall { rise_at_us } => {
                let width = now_us.saturating_sub(rise_at_us);
                if !echo_high {
                    EchoPoll::Complete(width)
                } else if width > self.timeouts.width_us {
                    EchoPoll::Complete(TIMEOUT_PULSE_US)
                } else {
                    EchoPoll::Pending
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor driver
// ---------------------------------------------------------------------------

/// Ultrasonic ranger on a trigger output and an echo input.
pub struct UltrasonicSensor<TRIG, ECHO, D, C> {
    trigger: TRIG,
    echo: ECHO,
    delay: D,
    clock: C,
    trigger_pulse_us: u32,
    timeouts: EchoTimeouts,
}

impl<TRIG, ECHO, D, C> UltrasonicSensor<TRIG, ECHO, D, C>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    D: DelayNs,
    C: TimePort,
{
    pub fn new(trigger: TRIG, echo: ECHO, delay: D, clock: C, config: &GateConfig) -> Self {
        Self {
            trigger,
            echo,
            delay,
            clock,
            trigger_pulse_us: config.trigger_pulse_us,
            timeouts: EchoTimeouts::from_config(config),
        }
    }

    /// Fire one ping and return the echo high time in µs, or
    /// [`TIMEOUT_PULSE_US`]. Pin errors count as a timeout.
    pub fn measure_pulse(&mut self) -> u64 {
        if self.trigger.set_low().is_err() || self.trigger.set_high().is_err() {
            debug!("ultrasonic: trigger pin error");
            return TIMEOUT_PULSE_US;
        }
        self.delay.delay_us(self.trigger_pulse_us);
        if self.trigger.set_low().is_err() {
            debug!("ultrasonic: trigger pin error");
            return TIMEOUT_PULSE_US;
        }

        let mut tracker = EchoTracker::start(self.clock.uptime_us(), self.timeouts);
        loop {
            let Ok(level) = self.echo.is_high() else {
                debug!("ultrasonic: echo pin error");
                return TIMEOUT_PULSE_US;
            };
            if let EchoPoll::Complete(pulse) = tracker.poll(self.clock.uptime_us(), level) {
                return pulse;
            }
            core::hint::spin_loop();
        }
    }

    /// One raw distance in centimetres (0 on timeout).
    pub fn measure_distance_cm(&mut self) -> u32 {
        pulse_to_cm(self.measure_pulse())
    }

    /// One raw distance in inches (0.0 on timeout).
    pub fn measure_distance_inches(&mut self) -> f32 {
        pulse_to_inches(self.measure_pulse())
    }
}

impl<TRIG, ECHO, D, C> DistanceSource for UltrasonicSensor<TRIG, ECHO, D, C>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    D: DelayNs,
    C: TimePort,
{
    fn measure_distance_cm(&mut self) -> u32 {
        UltrasonicSensor::measure_distance_cm(self)
    }
}
