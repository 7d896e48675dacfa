//! GPIO / peripheral pin assignments for the SmartGate board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// HC-SR04 ultrasonic ranger
// ---------------------------------------------------------------------------

/// Digital output: 10 µs HIGH pulse starts a measurement.
pub const TRIGGER_GPIO: i32 = 16;
/// Digital input: HIGH for the round-trip time of the echo.
/// The sensor runs at 5 V; this pin sits behind a divider.
pub const ECHO_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Status LED (discrete RGB, common cathode)
// ---------------------------------------------------------------------------

pub const LED_R_GPIO: i32 = 13;
pub const LED_G_GPIO: i32 = 11;
pub const LED_B_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// Passive buzzers
// ---------------------------------------------------------------------------

/// Presence alarm.
pub const BUZZER_ALARM_GPIO: i32 = 21;
/// Startup, open and close tones.
pub const BUZZER_TONE_GPIO: i32 = 10;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits). 8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// Square wave: half of the 8-bit range.
pub const BUZZER_DUTY: u32 = 128;
/// Frequency the buzzer timers are created with before the first note.
pub const BUZZER_BASE_FREQ_HZ: u32 = 2_000;
