//! Annunciator drivers, hardware initialisation, and the watchdog.

pub mod buzzer;
pub mod hw_init;
pub mod panel;
pub mod status_led;
pub mod watchdog;
