//! RGB status LED driver.
//!
//! Three GPIO outputs drive a common-cathode RGB LED, one pin per channel.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the pins via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::fsm::context::Rgb;
use crate::pins;

#[derive(Debug, Default)]
pub struct StatusLed {
    current: Rgb,
}

impl StatusLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_colour(&mut self, colour: Rgb) {
        if colour == self.current {
            return;
        }
        hw_init::gpio_write(pins::LED_R_GPIO, colour.r);
        hw_init::gpio_write(pins::LED_G_GPIO, colour.g);
        hw_init::gpio_write(pins::LED_B_GPIO, colour.b);
        self.current = colour;
    }

    pub fn off(&mut self) {
        self.set_colour(Rgb::OFF);
    }

    pub fn current_colour(&self) -> Rgb {
        self.current
    }
}
