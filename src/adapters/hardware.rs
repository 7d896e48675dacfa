//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`RangeFinder`] and every annunciator driver, exposing them
//! through [`SensorPort`] and [`AnnunciatorPort`]. On non-espidf targets
//! the drivers fall back to their cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{AnnunciatorPort, SensorPort};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::panel::Panel;
use crate::drivers::status_led::StatusLed;
use crate::fsm::context::{Glyph, Icon, Rgb, Sound};
use crate::sensors::RangeFinder;
use crate::sensors::median::DistanceSource;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<S, D> {
    ranger: RangeFinder<S, D>,
    led: StatusLed,
    buzzer: Buzzer,
    panel: Panel,
}

impl<S: DistanceSource, D: DelayNs> HardwareAdapter<S, D> {
    pub fn new(ranger: RangeFinder<S, D>, led: StatusLed, buzzer: Buzzer, panel: Panel) -> Self {
        Self {
            ranger,
            led,
            buzzer,
            panel,
        }
    }

    pub fn led(&self) -> &StatusLed {
        &self.led
    }

    pub fn buzzer(&self) -> &Buzzer {
        &self.buzzer
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<S: DistanceSource, D: DelayNs> SensorPort for HardwareAdapter<S, D> {
    fn read_distance_cm(&mut self) -> u16 {
        self.ranger.read_cm()
    }
}

// ── AnnunciatorPort implementation ────────────────────────────

impl<S: DistanceSource, D: DelayNs> AnnunciatorPort for HardwareAdapter<S, D> {
    fn set_led(&mut self, colour: Rgb) {
        self.led.set_colour(colour);
    }

    fn show_icon(&mut self, icon: Icon) {
        self.panel.show_icon(icon);
    }

    fn show_glyph(&mut self, glyph: Glyph) {
        self.panel.show_glyph(glyph);
    }

    fn clear_matrix(&mut self) {
        self.panel.clear_matrix();
    }

    fn play_sound(&mut self, sound: Sound) {
        self.buzzer.play(sound);
    }

    fn all_off(&mut self) {
        self.led.off();
        self.panel.clear_matrix();
        self.buzzer.silence();
    }
}
