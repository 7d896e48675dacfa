//! Passive buzzer driver.
//!
//! Sounds are short note tables played to completion on one of the two
//! LEDC-driven buzzers. The presence alarm has its own buzzer so it can
//! sound while the tone buzzer is idle; everything else goes to the tone
//! buzzer.
//!
//! Playback blocks the loop for the length of the melody. The presence
//! alarm is kept short because it plays on every loop iteration.

use log::debug;

use crate::drivers::hw_init::{self, BuzzerId};
use crate::fsm::context::Sound;

/// A note. `freq_hz == 0` is a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub freq_hz: u32,
    pub duration_ms: u32,
}

const fn note(freq_hz: u32, duration_ms: u32) -> Note {
    Note { freq_hz, duration_ms }
}

// C5, E5, G5, C6
const C5: u32 = 523;
const E5: u32 = 659;
const G5: u32 = 784;
const C6: u32 = 1_047;

const STARTUP: &[Note] = &[note(C5, 120), note(E5, 120), note(G5, 120), note(C6, 200)];
const GATE_OPEN: &[Note] = &[note(G5, 150), note(0, 30), note(C6, 250)];
const GATE_CLOSE: &[Note] = &[note(C6, 150), note(G5, 150), note(C5, 250)];
const PRESENCE_ALARM: &[Note] = &[note(2_000, 60), note(0, 20), note(2_000, 60)];

/// Note table for `sound`.
pub fn melody(sound: Sound) -> &'static [Note] {
    match sound {
        Sound::Startup => STARTUP,
        Sound::GateOpen => GATE_OPEN,
        Sound::GateClose => GATE_CLOSE,
        Sound::PresenceAlarm => PRESENCE_ALARM,
    }
}

/// Which buzzer plays `sound`.
pub fn buzzer_for(sound: Sound) -> BuzzerId {
    match sound {
        Sound::PresenceAlarm => BuzzerId::Alarm,
        Sound::Startup | Sound::GateOpen | Sound::GateClose => BuzzerId::Tone,
    }
}

/// Total playback time of `sound`.
pub fn duration_ms(sound: Sound) -> u32 {
    melody(sound).iter().map(|n| n.duration_ms).sum()
}

#[derive(Debug, Default)]
pub struct Buzzer {
    last: Option<Sound>,
    played: u32,
}

impl Buzzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play `sound` to completion.
    pub fn play(&mut self, sound: Sound) {
        let id = buzzer_for(sound);
        // Cut anything still ringing before starting over.
        hw_init::buzzer_off(id);

        if self.last != Some(sound) {
            debug!("Buzzer: {:?} ({} ms)", sound, duration_ms(sound));
        }

        for n in melody(sound) {
            if n.freq_hz == 0 {
                hw_init::buzzer_off(id);
            } else {
                hw_init::buzzer_tone(id, n.freq_hz);
            }
            hw_init::block_ms(n.duration_ms);
        }
        hw_init::buzzer_off(id);

        self.last = Some(sound);
        self.played = self.played.wrapping_add(1);
    }

    pub fn silence(&mut self) {
        hw_init::buzzer_off(BuzzerId::Alarm);
        hw_init::buzzer_off(BuzzerId::Tone);
    }

    pub fn last_played(&self) -> Option<Sound> {
        self.last
    }

    pub fn play_count(&self) -> u32 {
        self.played
    }
}
