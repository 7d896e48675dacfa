//! Ranging subsystem: the ultrasonic driver and the [`RangeFinder`] that
//! turns a burst of raw readings into one filtered distance per loop
//! iteration.

pub mod median;
pub mod ultrasonic;

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::config::GateConfig;
use median::{DistanceSource, MedianFilter};

/// Shortest distance the ranger can resolve (cm).
pub const MIN_VALID_CM: u32 = 2;
/// Longest distance the ranger can resolve (cm).
pub const MAX_VALID_CM: u32 = 400;
/// Reported when a round has too few valid readings ("nobody there").
pub const FAR_DISTANCE_CM: u16 = 400;

/// Owns the raw distance source, the filter parameters and the delay used
/// between readings.
pub struct RangeFinder<S, D> {
    source: S,
    delay: D,
    filter: MedianFilter,
}

impl<S: DistanceSource, D: DelayNs> RangeFinder<S, D> {
    pub fn new(source: S, delay: D, config: &GateConfig) -> Self {
        Self {
            source,
            delay,
            filter: MedianFilter::new(
                usize::from(config.sample_count),
                config.inter_sample_delay_ms,
            ),
        }
    }

    /// Run one sampling round. Always in `2..=400`.
    pub fn read_cm(&mut self) -> u16 {
        let cm = self.filter.filtered_distance(&mut self.source, &mut self.delay);
        debug!("rangefinder: {} cm", cm);
        cm
    }
}
