//! Outlier-rejecting median over one sampling round.
//!
//! Readings outside [`MIN_VALID_CM`, `MAX_VALID_CM`] (timeouts included)
//! are discarded. When fewer than half of the attempted readings survive,
//! the round reports [`FAR_DISTANCE_CM`] instead of a median.

use embedded_hal::delay::DelayNs;

use super::{FAR_DISTANCE_CM, MAX_VALID_CM, MIN_VALID_CM};

/// Upper bound on readings per round (stack buffer size).
pub const MAX_SAMPLES: usize = 16;

/// Anything that can take one raw centimetre reading.
pub trait DistanceSource {
    fn measure_distance_cm(&mut self) -> u32;
}

pub fn is_valid_cm(cm: u32) -> bool {
    (MIN_VALID_CM..=MAX_VALID_CM).contains(&cm)
}

/// Lower median of the valid entries of `readings`, where `attempts` is the
/// number of readings the round tried to take.
///
/// Returns [`FAR_DISTANCE_CM`] when fewer than `attempts / 2` readings are
/// valid, or when none are.
pub fn median_of_valid(readings: &[u32], attempts: usize) -> u16 {
    let mut accepted: heapless::Vec<u32, MAX_SAMPLES> = readings
        .iter()
        .copied()
        .filter(|&cm| is_valid_cm(cm))
        .take(MAX_SAMPLES)
        .collect();

    if accepted.is_empty() || accepted.len() < attempts / 2 {
        return FAR_DISTANCE_CM;
    }

    accepted.sort_unstable();
    // Valid readings are ≤ 400, so this never saturates.
    u16::try_from(accepted[accepted.len() / 2]).unwrap_or(FAR_DISTANCE_CM)
}

/// Sampling-round parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedianFilter {
    sample_count: usize,
    inter_sample_delay_ms: u32,
}

impl MedianFilter {
    /// `sample_count` is clamped to `1..=MAX_SAMPLES`.
    pub fn new(sample_count: usize, inter_sample_delay_ms: u32) -> Self {
        Self {
            sample_count: sample_count.clamp(1, MAX_SAMPLES),
            inter_sample_delay_ms,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Take one round of readings from `source`, pausing after each.
    pub fn filtered_distance(
        &self,
        source: &mut impl DistanceSource,
        delay: &mut impl DelayNs,
    ) -> u16 {
        let mut readings: heapless::Vec<u32, MAX_SAMPLES> = heapless::Vec::new();
        for _ in 0..self.sample_count {
            let _ = readings.push(source.measure_distance_cm());
            delay.delay_ms(self.inter_sample_delay_ms);
        }
        median_of_valid(&readings, self.sample_count)
    }
}
