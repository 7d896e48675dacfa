//! Telemetry scheduler.
//!
//! Runs alongside the sampling loop. Each schedule re-arms relative to
//! its own most recent firing, so a late poll delays only that schedule.
//! The scheduler notifies a [`SchedulerDelegate`] when a schedule fires;
//! the service implements the delegate and does the publishing.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  broker link up ──▶ arm(now)   (every schedule due at once)  │
//! │                                                              │
//! │  ┌───────────────┐                    ┌───────────────┐      │
//! │  │ "distance"    │  every 2000 ms     │ "status"      │      │
//! │  │ Distance job  │                    │ Status job    │      │
//! │  └───────┬───────┘                    └───────┬───────┘      │
//! │          │                                    │              │
//! │          ▼                                    ▼              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate                         │  │
//! │  │        (GateService publishes telemetry)               │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::app::ports::{SchedulerDelegate, TelemetryJob};
use crate::config::GateConfig;
use log::info;

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// A single periodic schedule.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Human-readable label, used in logs.
    pub label: &'static str,
    pub job: TelemetryJob,
    pub interval_ms: u32,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent schedules (stack-allocated).
pub const MAX_SCHEDULES: usize = 4;

/// The scheduler engine.
///
/// Nothing fires until [`arm`](Self::arm) is called. `poll` is cheap when
/// nothing is due and can be called every loop iteration.
pub struct Scheduler {
    schedules: [Option<ScheduleEntry>; MAX_SCHEDULES],
    armed: bool,
}

#[derive(Debug, Clone)]
struct ScheduleEntry {
    schedule: Schedule,
    next_due_ms: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            schedules: [None, None, None, None],
            armed: false,
        }
    }

    /// The two telemetry schedules, with intervals from `config`.
    pub fn telemetry(config: &GateConfig) -> Self {
        let mut sched = Self::new();
        sched.add(Schedule {
            label: "distance",
            job: TelemetryJob::Distance,
            interval_ms: config.distance_publish_interval_ms,
        });
        sched.add(Schedule {
            label: "status",
            job: TelemetryJob::Status,
            interval_ms: config.status_publish_interval_ms,
        });
        sched
    }

    /// Add a schedule. Returns the slot index, or `None` if full.
    pub fn add(&mut self, schedule: Schedule) -> Option<usize> {
        let (i, slot) = self
            .schedules
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.is_none())?;
        info!(
            "Scheduler: added '{}' at slot {} (every {} ms)",
            schedule.label, i, schedule.interval_ms
        );
        *slot = Some(ScheduleEntry {
            schedule,
            next_due_ms: 0,
        });
        Some(i)
    }

    /// Start firing. Every schedule is due at `now_ms`.
    pub fn arm(&mut self, now_ms: u64) {
        for entry in self.schedules.iter_mut().flatten() {
            entry.next_due_ms = now_ms;
        }
        self.armed = true;
    }

    /// Stop firing until re-armed.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Fire every due schedule, in slot order, then re-arm each at
    /// `now_ms + interval`.
    pub fn poll(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        if !self.armed {
            return;
        }

        for entry in self.schedules.iter_mut().flatten() {
            if now_ms < entry.next_due_ms {
                continue;
            }

            delegate.on_schedule_fired(entry.schedule.label, entry.schedule.job);
            entry.next_due_ms = now_ms + u64::from(entry.schedule.interval_ms);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// Test delegate that records fire events.
    struct RecordingDelegate {
        fires: Vec<(String, TelemetryJob)>,
    }

    impl RecordingDelegate {
        fn new() -> Self {
            Self { fires: Vec::new() }
        }

        fn count(&self, job: TelemetryJob) -> usize {
            self.fires.iter().filter(|(_, j)| *j == job).count()
        }
    }

    impl SchedulerDelegate for RecordingDelegate {
        fn on_schedule_fired(&mut self, label: &str, job: TelemetryJob) {
            self.fires.push((label.to_string(), job));
        }
    }

    #[test]
    fn nothing_fires_before_arm() {
        let mut sched = Scheduler::telemetry(&GateConfig::default());
        let mut delegate = RecordingDelegate::new();
        for t in (0..10_000).step_by(100) {
            sched.poll(t, &mut delegate);
        }
        assert!(delegate.fires.is_empty());
    }

    #[test]
    fn arm_makes_everything_due_immediately() {
        let mut sched = Scheduler::telemetry(&GateConfig::default());
        let mut delegate = RecordingDelegate::new();

        sched.arm(5_000);
        sched.poll(5_000, &mut delegate);
        assert_eq!(delegate.fires.len(), 2);
        assert_eq!(delegate.fires[0], ("distance".to_string(), TelemetryJob::Distance));
        assert_eq!(delegate.fires[1], ("status".to_string(), TelemetryJob::Status));
    }

    #[test]
    fn independent_intervals() {
        let mut sched = Scheduler::telemetry(&GateConfig::default());
        let mut delegate = RecordingDelegate::new();

        sched.arm(0);
        // 10 ms polls over 10 s: distance every 2000, status every 800.
        for t in (0..10_000).step_by(10) {
            sched.poll(t, &mut delegate);
        }
        assert_eq!(delegate.count(TelemetryJob::Distance), 5);
        assert_eq!(delegate.count(TelemetryJob::Status), 13);
    }

    #[test]
    fn late_poll_rearms_from_actual_fire_time() {
        let mut sched = Scheduler::new();
        let mut delegate = RecordingDelegate::new();
        sched.add(Schedule {
            label: "status",
            job: TelemetryJob::Status,
            interval_ms: 800,
        });

        sched.arm(0);
        sched.poll(0, &mut delegate);
        // Loop stalled; fires once, not three times.
        sched.poll(2_500, &mut delegate);
        assert_eq!(delegate.fires.len(), 2);
        sched.poll(3_299, &mut delegate);
        assert_eq!(delegate.fires.len(), 2);
        sched.poll(3_300, &mut delegate);
        assert_eq!(delegate.fires.len(), 3);
    }

    #[test]
    fn disarm_stops_firing() {
        let mut sched = Scheduler::telemetry(&GateConfig::default());
        let mut delegate = RecordingDelegate::new();
        sched.arm(0);
        sched.poll(0, &mut delegate);
        sched.disarm();
        sched.poll(60_000, &mut delegate);
        assert_eq!(delegate.fires.len(), 2);

        sched.arm(60_000);
        sched.poll(60_000, &mut delegate);
        assert_eq!(delegate.fires.len(), 4);
    }

    #[test]
    fn add_fills_slots_in_order() {
        let mut sched = Scheduler::new();
        let s = Schedule {
            label: "x",
            job: TelemetryJob::Status,
            interval_ms: 100,
        };
        for i in 0..MAX_SCHEDULES {
            assert_eq!(sched.add(s.clone()), Some(i));
        }
        assert_eq!(sched.add(s), None);
    }
}
