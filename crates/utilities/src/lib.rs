//! # Utilities
//! Timing helpers shared by the overlay crates.
//!

use core::time::Duration;
use std::time::Instant;

use tracing::debug;

/// Display the duration as a string with units. Display is handled in the following order:
/// 1. `>= 10s` displays seconds only.
/// 1. `>= 1s` displays seconds with 1dp.
/// 1. `>= 1ms` displays milliseconds only.
/// 1. `>= 1µs` displays microseconds only.
/// 1. `< 1µs` displays nanoseconds only.
#[inline]
pub fn display_duration(duration: Duration) -> String {
    if duration.as_secs() >= 10 {
        format!("{}s", duration.as_secs())
    } else if duration.as_secs() >= 1 {
        format!("{:.1}s", duration.as_secs_f32())
    } else if duration.as_millis() >= 1 {
        format!("{}ms", duration.as_millis())
    } else if duration.as_micros() >= 1 {
        format!("{}µs", duration.as_micros())
    } else {
        format!("{}ns", duration.as_nanos())
    }
}

/// Structure that on drop, logs the time since construction.
pub struct DebugTime {
    label: &'static str,
    start: Instant,
}

impl DebugTime {
    /// Start a new debug timer with the given label.
    /// Label is printed in the format `[Timing] {label} took {duration}`
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for DebugTime {
    fn drop(&mut self) {
        debug!(
            "[Timing] {} took {}",
            self.label,
            display_duration(self.start.elapsed())
        )
    }
}

/// Summary of one reporting window of [`PresentStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentReport {
    /// Frames presented in the window.
    pub presented: u32,

    /// Presented frames that carried a freshly captured desktop image.
    pub fresh: u32,

    /// Iterations that did not present anything (capture interrupted or device rebuilt).
    pub skipped: u32,

    /// Length of the window.
    pub elapsed: Duration,
}

impl PresentReport {
    /// Mean time between presents in the window, `None` if nothing was presented.
    pub fn mean_frame_time(&self) -> Option<Duration> {
        if self.presented == 0 {
            return None;
        }

        Some(self.elapsed / self.presented)
    }
}

/// Counts presents of a long running render loop and logs a summary once per interval.
pub struct PresentStats {
    interval: Duration,
    window_start: Instant,
    presented: u32,
    fresh: u32,
    skipped: u32,
}

impl PresentStats {
    /// Create a new counter that reports every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            window_start: Instant::now(),
            presented: 0,
            fresh: 0,
            skipped: 0,
        }
    }

    /// Record a presented frame.
    pub fn presented(&mut self, fresh: bool) -> Option<PresentReport> {
        self.presented = self.presented.saturating_add(1);
        if fresh {
            self.fresh = self.fresh.saturating_add(1);
        }

        self.maybe_report(Instant::now())
    }

    /// Record an iteration that did not present.
    pub fn skipped(&mut self) -> Option<PresentReport> {
        self.skipped = self.skipped.saturating_add(1);

        self.maybe_report(Instant::now())
    }

    fn maybe_report(&mut self, now: Instant) -> Option<PresentReport> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval {
            return None;
        }

        let report = PresentReport {
            presented: self.presented,
            fresh: self.fresh,
            skipped: self.skipped,
            elapsed,
        };

        match report.mean_frame_time() {
            Some(frame_time) => debug!(
                "[Present] {} frames ({} fresh, {} skipped) in {}, {} per frame",
                report.presented,
                report.fresh,
                report.skipped,
                display_duration(elapsed),
                display_duration(frame_time)
            ),
            None => debug!(
                "[Present] no frames ({} skipped) in {}",
                report.skipped,
                display_duration(elapsed)
            ),
        }

        self.window_start = now;
        self.presented = 0;
        self.fresh = 0;
        self.skipped = 0;

        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::{PresentStats, display_duration};

    #[test]
    fn duration_units() {
        assert_eq!(display_duration(Duration::from_secs(12)), "12s");
        assert_eq!(display_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(display_duration(Duration::from_millis(16)), "16ms");
        assert_eq!(display_duration(Duration::from_micros(250)), "250µs");
        assert_eq!(display_duration(Duration::from_nanos(40)), "40ns");
    }

    #[test]
    fn zero_interval_reports_every_call() {
        let mut stats = PresentStats::new(Duration::ZERO);

        let report = stats.presented(true).expect("zero interval should report");
        assert_eq!(report.presented, 1);
        assert_eq!(report.fresh, 1);
        assert_eq!(report.skipped, 0);

        let report = stats.skipped().expect("zero interval should report");
        assert_eq!(report.presented, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.mean_frame_time(), None);
    }

    #[test]
    fn long_interval_accumulates() {
        let mut stats = PresentStats::new(Duration::from_secs(3600));

        assert!(stats.presented(true).is_none());
        assert!(stats.presented(false).is_none());
        assert!(stats.skipped().is_none());

        assert_eq!(stats.presented, 2);
        assert_eq!(stats.fresh, 1);
        assert_eq!(stats.skipped, 1);
    }
}
