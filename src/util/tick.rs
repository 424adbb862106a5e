//! Fixed-timestep pacing for the orchestrator thread.
//!
//! The timer is deadline-based: work time inside the tick is absorbed by the
//! following sleep, and a tick that blows through its whole interval is
//! reported as late instead of being silently stretched.

use std::time::{Duration, Instant};

/// Outcome of waiting for the next tick boundary.
#[derive(Debug, Clone, Copy)]
pub struct TickReport {
    /// Sequence number of the tick that is about to run (starts at 0).
    pub tick: u64,
    /// True when the previous tick overran its interval.
    pub late: bool,
    /// How far past the deadline the previous tick finished.
    pub overrun: Duration,
}

pub struct TickTimer {
    interval: Duration,
    deadline: Instant,
    tick: u64,
    late_ticks: u64,
}

impl TickTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: Instant::now() + interval,
            tick: 0,
            late_ticks: 0,
        }
    }

    /// Blocks until the next tick boundary and returns its report.
    ///
    /// When the previous tick ran long the timer re-anchors on the current
    /// instant rather than replaying every missed boundary, so a single stall
    /// costs one late tick instead of a catch-up burst.
    pub fn wait(&mut self) -> TickReport {
        let now = Instant::now();
        let (late, overrun) = if now >= self.deadline {
            (self.tick > 0, now - self.deadline)
        } else {
            std::thread::sleep(self.deadline - now);
            (false, Duration::ZERO)
        };

        if late {
            self.late_ticks += 1;
            self.deadline = Instant::now() + self.interval;
        } else {
            self.deadline += self.interval;
        }

        let report = TickReport {
            tick: self.tick,
            late,
            overrun,
        };
        self.tick += 1;
        report
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn late_ticks(&self) -> u64 {
        self.late_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_numbers_increase() {
        let mut timer = TickTimer::new(Duration::from_millis(1));
        assert_eq!(timer.wait().tick, 0);
        assert_eq!(timer.wait().tick, 1);
        assert_eq!(timer.wait().tick, 2);
    }

    #[test]
    fn test_on_time_tick_is_not_late() {
        let mut timer = TickTimer::new(Duration::from_millis(5));
        let report = timer.wait();
        assert!(!report.late);
        assert_eq!(report.overrun, Duration::ZERO);
        assert_eq!(timer.late_ticks(), 0);
    }

    #[test]
    fn test_overrun_is_reported_late() {
        let mut timer = TickTimer::new(Duration::from_millis(5));
        timer.wait();
        // Simulate a tick that takes two intervals.
        std::thread::sleep(Duration::from_millis(12));
        let report = timer.wait();
        assert!(report.late);
        assert!(report.overrun > Duration::ZERO);
        assert_eq!(timer.late_ticks(), 1);
    }

    #[test]
    fn test_late_tick_reanchors() {
        let mut timer = TickTimer::new(Duration::from_millis(5));
        timer.wait();
        std::thread::sleep(Duration::from_millis(20));
        assert!(timer.wait().late);
        // Re-anchored: the next boundary is a full interval away again.
        assert!(!timer.wait().late);
    }

    #[test]
    fn test_first_tick_fires_after_one_interval() {
        let interval = Duration::from_millis(5);
        let start = Instant::now();
        let mut timer = TickTimer::new(interval);
        let report = timer.wait();
        assert!(!report.late);
        assert!(start.elapsed() >= interval);
    }
}
