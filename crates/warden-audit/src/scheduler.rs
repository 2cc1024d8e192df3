//! Pass pacing: startup jitter, end-of-pass throttling and report windows

use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

/// Fixed length of a statistics reporting window
pub const REPORT_INTERVAL: Duration = Duration::from_secs(3600);

/// Timing rules for continuous auditing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditSchedule {
    /// Minimum time from the start of one pass to the start of the next
    pub interval: Duration,

    /// How often aggregate statistics are reported
    pub report_interval: Duration,
}

impl AuditSchedule {
    /// Create a schedule with the standard hourly report window
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            report_interval: REPORT_INTERVAL,
        }
    }

    /// Random delay in `[0, interval)` before the first pass.
    ///
    /// Spreads the first directory scans of nodes started together.
    pub fn startup_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        self.interval.mul_f64(rng.gen::<f64>())
    }

    /// Sleep owed after a pass that took `elapsed`
    pub fn throttle_delay(&self, elapsed: Duration) -> Duration {
        self.interval.saturating_sub(elapsed)
    }
}

/// Tracks when the current statistics window started
#[derive(Debug, Clone)]
pub struct ReportWindow {
    started: Instant,
    period: Duration,
}

impl ReportWindow {
    /// Open a window starting at `now`
    pub fn new(now: Instant, period: Duration) -> Self {
        Self {
            started: now,
            period,
        }
    }

    /// Whether the window has run its full period at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.period
    }

    /// Start a new window at `now`
    pub fn restart(&mut self, now: Instant) {
        self.started = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_startup_delay_bounds() {
        let schedule = AuditSchedule::new(Duration::from_secs(1800));
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            assert!(schedule.startup_delay(&mut rng) < schedule.interval);
        }
    }

    #[test]
    fn test_startup_delay_zero_interval() {
        let schedule = AuditSchedule::new(Duration::ZERO);
        assert_eq!(schedule.startup_delay(&mut rand::thread_rng()), Duration::ZERO);
    }

    #[test]
    fn test_startup_delay_uses_rng() {
        let schedule = AuditSchedule::new(Duration::from_secs(100));
        let mut low = StepRng::new(0, 0);
        assert_eq!(schedule.startup_delay(&mut low), Duration::ZERO);
    }

    #[test]
    fn test_throttle_fast_pass() {
        let schedule = AuditSchedule::new(Duration::from_secs(1800));
        assert_eq!(
            schedule.throttle_delay(Duration::from_secs(300)),
            Duration::from_secs(1500)
        );
    }

    #[test]
    fn test_throttle_slow_pass() {
        let schedule = AuditSchedule::new(Duration::from_secs(1800));
        assert_eq!(schedule.throttle_delay(Duration::from_secs(4000)), Duration::ZERO);
    }

    #[test]
    fn test_throttle_zero_interval() {
        let schedule = AuditSchedule::new(Duration::ZERO);
        assert_eq!(schedule.throttle_delay(Duration::from_millis(3)), Duration::ZERO);
        assert_eq!(schedule.throttle_delay(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_report_window() {
        let start = Instant::now();
        let mut window = ReportWindow::new(start, REPORT_INTERVAL);

        assert!(!window.is_due(start));
        assert!(!window.is_due(start + Duration::from_secs(3599)));
        assert!(window.is_due(start + REPORT_INTERVAL));

        let later = start + Duration::from_secs(4000);
        window.restart(later);
        assert!(!window.is_due(later + Duration::from_secs(10)));
    }
}
