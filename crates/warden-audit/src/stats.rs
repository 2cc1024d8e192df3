//! Audit statistics

use chrono::{DateTime, Local};
use serde::Serialize;

/// Pass/failure counters for the current reporting window.
///
/// Owned by a single daemon; window counters reset on every report while the
/// lifetime totals keep growing.
#[derive(Debug, Clone)]
pub struct AuditStats {
    /// Replicas that passed in this window
    passes: u64,

    /// Replicas that failed in this window
    failures: u64,

    /// Start of this window
    since: DateTime<Local>,

    /// Passes since the stats were created
    total_passes: u64,

    /// Failures since the stats were created
    total_failures: u64,
}

impl AuditStats {
    /// Create empty stats with a window starting now
    pub fn new() -> Self {
        Self {
            passes: 0,
            failures: 0,
            since: Local::now(),
            total_passes: 0,
            total_failures: 0,
        }
    }

    /// Record a replica that passed audit
    pub fn record_pass(&mut self) {
        self.passes += 1;
        self.total_passes += 1;
    }

    /// Record a replica that failed audit
    pub fn record_failure(&mut self) {
        self.failures += 1;
        self.total_failures += 1;
    }

    /// Passes in the current window
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Failures in the current window
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Replicas audited since the stats were created
    pub fn total_audited(&self) -> u64 {
        self.total_passes + self.total_failures
    }

    /// Get statistics snapshot
    pub fn snapshot(&self) -> AuditSnapshot {
        AuditSnapshot {
            passes: self.passes,
            failures: self.failures,
            since: self.since,
        }
    }

    /// Zero the window counters and start a new window now
    pub fn reset_window(&mut self) {
        self.passes = 0;
        self.failures = 0;
        self.since = Local::now();
    }
}

impl Default for AuditStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters of one reporting window
#[derive(Debug, Clone, Serialize)]
pub struct AuditSnapshot {
    /// Replicas that passed
    pub passes: u64,

    /// Replicas that failed
    pub failures: u64,

    /// Window start
    pub since: DateTime<Local>,
}

impl AuditSnapshot {
    /// Format as the periodic report line
    pub fn summary(&self) -> String {
        format!(
            "Since {}: Container audits: {} passed audit, {} failed audit",
            self.since.format("%a %b %e %H:%M:%S %Y"),
            self.passes,
            self.failures,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = AuditStats::new();
        stats.record_pass();
        stats.record_pass();
        stats.record_failure();

        assert_eq!(stats.passes(), 2);
        assert_eq!(stats.failures(), 1);
        assert_eq!(stats.total_audited(), 3);
    }

    #[test]
    fn test_reset_window_keeps_totals() {
        let mut stats = AuditStats::new();
        stats.record_pass();
        stats.record_failure();
        let before = stats.snapshot().since;

        stats.reset_window();
        assert_eq!(stats.passes(), 0);
        assert_eq!(stats.failures(), 0);
        assert_eq!(stats.total_audited(), 2);
        assert!(stats.snapshot().since >= before);
    }

    #[test]
    fn test_summary() {
        let mut stats = AuditStats::new();
        stats.record_pass();
        stats.record_failure();
        stats.record_failure();

        let summary = stats.snapshot().summary();
        assert!(summary.starts_with("Since "));
        assert!(summary.ends_with("Container audits: 1 passed audit, 2 failed audit"));
    }
}
