//! The per-replica audit operation

use tracing::{debug, error};

use crate::replica::Replica;
use crate::stats::AuditStats;

/// Result of auditing one replica
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Metadata was readable
    Passed,
    /// Metadata could not be read
    Failed,
}

/// Audit one replica by reading its summary metadata.
///
/// Failures are counted and logged, never returned: one bad replica must not
/// stop the rest of the pass.
pub fn audit_replica<R: Replica>(replica: &R, stats: &mut AuditStats) -> AuditOutcome {
    match replica.info() {
        Ok(_) => {
            stats.record_pass();
            debug!(path = %replica.path().display(), "Audit passed");
            AuditOutcome::Passed
        }
        Err(e) => {
            stats.record_failure();
            error!(
                path = %replica.path().display(),
                error = %e,
                "Could not get container info"
            );
            AuditOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeReplica;

    #[test]
    fn test_pass_counts() {
        let mut stats = AuditStats::new();
        let outcome = audit_replica(&FakeReplica::healthy("/srv/node/sda/1.db"), &mut stats);

        assert_eq!(outcome, AuditOutcome::Passed);
        assert_eq!(stats.passes(), 1);
        assert_eq!(stats.failures(), 0);
    }

    #[test]
    fn test_failure_is_absorbed() {
        let mut stats = AuditStats::new();
        let replicas = [
            FakeReplica::failing("/srv/node/sda/1.db"),
            FakeReplica::healthy("/srv/node/sda/2.db"),
            FakeReplica::failing("/srv/node/sda/3.db"),
            FakeReplica::healthy("/srv/node/sda/4.db"),
            FakeReplica::healthy("/srv/node/sda/5.db"),
        ];

        let outcomes: Vec<_> = replicas
            .iter()
            .map(|r| audit_replica(r, &mut stats))
            .collect();

        assert_eq!(outcomes[0], AuditOutcome::Failed);
        assert_eq!(outcomes[1], AuditOutcome::Passed);
        assert_eq!(stats.failures(), 2);
        assert_eq!(stats.passes(), 3);
    }
}
