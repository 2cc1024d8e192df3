//! once command - audit a single replica and exit

use anyhow::{Context, Result};
use tracing::{info, warn};
use warden_audit::{AuditDaemon, OnceOutcome, SqliteBrokerOpener};
use warden_config::AuditorConfig;

/// Audit the first live replica found under the devices root
pub fn execute(config: AuditorConfig) -> Result<()> {
    let mut daemon = AuditDaemon::new(config, SqliteBrokerOpener);

    match daemon.run_once().context("container audit failed")? {
        OnceOutcome::NothingToAudit => {}
        OnceOutcome::Passed(path) => info!(path = %path.display(), "Replica passed audit"),
        OnceOutcome::Failed(path) => warn!(path = %path.display(), "Replica failed audit"),
    }
    Ok(())
}
