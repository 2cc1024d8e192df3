//! run command - continuous auditing until a stop signal

use anyhow::{Context, Result};
use tracing::{info, warn};
use warden_audit::{AuditDaemon, SqliteBrokerOpener};
use warden_config::AuditorConfig;

/// Audit replicas pass after pass until SIGINT or SIGTERM
pub async fn execute(config: AuditorConfig) -> Result<()> {
    let mut daemon = AuditDaemon::new(config, SqliteBrokerOpener);
    let handle = daemon.shutdown_handle();

    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown requested");
        handle.shutdown();
    });

    daemon.run_forever().await.context("container audit failed")
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            warn!(error = %e, "Cannot listen for SIGTERM; only Ctrl-C will stop the auditor");
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
