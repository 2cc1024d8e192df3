//! Audit daemon - the main background service

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use warden_config::AuditorConfig;

use crate::audit::{audit_replica, AuditOutcome};
use crate::discovery::discover;
use crate::recon::{PassRecord, ReconCache};
use crate::replica::{Replica, ReplicaOpener};
use crate::scheduler::{AuditSchedule, ReportWindow};
use crate::stats::AuditStats;
use crate::Result;

/// State of the audit daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditState {
    /// Daemon is not running
    Stopped,
    /// Waiting out the startup jitter
    Starting,
    /// Walking devices and auditing replicas
    Auditing,
    /// Pass finished, waiting out the rest of the interval
    DrainingPass,
}

/// Result of a single-shot run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnceOutcome {
    /// Discovery found no live replica
    NothingToAudit,
    /// The first replica found passed audit
    Passed(PathBuf),
    /// The first replica found failed audit
    Failed(PathBuf),
}

/// Summary of one continuous-mode pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// Replicas audited during the pass
    pub audited: u64,
    /// Wall-clock duration of the pass
    pub elapsed: Duration,
    /// Whether a shutdown request cut the pass short
    pub interrupted: bool,
}

/// Requests that a running daemon stop
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Ask the daemon to stop at its next check
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    /// Whether shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

/// The container replica auditor
pub struct AuditDaemon<O: ReplicaOpener> {
    /// Configuration
    config: AuditorConfig,

    /// Replica capability
    opener: O,

    /// Pass pacing
    schedule: AuditSchedule,

    /// Window counters
    stats: AuditStats,

    /// Current reporting window
    window: ReportWindow,

    /// Current state
    state: AuditState,

    /// Optional recon cache
    recon: Option<ReconCache>,

    /// Completed continuous-mode passes
    passes_completed: u64,

    /// Shutdown signal
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<O: ReplicaOpener> AuditDaemon<O> {
    /// Create a new audit daemon
    pub fn new(config: AuditorConfig, opener: O) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let schedule = AuditSchedule::new(config.interval());

        Self {
            recon: config.recon_cache_path.clone().map(ReconCache::new),
            window: ReportWindow::new(Instant::now(), schedule.report_interval),
            config,
            opener,
            schedule,
            stats: AuditStats::new(),
            state: AuditState::Stopped,
            passes_completed: 0,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    /// Override the pacing rules
    pub fn with_schedule(mut self, schedule: AuditSchedule) -> Self {
        self.window = ReportWindow::new(Instant::now(), schedule.report_interval);
        self.schedule = schedule;
        self
    }

    /// Handle for stopping this daemon from elsewhere
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Get current daemon state
    pub fn state(&self) -> AuditState {
        self.state
    }

    /// Get statistics
    pub fn stats(&self) -> &AuditStats {
        &self.stats
    }

    /// Number of full passes completed in continuous mode
    pub fn passes_completed(&self) -> u64 {
        self.passes_completed
    }

    /// Get configuration
    pub fn config(&self) -> &AuditorConfig {
        &self.config
    }

    /// Audit every replica, pass after pass, until shut down.
    ///
    /// Returns `Ok(())` after a shutdown request, or the first error from
    /// walking the device tree.
    pub async fn run_forever(&mut self) -> Result<()> {
        self.state = AuditState::Starting;
        self.window.restart(Instant::now());
        self.stats.reset_window();

        let delay = self.schedule.startup_delay(&mut rand::thread_rng());
        info!(
            devices = %self.config.devices.display(),
            interval = ?self.schedule.interval,
            delay = ?delay,
            "Starting container auditor"
        );

        let result = self.audit_loop(delay).await;
        self.state = AuditState::Stopped;
        match &result {
            Ok(()) => info!("Container auditor stopped"),
            Err(e) => warn!(error = %e, "Container auditor stopped on error"),
        }
        result
    }

    async fn audit_loop(&mut self, startup_delay: Duration) -> Result<()> {
        if self.sleep_or_shutdown(startup_delay).await {
            return Ok(());
        }

        loop {
            let summary = self.run_pass().await?;
            if summary.interrupted {
                return Ok(());
            }

            self.state = AuditState::DrainingPass;
            self.passes_completed += 1;
            info!(
                audited = summary.audited,
                elapsed = ?summary.elapsed,
                "Container audit pass completed: {:.02}s",
                summary.elapsed.as_secs_f64()
            );
            self.dump_recon(summary.elapsed);

            let delay = self.schedule.throttle_delay(summary.elapsed);
            if !delay.is_zero() {
                debug!(delay = ?delay, "Throttling until next pass");
            }
            if self.sleep_or_shutdown(delay).await {
                return Ok(());
            }
        }
    }

    /// Walk the device tree once, auditing every live replica.
    ///
    /// Yields to the runtime after every hash directory so a shutdown request
    /// can be observed mid-pass, even across long runs of deleted replicas.
    pub async fn run_pass(&mut self) -> Result<PassSummary> {
        self.state = AuditState::Auditing;
        let begin = Instant::now();
        let mut audited = 0u64;
        let mut interrupted = false;

        let mut walk = discover(&self.config, &self.opener)?;
        while let Some(slot) = walk.next_hash_dir() {
            if let Some(replica) = slot? {
                audit_replica(&replica, &mut self.stats);
                audited += 1;
                report_if_due(&mut self.stats, &mut self.window);
            }

            tokio::task::yield_now().await;
            if *self.shutdown_rx.borrow() {
                interrupted = true;
                break;
            }
        }

        Ok(PassSummary {
            audited,
            elapsed: begin.elapsed(),
            interrupted,
        })
    }

    /// Audit only the first live replica found, then return.
    pub fn run_once(&mut self) -> Result<OnceOutcome> {
        info!("Begin container audit \"once\" mode");
        let begin = std::time::Instant::now();

        let first = discover(&self.config, &self.opener)?.next().transpose()?;
        let outcome = match first {
            None => {
                info!(devices = %self.config.devices.display(), "No containers found to audit");
                OnceOutcome::NothingToAudit
            }
            Some(replica) => {
                let path = replica.path().to_path_buf();
                match audit_replica(&replica, &mut self.stats) {
                    AuditOutcome::Passed => OnceOutcome::Passed(path),
                    AuditOutcome::Failed => OnceOutcome::Failed(path),
                }
            }
        };

        info!(
            "Container audit \"once\" mode completed: {:.02}s",
            begin.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }

    /// Sleep for `duration`; returns true if shutdown was requested instead.
    async fn sleep_or_shutdown(&mut self, duration: Duration) -> bool {
        if *self.shutdown_rx.borrow() {
            return true;
        }
        let stopped = tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            changed = self.shutdown_rx.wait_for(|stop| *stop) => changed.is_ok(),
        };
        stopped || *self.shutdown_rx.borrow()
    }

    fn dump_recon(&self, elapsed: Duration) {
        let Some(recon) = &self.recon else {
            return;
        };
        let record = PassRecord::new(elapsed, &self.stats.snapshot());
        if let Err(e) = recon.dump(&record) {
            warn!(path = %recon.path().display(), error = %e, "Failed to update recon cache");
        }
    }
}

/// Log the window counters and start a new window once the period is up
fn report_if_due(stats: &mut AuditStats, window: &mut ReportWindow) {
    let now = Instant::now();
    if !window.is_due(now) {
        return;
    }
    info!(
        passed = stats.passes(),
        failed = stats.failures(),
        "{}",
        stats.snapshot().summary()
    );
    stats.reset_window();
    window.restart(now);
}
