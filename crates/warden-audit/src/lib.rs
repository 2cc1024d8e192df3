//! Replica Auditing Service for Warden
//!
//! Background service that checks the integrity of container replicas on a
//! storage node by:
//! - Walking every local device for container databases
//! - Reading each live replica's summary metadata
//! - Counting passes and failures and reporting them hourly
//!
//! The auditor only reads. It never repairs, moves or deletes a replica.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   Audit Daemon                       │
//! ├──────────────────────────────────────────────────────┤
//! │  ┌──────────────┐        ┌───────────────────────┐   │
//! │  │  Schedule    │        │  Discovery            │   │
//! │  │  (jitter,    │───────▶│  device / partition / │   │
//! │  │   throttle)  │        │  suffix / hash        │   │
//! │  └──────────────┘        └──────────┬────────────┘   │
//! │                                     │ one replica    │
//! │                          ┌──────────▼────────────┐   │
//! │                          │  Audit + Stats        │   │
//! │                          │  hourly report, recon │   │
//! │                          └───────────────────────┘   │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod audit;
pub mod daemon;
pub mod discovery;
pub mod error;
pub mod mount;
pub mod recon;
pub mod replica;
pub mod scheduler;
pub mod sqlite;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use audit::{audit_replica, AuditOutcome};
pub use daemon::{AuditDaemon, AuditState, OnceOutcome, PassSummary, ShutdownHandle};
pub use discovery::{discover, Discovery};
pub use error::{Error, Result};
pub use mount::is_mount;
pub use recon::{PassRecord, ReconCache};
pub use replica::{ContainerInfo, Replica, ReplicaOpener};
pub use scheduler::{AuditSchedule, ReportWindow, REPORT_INTERVAL};
pub use sqlite::{SqliteBroker, SqliteBrokerOpener};
pub use stats::{AuditSnapshot, AuditStats};
