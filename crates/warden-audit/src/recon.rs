//! Recon cache: a JSON file other tools read for the latest pass statistics

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::stats::AuditSnapshot;
use crate::Result;

/// Entries written after each completed pass
#[derive(Debug, Clone, Serialize)]
pub struct PassRecord {
    /// Duration of the pass in seconds
    #[serde(rename = "container_auditor_pass_completed")]
    pub pass_completed: f64,

    /// Passes in the current reporting window
    #[serde(rename = "container_audits_passed")]
    pub passed: u64,

    /// Failures in the current reporting window
    #[serde(rename = "container_audits_failed")]
    pub failed: u64,

    /// Start of the current reporting window, RFC 3339
    #[serde(rename = "container_audits_since")]
    pub since: String,
}

impl PassRecord {
    /// Build a record from a pass duration and the window counters
    pub fn new(elapsed: Duration, snapshot: &AuditSnapshot) -> Self {
        Self {
            pass_completed: elapsed.as_secs_f64(),
            passed: snapshot.passes,
            failed: snapshot.failures,
            since: snapshot.since.to_rfc3339(),
        }
    }
}

/// Shared JSON cache file
#[derive(Debug, Clone)]
pub struct ReconCache {
    path: PathBuf,
}

impl ReconCache {
    /// Cache stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge `record` into the cache, keeping keys written by other daemons
    pub fn dump<T: Serialize>(&self, record: &T) -> Result<()> {
        let mut cache = self.load()?;
        if let Value::Object(entries) = serde_json::to_value(record)? {
            cache.extend(entries);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.tmp_path();
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&serde_json::to_vec(&Value::Object(cache))?)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Current cache contents; a missing or unreadable cache is empty
    pub fn load(&self) -> Result<Map<String, Value>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(match serde_json::from_str(&text) {
            Ok(Value::Object(entries)) => entries,
            _ => Map::new(),
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}
