//! Lazy discovery of live replicas on local devices
//!
//! The on-disk layout is
//!
//! ```text
//! <devices>/<device>/<datadir>/<partition>/<suffix>/<hash>/<timestamp>.db
//! ```
//!
//! A [`Discovery`] walks this tree one hash directory at a time and yields at
//! most one replica per hash directory: the newest database file, unless the
//! replica reports itself deleted. Nothing is cached; every call to
//! [`discover`] re-reads the tree from scratch.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};
use warden_config::AuditorConfig;

use crate::mount::is_mount;
use crate::replica::{Replica, ReplicaOpener};
use crate::{Error, Result};

/// Depth of hash directories below a device's data directory
const HASH_DEPTH: usize = 3;

type HashDirs = walkdir::FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>;

/// Start a fresh discovery walk over every device under the devices root.
///
/// Fails only if the devices root itself cannot be listed.
pub fn discover<O: ReplicaOpener>(config: &AuditorConfig, opener: O) -> Result<Discovery<O>> {
    Discovery::new(config, opener)
}

/// Iterator over the live replicas of one pass
pub struct Discovery<O: ReplicaOpener> {
    opener: O,
    config: AuditorConfig,
    devices: fs::ReadDir,
    is_mounted: fn(&Path) -> bool,
    hashes: Option<HashDirs>,
}

impl<O: ReplicaOpener> Discovery<O> {
    /// List the devices root and prepare a walk
    pub fn new(config: &AuditorConfig, opener: O) -> Result<Self> {
        let devices = fs::read_dir(&config.devices)?;
        Ok(Self {
            opener,
            config: config.clone(),
            devices,
            is_mounted: is_mount,
            hashes: None,
        })
    }

    /// Replace the mount point check used when `mount_check` is on
    pub fn with_mount_probe(mut self, probe: fn(&Path) -> bool) -> Self {
        self.is_mounted = probe;
        self
    }

    /// Examine the next hash directory of the walk.
    ///
    /// Yields `Ok(None)` for a hash directory holding nothing to audit, so a
    /// caller stepping through the walk regains control once per directory.
    /// Returns `None` when every device has been walked.
    pub fn next_hash_dir(&mut self) -> Option<Result<Option<O::Replica>>> {
        loop {
            let Some(hashes) = self.hashes.as_mut() else {
                if let Err(e) = self.next_device()? {
                    return Some(Err(e));
                }
                continue;
            };

            match hashes.next() {
                Some(Ok(entry)) => return Some(self.replica_in(entry.path())),
                Some(Err(e)) if e.loop_ancestor().is_some() => {
                    debug!(error = %e, "Skipping directory loop during discovery");
                }
                Some(Err(e)) => {
                    let e = Error::from(e);
                    if !e.is_not_found() {
                        return Some(Err(e));
                    }
                    debug!(error = %e, "Directory vanished during discovery");
                }
                None => self.hashes = None,
            }
        }
    }

    /// Begin walking the next usable device, if any remain.
    ///
    /// Returns `Some(Err)` for listing failures, `None` once devices run out.
    fn next_device(&mut self) -> Option<Result<()>> {
        loop {
            let entry = match self.devices.next()? {
                Ok(entry) => entry,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Some(Err(e.into())),
            };

            let device_path = entry.path();
            if self.config.mount_check && !(self.is_mounted)(&device_path) {
                debug!(device = %device_path.display(), "Skipping device as it is not mounted");
                continue;
            }

            let datadir = self.config.device_datadir(entry.file_name());
            if !datadir.exists() {
                trace!(device = %device_path.display(), "Device has no data directory");
                continue;
            }

            let is_dir: fn(&DirEntry) -> bool = is_directory;
            self.hashes = Some(
                WalkDir::new(datadir)
                    .follow_links(true)
                    .min_depth(HASH_DEPTH)
                    .max_depth(HASH_DEPTH)
                    .into_iter()
                    .filter_entry(is_dir),
            );
            return Some(Ok(()));
        }
    }

    /// Pick and open the live replica in one hash directory
    fn replica_in(&self, hash_dir: &Path) -> Result<Option<O::Replica>> {
        let Some(path) = newest_db_file(hash_dir, &self.config.db_suffix)? else {
            return Ok(None);
        };

        let replica = match self.opener.open(&path) {
            Ok(replica) => replica,
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "Replica vanished before it could be opened");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match replica.is_deleted() {
            Ok(true) => {
                trace!(path = %path.display(), "Skipping deleted replica");
                Ok(None)
            }
            Ok(false) => Ok(Some(replica)),
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "Replica vanished before deletion check");
                Ok(None)
            }
            Err(e) => {
                // Deletion cannot be proven; let the audit record the failure.
                debug!(path = %path.display(), error = %e, "Could not check replica deletion status");
                Ok(Some(replica))
            }
        }
    }
}

impl<O: ReplicaOpener> Iterator for Discovery<O> {
    type Item = Result<O::Replica>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_hash_dir()? {
                Ok(Some(replica)) => return Some(Ok(replica)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn is_directory(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
}

/// Newest file in `hash_dir` ending in `suffix`, by descending file name.
///
/// A hash directory that disappeared yields `None`.
fn newest_db_file(hash_dir: &Path, suffix: &str) -> Result<Option<PathBuf>> {
    let entries = match fs::read_dir(hash_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut names: Vec<OsString> = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => names.push(entry.file_name()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }
    names.sort_unstable_by(|a, b| b.cmp(a));

    Ok(names
        .into_iter()
        .find(|name| name.as_encoded_bytes().ends_with(suffix.as_bytes()))
        .map(|name| hash_dir.join(name)))
}
