//! In-memory replica capability for tests

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::replica::{ContainerInfo, Replica, ReplicaOpener};
use crate::{Error, Result};

/// Opener whose replicas fail or report deletion by file name
#[derive(Debug, Default)]
pub struct FakeOpener {
    deleted: HashSet<String>,
    broken: HashSet<String>,
    undecidable: HashSet<String>,
    vanished: HashSet<String>,
    pub opened: RefCell<Vec<PathBuf>>,
}

impl FakeOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replicas whose file name matches report themselves deleted
    pub fn deleted(mut self, name: &str) -> Self {
        self.deleted.insert(name.to_string());
        self
    }

    /// Replicas whose file name matches fail metadata retrieval
    pub fn broken(mut self, name: &str) -> Self {
        self.broken.insert(name.to_string());
        self
    }

    /// Replicas whose file name matches fail the deletion check
    pub fn undecidable(mut self, name: &str) -> Self {
        self.undecidable.insert(name.to_string());
        self
    }

    /// Opening a matching file behaves as if it disappeared
    pub fn vanished(mut self, name: &str) -> Self {
        self.vanished.insert(name.to_string());
        self
    }
}

impl ReplicaOpener for FakeOpener {
    type Replica = FakeReplica;

    fn open(&self, path: &Path) -> Result<FakeReplica> {
        let name = file_name(path);
        if self.vanished.contains(&name) {
            return Err(Error::Io(io::Error::new(io::ErrorKind::NotFound, "vanished")));
        }
        fs::metadata(path)?;
        self.opened.borrow_mut().push(path.to_path_buf());

        Ok(FakeReplica {
            path: path.to_path_buf(),
            deleted: self.deleted.contains(&name),
            broken: self.broken.contains(&name),
            undecidable: self.undecidable.contains(&name),
        })
    }
}

#[derive(Debug)]
pub struct FakeReplica {
    path: PathBuf,
    deleted: bool,
    broken: bool,
    undecidable: bool,
}

impl FakeReplica {
    pub fn healthy(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            deleted: false,
            broken: false,
            undecidable: false,
        }
    }

    pub fn failing(path: impl Into<PathBuf>) -> Self {
        Self {
            broken: true,
            ..Self::healthy(path)
        }
    }
}

impl Replica for FakeReplica {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_deleted(&self) -> Result<bool> {
        if self.undecidable {
            return Err(Error::MissingMetadata(self.path.clone()));
        }
        Ok(self.deleted)
    }

    fn info(&self) -> Result<ContainerInfo> {
        if self.broken {
            return Err(Error::MissingMetadata(self.path.clone()));
        }
        Ok(ContainerInfo {
            account: "AUTH_test".to_string(),
            container: file_name(&self.path),
            ..Default::default()
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Create `<root>/<device>/containers/<part>/<suffix>/<hash>/<file>`
pub fn place_replica(
    root: &Path,
    device: &str,
    part: &str,
    suffix: &str,
    hash: &str,
    file: &str,
) -> PathBuf {
    let dir = root
        .join(device)
        .join("containers")
        .join(part)
        .join(suffix)
        .join(hash);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(file);
    fs::write(&path, b"replica").unwrap();
    path
}
