//! Replica capability consumed by the auditor
//!
//! The auditor never parses replica files itself. It opens them through a
//! [`ReplicaOpener`] and asks the resulting [`Replica`] two questions: is it
//! soft-deleted, and can its summary metadata be read.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Summary metadata of one container replica
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Owning account
    pub account: String,

    /// Container name
    pub container: String,

    /// Creation timestamp
    pub created_at: String,

    /// Last PUT timestamp
    pub put_timestamp: String,

    /// Last DELETE timestamp
    pub delete_timestamp: String,

    /// Number of objects listed in the container
    pub object_count: i64,

    /// Bytes used by listed objects
    pub bytes_used: i64,

    /// Rolling hash of the object listing
    pub hash: String,

    /// Unique replica id
    pub id: String,
}

/// One opened replica database
pub trait Replica {
    /// Backing file of this replica
    fn path(&self) -> &Path;

    /// Whether the replica is marked logically deleted
    fn is_deleted(&self) -> Result<bool>;

    /// Read the replica's summary metadata
    fn info(&self) -> Result<ContainerInfo>;
}

/// Opens replica databases by path
pub trait ReplicaOpener {
    /// Replica type produced by this opener
    type Replica: Replica;

    /// Open the replica stored at `path`
    fn open(&self, path: &Path) -> Result<Self::Replica>;
}

impl<O: ReplicaOpener + ?Sized> ReplicaOpener for &O {
    type Replica = O::Replica;

    fn open(&self, path: &Path) -> Result<Self::Replica> {
        (**self).open(path)
    }
}
