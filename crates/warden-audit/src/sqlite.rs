//! SQLite-backed container replicas
//!
//! Each replica is a SQLite database with a single-row `container_stat`
//! table. Databases are opened read-only; the auditor never writes to them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::replica::{ContainerInfo, Replica, ReplicaOpener};
use crate::{Error, Result};

/// How long to wait on a locked database before giving up
pub const BROKER_TIMEOUT: Duration = Duration::from_secs(25);

const DELETION_QUERY: &str = "SELECT COALESCE(CAST(put_timestamp AS REAL), 0), \
     COALESCE(CAST(delete_timestamp AS REAL), 0), \
     COALESCE(CAST(object_count AS INTEGER), 0) \
     FROM container_stat";

const INFO_QUERY: &str = "SELECT COALESCE(CAST(account AS TEXT), ''), \
     COALESCE(CAST(container AS TEXT), ''), \
     COALESCE(CAST(created_at AS TEXT), ''), \
     COALESCE(CAST(put_timestamp AS TEXT), ''), \
     COALESCE(CAST(delete_timestamp AS TEXT), ''), \
     COALESCE(CAST(object_count AS INTEGER), 0), \
     COALESCE(CAST(bytes_used AS INTEGER), 0), \
     COALESCE(CAST(hash AS TEXT), ''), \
     COALESCE(CAST(id AS TEXT), '') \
     FROM container_stat";

/// Opens container databases read-only
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteBrokerOpener;

impl ReplicaOpener for SqliteBrokerOpener {
    type Replica = SqliteBroker;

    fn open(&self, path: &Path) -> Result<SqliteBroker> {
        // Surface a vanished file as NotFound rather than a generic CANTOPEN.
        std::fs::metadata(path)?;

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(BROKER_TIMEOUT)?;

        Ok(SqliteBroker {
            path: path.to_path_buf(),
            conn,
        })
    }
}

/// A read-only handle on one container database
#[derive(Debug)]
pub struct SqliteBroker {
    path: PathBuf,
    conn: Connection,
}

impl Replica for SqliteBroker {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_deleted(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(true);
        }

        let (put_timestamp, delete_timestamp, object_count): (f64, f64, i64) = self
            .conn
            .query_row(DELETION_QUERY, [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .optional()?
            .ok_or_else(|| Error::MissingMetadata(self.path.clone()))?;

        Ok(object_count == 0 && delete_timestamp > put_timestamp)
    }

    fn info(&self) -> Result<ContainerInfo> {
        self.conn
            .query_row(INFO_QUERY, [], |row| {
                Ok(ContainerInfo {
                    account: row.get(0)?,
                    container: row.get(1)?,
                    created_at: row.get(2)?,
                    put_timestamp: row.get(3)?,
                    delete_timestamp: row.get(4)?,
                    object_count: row.get(5)?,
                    bytes_used: row.get(6)?,
                    hash: row.get(7)?,
                    id: row.get(8)?,
                })
            })
            .optional()?
            .ok_or_else(|| Error::MissingMetadata(self.path.clone()))
    }
}
