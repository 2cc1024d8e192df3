//! Error types for warden-audit

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for audit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while discovering or auditing replicas
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Replica database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Directory walk error
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Recon cache serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Replica has no metadata row
    #[error("No container metadata in {}", .0.display())]
    MissingMetadata(PathBuf),
}

impl Error {
    /// Whether this error means the target vanished from disk
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(e) => e.kind() == io::ErrorKind::NotFound,
            Error::Walk(e) => e
                .io_error()
                .is_some_and(|e| e.kind() == io::ErrorKind::NotFound),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let missing = Error::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(missing.is_not_found());

        let denied = Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        assert!(!denied.is_not_found());

        let meta = Error::MissingMetadata(PathBuf::from("/srv/node/sda/x.db"));
        assert!(!meta.is_not_found());
        assert!(meta.to_string().contains("/srv/node/sda/x.db"));
    }
}
