//! Mount point detection

use std::path::Path;

/// Check whether `path` is a mount point.
///
/// A path is a mount point when it lives on a different device than its
/// parent, or when it is its own parent (the filesystem root). Symlinks and
/// paths that cannot be inspected are never mount points.
#[cfg(unix)]
pub fn is_mount(path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    let Ok(meta) = std::fs::symlink_metadata(path) else {
        return false;
    };
    if meta.file_type().is_symlink() {
        return false;
    }
    let Ok(parent) = std::fs::metadata(path.join("..")) else {
        return false;
    };

    meta.dev() != parent.dev() || meta.ino() == parent.ino()
}

/// Check whether `path` is a mount point.
///
/// Without device ids only the filesystem root can be recognised.
#[cfg(not(unix))]
pub fn is_mount(path: &Path) -> bool {
    path.is_dir() && path.parent().is_none()
}
