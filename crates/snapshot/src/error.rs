use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors raised while validating the root of a tree walk.
///
/// Failures on individual entries inside the tree never surface here; they
/// are collected as [`SnapshotWarning`] values on the finished snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The root path does not exist.
    #[error("snapshot root '{}' does not exist", path.display())]
    RootMissing {
        /// Path that was expected to be a directory.
        path: PathBuf,
    },
    /// The root path exists but is not a directory.
    #[error("snapshot root '{}' is not a directory", path.display())]
    RootNotDirectory {
        /// Path that resolved to a non-directory entry.
        path: PathBuf,
    },
    /// The root path could not be inspected.
    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        /// Operation that failed.
        action: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// An entry that was skipped during a walk.
///
/// Each warning is emitted once as a `tracing` WARN event when it is recorded
/// and retained on the snapshot so reports can account for skipped entries.
#[derive(Clone, Debug)]
pub struct SnapshotWarning {
    relative_path: PathBuf,
    action: &'static str,
    message: String,
}

impl SnapshotWarning {
    pub(crate) fn new(relative_path: PathBuf, action: &'static str, message: String) -> Self {
        Self {
            relative_path,
            action,
            message,
        }
    }

    /// Returns the skipped path relative to the walked root.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Returns the operation that failed.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        self.action
    }

    /// Returns the failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SnapshotWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to {} '{}': {}",
            self.action,
            self.relative_path.display(),
            self.message
        )
    }
}
