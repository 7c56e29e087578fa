use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::{SnapshotError, SnapshotResult};
use crate::tree::TreeSnapshot;

/// Configures a tree walk rooted at a specific path.
///
/// The root itself may be a symbolic link to a directory; it is resolved
/// before the walk starts. Links inside the tree are never followed.
#[derive(Clone, Debug)]
pub struct SnapshotBuilder {
    root: PathBuf,
    missing_root_as_empty: bool,
}

impl SnapshotBuilder {
    /// Creates a builder that will walk the provided root.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            missing_root_as_empty: false,
        }
    }

    /// Treats a missing root as an empty tree instead of an error.
    ///
    /// The replica side of a mirror enables this so the first cycle against a
    /// not-yet-created replica plans a full population rather than failing.
    /// The source side leaves it off: a vanished source must never read as
    /// "everything was deleted".
    #[must_use]
    pub const fn missing_root_as_empty(mut self, allow: bool) -> Self {
        self.missing_root_as_empty = allow;
        self
    }

    /// Walks the root and returns the resulting [`TreeSnapshot`].
    pub fn build(self) -> SnapshotResult<TreeSnapshot> {
        match fs::metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => Ok(TreeSnapshot::scan(self.root)),
            Ok(_) => Err(SnapshotError::RootNotDirectory { path: self.root }),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                if self.missing_root_as_empty {
                    Ok(TreeSnapshot::empty(self.root))
                } else {
                    Err(SnapshotError::RootMissing { path: self.root })
                }
            }
            Err(error) => Err(SnapshotError::Io {
                action: "inspect snapshot root",
                path: self.root,
                source: error,
            }),
        }
    }
}
