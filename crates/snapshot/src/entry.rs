use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Kind of filesystem object captured by a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
}

impl EntryKind {
    /// Returns `true` for [`EntryKind::File`].
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` for [`EntryKind::Directory`].
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// One filesystem object observed during a tree walk.
///
/// Entries are identified by their path relative to the walked root. The
/// modification time is captured for regular files when the platform reports
/// one; directories always carry `None` because their timestamps churn with
/// every child mutation and carry no mirroring signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathEntry {
    relative_path: PathBuf,
    kind: EntryKind,
    modified_at: Option<SystemTime>,
}

impl PathEntry {
    pub(crate) const fn new(
        relative_path: PathBuf,
        kind: EntryKind,
        modified_at: Option<SystemTime>,
    ) -> Self {
        Self {
            relative_path,
            kind,
            modified_at,
        }
    }

    /// Returns the path relative to the walked root.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Returns the kind of the entry.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns the recorded modification time, if one was available.
    #[must_use]
    pub const fn modified_at(&self) -> Option<SystemTime> {
        self.modified_at
    }

    /// Consumes the entry and returns its relative path.
    #[must_use]
    pub fn into_relative_path(self) -> PathBuf {
        self.relative_path
    }
}
