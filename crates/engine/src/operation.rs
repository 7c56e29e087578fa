//! crates/engine/src/operation.rs
//!
//! Planned replica mutations emitted by the diff and consumed by the apply
//! engine.

use std::fmt;
use std::path::{Path, PathBuf};

/// A single planned mutation of the replica tree.
///
/// Paths are relative to the reconciliation roots so the same plan can be
/// rendered against either tree. The diff orders operations so that every
/// operation's filesystem preconditions are established by the operations
/// before it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a directory; its parent already exists or was created earlier
    /// in the plan.
    CreateDir(PathBuf),
    /// Copy a file's contents and modification time from the source tree.
    CopyFile(PathBuf),
    /// Remove a file the source tree does not have.
    DeleteFile(PathBuf),
    /// Remove a directory after earlier operations emptied it.
    DeleteDir(PathBuf),
}

impl Operation {
    /// Returns the root-relative path the operation acts on.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::CreateDir(path)
            | Self::CopyFile(path)
            | Self::DeleteFile(path)
            | Self::DeleteDir(path) => path,
        }
    }

    /// Returns the verb used for log events and failure reports.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::CreateDir(_) => "create directory",
            Self::CopyFile(_) => "copy file",
            Self::DeleteFile(_) => "delete file",
            Self::DeleteDir(_) => "delete directory",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} '{}'", self.action(), self.path().display())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::path::PathBuf;

    use super::Operation;

    #[test]
    fn path_returns_the_wrapped_path() {
        let operation = Operation::CopyFile(PathBuf::from("a/b.txt"));

        assert_eq!(operation.path(), Path::new("a/b.txt"));
    }

    #[test]
    fn display_pairs_the_action_with_the_path() {
        let operation = Operation::CreateDir(PathBuf::from("a/c"));

        assert_eq!(operation.to_string(), "create directory 'a/c'");
    }
}
