use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::entry::{EntryKind, PathEntry};
use crate::error::SnapshotWarning;

/// Ordered collection of every readable entry under a root.
///
/// Entries are stored in depth-first preorder with directory children sorted
/// by file name, which is exactly ascending [`Path`] order: a directory entry
/// always precedes every entry beneath it, and reverse iteration visits
/// children before their parents.
#[derive(Debug)]
pub struct TreeSnapshot {
    root: PathBuf,
    entries: Vec<PathEntry>,
    index: FxHashMap<PathBuf, usize>,
    warnings: Vec<SnapshotWarning>,
}

impl TreeSnapshot {
    pub(crate) fn empty(root: PathBuf) -> Self {
        Self {
            root,
            entries: Vec::new(),
            index: FxHashMap::default(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn scan(root: PathBuf) -> Self {
        let mut snapshot = Self::empty(root);
        let full = snapshot.root.clone();
        snapshot.scan_directory(&full, Path::new(""));
        snapshot
    }

    /// Returns the root the snapshot was taken from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns every captured entry in ascending path order.
    #[must_use]
    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    /// Returns the entry at `relative`, if the snapshot captured one.
    #[must_use]
    pub fn entry(&self, relative: &Path) -> Option<&PathEntry> {
        self.index.get(relative).map(|&at| &self.entries[at])
    }

    /// Returns the kind recorded at `relative`, if any.
    #[must_use]
    pub fn kind_of(&self, relative: &Path) -> Option<EntryKind> {
        self.entry(relative).map(PathEntry::kind)
    }

    /// Returns the entries skipped during the walk.
    #[must_use]
    pub fn warnings(&self) -> &[SnapshotWarning] {
        &self.warnings
    }

    /// Returns the number of captured entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entries were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn scan_directory(&mut self, full: &Path, relative: &Path) {
        let reader = match fs::read_dir(full) {
            Ok(reader) => reader,
            Err(error) => {
                self.warn(relative, "read directory", &error);
                return;
            }
        };

        let mut children = Vec::new();
        for child in reader {
            match child {
                Ok(child) => children.push(child),
                Err(error) => self.warn(relative, "read directory entry", &error),
            }
        }
        children.sort_by_key(fs::DirEntry::file_name);

        for child in children {
            let child_relative = relative.join(child.file_name());
            // DirEntry::metadata does not traverse symlinks, so a link shows
            // up as a link here rather than as its target.
            let metadata = match child.metadata() {
                Ok(metadata) => metadata,
                Err(error) => {
                    self.warn(&child_relative, "read metadata for", &error);
                    continue;
                }
            };

            let file_type = metadata.file_type();
            if file_type.is_dir() {
                self.push(PathEntry::new(
                    child_relative.clone(),
                    EntryKind::Directory,
                    None,
                ));
                self.scan_directory(&child.path(), &child_relative);
            } else if file_type.is_file() {
                self.push(PathEntry::new(
                    child_relative,
                    EntryKind::File,
                    metadata.modified().ok(),
                ));
            } else {
                self.skip(child_relative);
            }
        }
    }

    fn push(&mut self, entry: PathEntry) {
        self.index
            .insert(entry.relative_path().to_path_buf(), self.entries.len());
        self.entries.push(entry);
    }

    fn warn(&mut self, relative: &Path, action: &'static str, error: &std::io::Error) {
        let warning =
            SnapshotWarning::new(relative.to_path_buf(), action, error.to_string());
        tracing::warn!(path = %warning.relative_path().display(), "{warning}");
        self.warnings.push(warning);
    }

    fn skip(&mut self, relative: PathBuf) {
        let warning = SnapshotWarning::new(
            relative,
            "mirror",
            "not a regular file or directory".to_string(),
        );
        tracing::warn!(path = %warning.relative_path().display(), "{warning}");
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use crate::{EntryKind, SnapshotBuilder};
    use std::fs;
    use std::path::Path;

    fn paths(tree: &crate::TreeSnapshot) -> Vec<String> {
        tree.entries()
            .iter()
            .map(|entry| entry.relative_path().display().to_string())
            .collect()
    }

    #[test]
    fn entries_are_in_preorder_with_sorted_siblings() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        fs::create_dir_all(root.join("b/inner")).expect("create dirs");
        fs::create_dir(root.join("a")).expect("create dir");
        fs::write(root.join("a/z.txt"), b"z").expect("write file");
        fs::write(root.join("b/inner/deep.txt"), b"deep").expect("write file");
        fs::write(root.join("top.txt"), b"top").expect("write file");

        let tree = SnapshotBuilder::new(root).build().expect("build snapshot");
        assert_eq!(
            paths(&tree),
            vec!["a", "a/z.txt", "b", "b/inner", "b/inner/deep.txt", "top.txt"]
        );
    }

    #[test]
    fn files_carry_modified_at_and_directories_do_not() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        fs::create_dir(root.join("dir")).expect("create dir");
        fs::write(root.join("dir/file.txt"), b"data").expect("write file");

        let tree = SnapshotBuilder::new(root).build().expect("build snapshot");
        let dir = tree.entry(Path::new("dir")).expect("dir entry");
        let file = tree.entry(Path::new("dir/file.txt")).expect("file entry");
        assert_eq!(dir.kind(), EntryKind::Directory);
        assert!(dir.modified_at().is_none());
        assert_eq!(file.kind(), EntryKind::File);
        assert!(file.modified_at().is_some());
    }

    #[test]
    fn kind_lookup_distinguishes_files_and_directories() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        fs::create_dir(root.join("dir")).expect("create dir");
        fs::write(root.join("file"), b"data").expect("write file");

        let tree = SnapshotBuilder::new(root).build().expect("build snapshot");
        assert_eq!(tree.kind_of(Path::new("dir")), Some(EntryKind::Directory));
        assert_eq!(tree.kind_of(Path::new("file")), Some(EntryKind::File));
        assert_eq!(tree.kind_of(Path::new("missing")), None);
    }

    #[test]
    fn empty_directory_is_captured() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        fs::create_dir_all(root.join("a/c")).expect("create dirs");
        fs::write(root.join("a/b.txt"), b"payload").expect("write file");

        let tree = SnapshotBuilder::new(root).build().expect("build snapshot");
        assert_eq!(paths(&tree), vec!["a", "a/b.txt", "a/c"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_inside_the_tree_are_skipped_with_a_warning() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        fs::write(root.join("real.txt"), b"data").expect("write file");
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt"))
            .expect("create symlink");

        let tree = SnapshotBuilder::new(root).build().expect("build snapshot");
        assert_eq!(paths(&tree), vec!["real.txt"]);
        assert_eq!(tree.warnings().len(), 1);
        assert_eq!(tree.warnings()[0].relative_path(), Path::new("link.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subtree_is_skipped_with_a_warning() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        let locked = root.join("locked");
        fs::create_dir(&locked).expect("create dir");
        fs::write(locked.join("hidden.txt"), b"data").expect("write file");
        fs::write(root.join("visible.txt"), b"data").expect("write file");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))
            .expect("lock directory");

        // A privileged process can read the directory regardless; there is no
        // failure to provoke in that case.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))
                .expect("unlock directory");
            return;
        }

        let tree = SnapshotBuilder::new(root).build().expect("build snapshot");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))
            .expect("unlock directory");

        assert_eq!(paths(&tree), vec!["locked", "visible.txt"]);
        assert_eq!(tree.warnings().len(), 1);
        assert_eq!(tree.warnings()[0].relative_path(), Path::new("locked"));
        assert_eq!(tree.warnings()[0].action(), "read directory");
    }

    #[test]
    fn modified_at_reflects_the_on_disk_timestamp() {
        use filetime::FileTime;
        use std::time::{Duration, SystemTime};

        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        fs::write(root.join("old.txt"), b"data").expect("write file");
        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        filetime::set_file_mtime(root.join("old.txt"), FileTime::from_system_time(stamp))
            .expect("set mtime");

        let tree = SnapshotBuilder::new(root).build().expect("build snapshot");
        let entry = tree.entry(Path::new("old.txt")).expect("file entry");
        assert_eq!(entry.modified_at(), Some(stamp));
    }

    #[test]
    fn snapshots_of_the_same_tree_are_identical() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        fs::create_dir_all(root.join("x/y")).expect("create dirs");
        fs::write(root.join("x/one.txt"), b"1").expect("write file");
        fs::write(root.join("x/y/two.txt"), b"2").expect("write file");

        let first = SnapshotBuilder::new(root).build().expect("first snapshot");
        let second = SnapshotBuilder::new(root).build().expect("second snapshot");
        assert_eq!(first.entries(), second.entries());
    }
}
