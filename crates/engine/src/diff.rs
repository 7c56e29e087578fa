//! crates/engine/src/diff.rs
//!
//! Compares two tree snapshots and plans the replica mutations that make the
//! replica mirror the source.

use std::path::Path;
use std::time::{Duration, SystemTime};

use rustc_hash::FxHashSet;
use snapshot::{EntryKind, PathEntry, TreeSnapshot};

use crate::operation::Operation;

/// Tuning knobs for plan construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffOptions {
    modify_window: Duration,
}

impl DiffOptions {
    /// Tolerance applied to modification time comparisons by default.
    pub const DEFAULT_MODIFY_WINDOW: Duration = Duration::from_secs(1);

    /// Creates options with the default staleness tolerance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            modify_window: Self::DEFAULT_MODIFY_WINDOW,
        }
    }

    /// Replaces the tolerance applied when comparing modification times.
    #[must_use]
    pub const fn with_modify_window(mut self, window: Duration) -> Self {
        self.modify_window = window;
        self
    }

    /// Returns the staleness tolerance.
    #[must_use]
    pub const fn modify_window(&self) -> Duration {
        self.modify_window
    }
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Plans the operations that make `replica` mirror `source`.
///
/// The plan is ordered so that a sequential execution never reaches an
/// operation before its filesystem preconditions hold:
///
/// 1. deletions clearing replica entries whose path the source holds with the
///    other kind, children before parents;
/// 2. directory creations, parents before children;
/// 3. file copies for replica files that are absent or stale;
/// 4. deletions of files the source no longer has;
/// 5. deletions of directories the source no longer has, children before
///    parents.
///
/// Identical trees produce an empty plan, and a plan that was applied without
/// failures diffs to an empty plan on the next cycle.
#[must_use]
pub fn diff(source: &TreeSnapshot, replica: &TreeSnapshot, options: &DiffOptions) -> Vec<Operation> {
    let mut operations = Vec::new();

    // Replica directories shadowed by a source file lose their whole subtree.
    let conflict_roots: Vec<&Path> = replica
        .entries()
        .iter()
        .filter(|entry| {
            entry.kind().is_directory()
                && source.kind_of(entry.relative_path()) == Some(EntryKind::File)
        })
        .map(PathEntry::relative_path)
        .collect();
    let under_conflict =
        |path: &Path| conflict_roots.iter().any(|root| path.starts_with(root));

    let mut replaced: FxHashSet<&Path> = FxHashSet::default();
    let mut replaced_files = Vec::new();
    let mut replaced_dirs = Vec::new();
    for entry in replica.entries() {
        let path = entry.relative_path();
        match entry.kind() {
            EntryKind::File => {
                if source.kind_of(path) == Some(EntryKind::Directory) || under_conflict(path) {
                    replaced.insert(path);
                    replaced_files.push(path.to_path_buf());
                }
            }
            EntryKind::Directory => {
                if under_conflict(path) {
                    replaced.insert(path);
                    replaced_dirs.push(path.to_path_buf());
                }
            }
        }
    }
    operations.extend(replaced_files.into_iter().map(Operation::DeleteFile));
    operations.extend(replaced_dirs.into_iter().rev().map(Operation::DeleteDir));

    for entry in source.entries() {
        if entry.kind().is_directory()
            && replica.kind_of(entry.relative_path()) != Some(EntryKind::Directory)
        {
            operations.push(Operation::CreateDir(entry.relative_path().to_path_buf()));
        }
    }

    for entry in source.entries() {
        if !entry.kind().is_file() {
            continue;
        }
        let path = entry.relative_path();
        let needs_copy = match replica.entry(path) {
            Some(existing) if existing.kind().is_file() => is_stale(
                entry.modified_at(),
                existing.modified_at(),
                options.modify_window(),
            ),
            _ => true,
        };
        if needs_copy {
            operations.push(Operation::CopyFile(path.to_path_buf()));
        }
    }

    for entry in replica.entries() {
        let path = entry.relative_path();
        if entry.kind().is_file()
            && source.kind_of(path) != Some(EntryKind::File)
            && !replaced.contains(path)
        {
            operations.push(Operation::DeleteFile(path.to_path_buf()));
        }
    }

    for entry in replica.entries().iter().rev() {
        let path = entry.relative_path();
        if entry.kind().is_directory()
            && source.kind_of(path) != Some(EntryKind::Directory)
            && !replaced.contains(path)
        {
            operations.push(Operation::DeleteDir(path.to_path_buf()));
        }
    }

    operations
}

/// Whether a replica file must be refreshed from the source.
///
/// Exact timestamp equality is too strict across filesystems with differing
/// timestamp precision; the source must be newer by more than `window` before
/// a copy is planned. Entries without a readable timestamp are refreshed.
fn is_stale(
    source_modified: Option<SystemTime>,
    replica_modified: Option<SystemTime>,
    window: Duration,
) -> bool {
    match (source_modified, replica_modified) {
        (Some(source), Some(replica)) => match source.duration_since(replica) {
            Ok(lag) => lag > window,
            Err(_) => false,
        },
        _ => true,
    }
}
