#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `snapshot` captures the observable state of a directory tree as an ordered
//! list of entries. Each mirroring cycle builds two fresh snapshots, one per
//! root, so the downstream diff always works from current filesystem state
//! rather than cached bookkeeping. The walker enumerates regular files and
//! directories, records modification times for files, and keeps ordering
//! stable across platforms by sorting directory entries by file name before
//! descending into them.
//!
//! # Design
//!
//! - [`SnapshotBuilder`] configures a walk and validates the root. The replica
//!   side of a mirror enables [`SnapshotBuilder::missing_root_as_empty`] so a
//!   not-yet-created replica reads as an empty tree instead of an error.
//! - [`TreeSnapshot`] owns the collected [`PathEntry`] values in depth-first
//!   preorder, which coincides with ascending [`std::path::Path`] ordering, so
//!   a directory entry always precedes everything beneath it.
//! - Entries that cannot be read are skipped, not fatal: the walk records a
//!   [`SnapshotWarning`] and moves on. Only problems with the root itself
//!   surface as [`SnapshotError`].
//!
//! # Invariants
//!
//! - Relative paths never contain `..` segments and are never absolute.
//! - The snapshot never includes the root itself, only entries beneath it.
//! - [`PathEntry::modified_at`] is `None` for every directory entry.
//! - Symbolic links are never followed; links and other non-regular entries
//!   are skipped with a warning.
//!
//! # Errors
//!
//! [`SnapshotBuilder::build`] fails only when the root is missing, is not a
//! directory, or cannot be inspected. Per-entry failures inside the tree are
//! reported through [`TreeSnapshot::warnings`].

mod builder;
mod entry;
mod error;
mod tree;

pub use crate::builder::SnapshotBuilder;
pub use crate::entry::{EntryKind, PathEntry};
pub use crate::error::{SnapshotError, SnapshotResult, SnapshotWarning};
pub use crate::tree::TreeSnapshot;
