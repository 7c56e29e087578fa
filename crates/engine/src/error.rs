//! crates/engine/src/error.rs
//!
//! Fatal errors that abort a reconciliation cycle. Per-operation failures are
//! not errors; they travel inside the report.

use digests::DigestError;
use snapshot::SnapshotError;
use thiserror::Error;

/// Result type for whole-cycle reconciliation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Failures that leave a cycle without a report.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A tree root could not be walked into a snapshot.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// A verification digest walk could not start.
    #[error(transparent)]
    Digest(#[from] DigestError),
}
