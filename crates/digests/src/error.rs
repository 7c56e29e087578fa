use snapshot::SnapshotError;
use thiserror::Error;

/// Convenience alias for digest operations.
pub type DigestResult<T> = Result<T, DigestError>;

/// Error raised when a digest walk cannot start.
///
/// Per-file read failures inside the tree degrade to warnings instead; only
/// root validation problems surface here.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct DigestError(#[from] SnapshotError);
