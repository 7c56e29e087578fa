//! crates/engine/src/report.rs
//!
//! Aggregated results of one reconciliation cycle.

use digests::{TreeDigest, Verification};

use crate::apply::AppliedOperation;
use crate::operation::Operation;

/// Counter block summarising one cycle, suitable for a single log event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    dirs_created: u64,
    files_copied: u64,
    files_deleted: u64,
    dirs_deleted: u64,
    operations_failed: u64,
    entries_skipped: u64,
}

impl ReconcileSummary {
    pub(crate) fn record(&mut self, applied: &AppliedOperation) {
        if !applied.is_applied() {
            self.operations_failed += 1;
            return;
        }
        match applied.operation() {
            Operation::CreateDir(_) => self.dirs_created += 1,
            Operation::CopyFile(_) => self.files_copied += 1,
            Operation::DeleteFile(_) => self.files_deleted += 1,
            Operation::DeleteDir(_) => self.dirs_deleted += 1,
        }
    }

    pub(crate) fn record_skipped(&mut self, count: usize) {
        self.entries_skipped += count as u64;
    }

    /// Returns the number of directories created on the replica.
    #[must_use]
    pub const fn dirs_created(&self) -> u64 {
        self.dirs_created
    }

    /// Returns the number of files copied into the replica.
    #[must_use]
    pub const fn files_copied(&self) -> u64 {
        self.files_copied
    }

    /// Returns the number of replica files deleted.
    #[must_use]
    pub const fn files_deleted(&self) -> u64 {
        self.files_deleted
    }

    /// Returns the number of replica directories deleted.
    #[must_use]
    pub const fn dirs_deleted(&self) -> u64 {
        self.dirs_deleted
    }

    /// Returns the number of operations that failed.
    #[must_use]
    pub const fn operations_failed(&self) -> u64 {
        self.operations_failed
    }

    /// Returns the number of tree entries skipped while walking the roots.
    #[must_use]
    pub const fn entries_skipped(&self) -> u64 {
        self.entries_skipped
    }

    /// Returns the number of operations the cycle executed.
    #[must_use]
    pub const fn total_operations(&self) -> u64 {
        self.dirs_created
            + self.files_copied
            + self.files_deleted
            + self.dirs_deleted
            + self.operations_failed
    }

    /// Returns `true` when at least one operation failed.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.operations_failed > 0
    }
}

/// Everything observed during one reconciliation cycle.
#[derive(Clone, Debug)]
pub struct ReconcileReport {
    operations: Vec<AppliedOperation>,
    summary: ReconcileSummary,
    verification: Verification,
}

impl ReconcileReport {
    pub(crate) const fn new(
        operations: Vec<AppliedOperation>,
        summary: ReconcileSummary,
        verification: Verification,
    ) -> Self {
        Self {
            operations,
            summary,
            verification,
        }
    }

    /// Returns every executed operation in plan order.
    #[must_use]
    pub fn operations(&self) -> &[AppliedOperation] {
        &self.operations
    }

    /// Returns the cycle counters.
    #[must_use]
    pub const fn summary(&self) -> ReconcileSummary {
        self.summary
    }

    /// Returns the streaming digest of the source tree after the cycle.
    #[must_use]
    pub const fn source_digest(&self) -> TreeDigest {
        self.verification.source_digest()
    }

    /// Returns the streaming digest of the replica tree after the cycle.
    #[must_use]
    pub const fn replica_digest(&self) -> TreeDigest {
        self.verification.replica_digest()
    }

    /// Returns `true` when the trees digested identically after the cycle.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.verification.converged()
    }

    /// Consumes the report, returning the executed operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<AppliedOperation> {
        self.operations
    }
}
