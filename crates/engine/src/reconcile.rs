//! crates/engine/src/reconcile.rs
//!
//! Orchestrates one mirroring cycle: snapshot both roots, plan, apply, then
//! digest both trees as a convergence check.

use std::path::Path;
use std::time::Duration;

use snapshot::SnapshotBuilder;

use crate::apply::{apply, ApplyMode};
use crate::diff::{diff, DiffOptions};
use crate::error::ReconcileResult;
use crate::report::{ReconcileReport, ReconcileSummary};

/// Per-cycle configuration shared by the scheduler and one-shot callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileOptions {
    modify_window: Duration,
    mode: ApplyMode,
}

impl ReconcileOptions {
    /// Creates options that apply operations with the default staleness
    /// tolerance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            modify_window: DiffOptions::DEFAULT_MODIFY_WINDOW,
            mode: ApplyMode::Apply,
        }
    }

    /// Replaces the tolerance applied when comparing modification times.
    #[must_use]
    pub const fn with_modify_window(mut self, window: Duration) -> Self {
        self.modify_window = window;
        self
    }

    /// Switches between applying operations and reporting them.
    #[must_use]
    pub const fn with_mode(mut self, mode: ApplyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the staleness tolerance.
    #[must_use]
    pub const fn modify_window(&self) -> Duration {
        self.modify_window
    }

    /// Returns the execution mode.
    #[must_use]
    pub const fn mode(&self) -> ApplyMode {
        self.mode
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one full mirroring cycle and reports what happened.
///
/// A missing source root is fatal. A missing replica root reconciles as an
/// empty tree and is created during apply, so a first cycle against a fresh
/// replica path populates it from scratch. Unreadable entries inside either
/// tree are skipped with a warning and counted in the summary.
///
/// The digest comparison at the end is diagnostic: divergence is logged and
/// recorded in the report, and the next cycle plans against the surviving
/// difference.
///
/// # Errors
///
/// Returns [`ReconcileError`](crate::ReconcileError) when a root snapshot or
/// the verification walk cannot start.
pub fn reconcile(
    source_root: &Path,
    replica_root: &Path,
    options: &ReconcileOptions,
) -> ReconcileResult<ReconcileReport> {
    let source = SnapshotBuilder::new(source_root).build()?;
    let replica = SnapshotBuilder::new(replica_root)
        .missing_root_as_empty(true)
        .build()?;

    let mut summary = ReconcileSummary::default();
    summary.record_skipped(source.warnings().len() + replica.warnings().len());

    let plan = diff(
        &source,
        &replica,
        &DiffOptions::new().with_modify_window(options.modify_window()),
    );
    let applied = apply(source_root, replica_root, &plan, options.mode());
    for operation in &applied {
        summary.record(operation);
    }

    let verification = digests::verify(source_root, replica_root)?;
    if !verification.converged() && !options.mode().is_dry_run() {
        tracing::warn!(
            source_digest = %verification.source_digest(),
            replica_digest = %verification.replica_digest(),
            "source and replica digests disagree after apply"
        );
    }

    Ok(ReconcileReport::new(applied, summary, verification))
}
