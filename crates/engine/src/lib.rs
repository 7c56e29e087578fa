#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! Core reconciliation engine for one-way directory mirroring. Each cycle
//! snapshots the source and replica trees, plans the operations that make the
//! replica mirror the source, executes them in order, and digests both trees
//! as a convergence check.
//!
//! # Design
//!
//! - [`diff`] compares two [`snapshot::TreeSnapshot`] values and emits
//!   [`Operation`] values ordered so every operation's preconditions are
//!   established by the operations before it.
//! - [`apply`] executes a plan against the replica, records per-operation
//!   outcomes, and never aborts on an individual failure.
//! - [`reconcile`] ties the phases together and returns a
//!   [`ReconcileReport`] with counters, outcomes, and the closing digests.
//! - File copies land through hidden temporary files renamed into place, so
//!   replica readers never observe a half-written copy.
//!
//! # Invariants
//!
//! - Plans create parent directories before their children and delete
//!   children before their parents.
//! - Reconciling identical trees plans nothing, and a plan applied without
//!   failures diffs to an empty plan on the next cycle.
//! - Only the replica tree is mutated; the source is read twice per cycle,
//!   never written.
//!
//! # Errors
//!
//! A cycle aborts with [`ReconcileError`] only when a root cannot be walked,
//! most notably a missing source root. Individual operation failures are
//! recorded in the report and retried naturally on the next cycle.
//!
//! # Examples
//!
//! ```
//! use engine::{reconcile, ReconcileOptions};
//!
//! # let temp = tempfile::tempdir().unwrap();
//! # let source = temp.path().join("source");
//! # let replica = temp.path().join("replica");
//! # std::fs::create_dir(&source).unwrap();
//! # std::fs::write(source.join("greeting.txt"), b"hello").unwrap();
//! let report = reconcile(&source, &replica, &ReconcileOptions::new())?;
//! assert_eq!(report.summary().files_copied(), 1);
//! assert!(report.converged());
//! # Ok::<(), engine::ReconcileError>(())
//! ```

mod apply;
mod diff;
mod error;
mod operation;
mod reconcile;
mod report;

pub use apply::{apply, AppliedOperation, ApplyFailure, ApplyMode, ApplyOutcome};
pub use diff::{diff, DiffOptions};
pub use error::{ReconcileError, ReconcileResult};
pub use operation::Operation;
pub use reconcile::{reconcile, ReconcileOptions};
pub use report::{ReconcileReport, ReconcileSummary};
