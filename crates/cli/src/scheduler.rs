//! crates/cli/src/scheduler.rs
//!
//! Fixed-interval cycle loop. The scheduler owns all waiting; the engine only
//! ever runs one cycle at a time.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use engine::ReconcileOptions;

use crate::{EXIT_FAILURE, EXIT_SUCCESS};

/// Everything the scheduler needs for the lifetime of the process.
#[derive(Debug)]
pub(crate) struct SchedulerConfig {
    pub(crate) source: PathBuf,
    pub(crate) replica: PathBuf,
    pub(crate) interval: Duration,
    pub(crate) options: ReconcileOptions,
    pub(crate) once: bool,
}

/// Runs reconciliation cycles until interrupted, or once under `--once`.
///
/// A cycle that aborts is logged and does not stop the scheduler; the next
/// cycle retries from scratch, so a source root that reappears heals the
/// mirror without a restart. The returned status is only reachable under
/// `--once`.
pub(crate) fn run_scheduler(config: &SchedulerConfig) -> i32 {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        source = %config.source.display(),
        replica = %config.replica.display(),
        interval_secs = config.interval.as_secs(),
        dry_run = config.options.mode().is_dry_run(),
        "mirror scheduler started"
    );

    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        let status = run_cycle(cycle, config);
        if config.once {
            return status;
        }
        thread::sleep(config.interval);
    }
}

/// Runs one cycle and reports it as a single summary event.
fn run_cycle(cycle: u64, config: &SchedulerConfig) -> i32 {
    let started = Instant::now();
    match engine::reconcile(&config.source, &config.replica, &config.options) {
        Ok(report) => {
            let summary = report.summary();
            tracing::info!(
                cycle,
                elapsed_ms = started.elapsed().as_millis() as u64,
                dirs_created = summary.dirs_created(),
                files_copied = summary.files_copied(),
                files_deleted = summary.files_deleted(),
                dirs_deleted = summary.dirs_deleted(),
                operations_failed = summary.operations_failed(),
                entries_skipped = summary.entries_skipped(),
                converged = report.converged(),
                "cycle complete"
            );
            if summary.has_failures() {
                EXIT_FAILURE
            } else {
                EXIT_SUCCESS
            }
        }
        Err(error) => {
            tracing::error!(cycle, "cycle aborted: {error}");
            EXIT_FAILURE
        }
    }
}
