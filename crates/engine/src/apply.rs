//! crates/engine/src/apply.rs
//!
//! Executes a planned operation sequence against the replica tree. Failures
//! are recorded per operation and never abort the remainder of the plan.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use filetime::FileTime;

use crate::operation::Operation;

/// Bytes moved per read while copying file contents.
const COPY_BUFFER_SIZE: usize = 128 * 1024;

/// Monotonic counter feeding unique temporary file names.
static NEXT_TEMP_FILE_ID: AtomicUsize = AtomicUsize::new(0);

/// Whether operations mutate the replica or are only reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyMode {
    /// Execute every operation against the replica tree.
    Apply,
    /// Log and record every operation without touching the filesystem.
    DryRun,
}

impl ApplyMode {
    /// Returns `true` when operations are reported instead of executed.
    #[must_use]
    pub const fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// Terminal state of one executed operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The operation completed, or would have in dry-run mode.
    Applied,
    /// The operation failed; the operations after it still ran.
    Failed(ApplyFailure),
}

/// Description of a failed operation, kept cheap enough to clone into
/// reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyFailure {
    action: &'static str,
    kind: io::ErrorKind,
    message: String,
}

impl ApplyFailure {
    fn io(action: &'static str, error: &io::Error) -> Self {
        Self {
            action,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// Returns the step that failed, such as `open source file`.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        self.action
    }

    /// Returns the [`io::ErrorKind`] reported by the failing call.
    #[must_use]
    pub const fn kind(&self) -> io::ErrorKind {
        self.kind
    }

    /// Returns the rendered operating system error.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApplyFailure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "failed to {}: {}", self.action, self.message)
    }
}

/// One planned operation together with its execution outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedOperation {
    operation: Operation,
    outcome: ApplyOutcome,
}

impl AppliedOperation {
    const fn applied(operation: Operation) -> Self {
        Self {
            operation,
            outcome: ApplyOutcome::Applied,
        }
    }

    const fn failed(operation: Operation, failure: ApplyFailure) -> Self {
        Self {
            operation,
            outcome: ApplyOutcome::Failed(failure),
        }
    }

    /// Returns the planned operation.
    #[must_use]
    pub const fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Returns how execution ended.
    #[must_use]
    pub const fn outcome(&self) -> &ApplyOutcome {
        &self.outcome
    }

    /// Returns `true` when the operation completed.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self.outcome, ApplyOutcome::Applied)
    }

    /// Returns the failure when execution did not complete.
    #[must_use]
    pub const fn failure(&self) -> Option<&ApplyFailure> {
        match &self.outcome {
            ApplyOutcome::Applied => None,
            ApplyOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Executes `operations` against the replica tree in plan order.
///
/// A missing replica root is created before the first operation. Each
/// executed operation emits exactly one log event; failures are recorded in
/// the returned list and execution continues with the next operation, leaving
/// the remaining divergence for the following cycle.
pub fn apply(
    source_root: &Path,
    replica_root: &Path,
    operations: &[Operation],
    mode: ApplyMode,
) -> Vec<AppliedOperation> {
    if !mode.is_dry_run() && !replica_root.exists() {
        match fs::create_dir_all(replica_root) {
            Ok(()) => tracing::info!(path = %replica_root.display(), "created replica root"),
            Err(error) => {
                tracing::warn!(
                    path = %replica_root.display(),
                    "failed to create replica root: {error}"
                );
            }
        }
    }

    let mut results = Vec::with_capacity(operations.len());
    for operation in operations {
        let outcome = if mode.is_dry_run() {
            Ok(())
        } else {
            execute(source_root, replica_root, operation)
        };
        match outcome {
            Ok(()) => {
                if mode.is_dry_run() {
                    tracing::info!(path = %operation.path().display(), dry_run = true, "{operation}");
                } else {
                    tracing::info!(path = %operation.path().display(), "{operation}");
                }
                results.push(AppliedOperation::applied(operation.clone()));
            }
            Err(failure) => {
                tracing::warn!(path = %operation.path().display(), "{failure}");
                results.push(AppliedOperation::failed(operation.clone(), failure));
            }
        }
    }
    results
}

fn execute(
    source_root: &Path,
    replica_root: &Path,
    operation: &Operation,
) -> Result<(), ApplyFailure> {
    match operation {
        Operation::CreateDir(path) => create_dir(&replica_root.join(path)),
        Operation::CopyFile(path) => copy_file(&source_root.join(path), &replica_root.join(path)),
        Operation::DeleteFile(path) => delete_file(&replica_root.join(path)),
        Operation::DeleteDir(path) => delete_dir(&replica_root.join(path)),
    }
}

fn create_dir(path: &Path) -> Result<(), ApplyFailure> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(error) => Err(ApplyFailure::io("create directory", &error)),
    }
}

fn delete_file(path: &Path) -> Result<(), ApplyFailure> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(ApplyFailure::io("delete file", &error)),
    }
}

fn delete_dir(path: &Path) -> Result<(), ApplyFailure> {
    match fs::remove_dir(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(ApplyFailure::io("delete directory", &error)),
    }
}

/// Copies `source` over `destination` through a hidden temporary file so the
/// destination never holds a partially written copy.
fn copy_file(source: &Path, destination: &Path) -> Result<(), ApplyFailure> {
    let mut reader =
        fs::File::open(source).map_err(|error| ApplyFailure::io("open source file", &error))?;
    let modified = reader
        .metadata()
        .map_err(|error| ApplyFailure::io("inspect source file", &error))?
        .modified()
        .ok();

    let (guard, mut writer) = ReplicaWriteGuard::new(destination)?;
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|error| ApplyFailure::io("read source file", &error))?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..read])
            .map_err(|error| ApplyFailure::io("write replica file", &error))?;
    }
    // The handle must be closed before the rename lands on Windows.
    drop(writer);
    guard.commit()?;

    if let Some(modified) = modified {
        filetime::set_file_mtime(destination, FileTime::from_system_time(modified))
            .map_err(|error| ApplyFailure::io("set replica file times", &error))?;
    }
    Ok(())
}

/// Owns an uncommitted temporary copy and removes it when dropped before
/// [`ReplicaWriteGuard::commit`] renames it into place.
struct ReplicaWriteGuard {
    temp_path: PathBuf,
    final_path: PathBuf,
    committed: bool,
}

impl ReplicaWriteGuard {
    fn new(destination: &Path) -> Result<(Self, fs::File), ApplyFailure> {
        loop {
            let unique = NEXT_TEMP_FILE_ID.fetch_add(1, AtomicOrdering::Relaxed);
            let temp_path = temporary_replica_path(destination, unique);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp_path)
            {
                Ok(file) => {
                    let guard = Self {
                        temp_path,
                        final_path: destination.to_path_buf(),
                        committed: false,
                    };
                    return Ok((guard, file));
                }
                Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {}
                Err(error) => return Err(ApplyFailure::io("stage replica file", &error)),
            }
        }
    }

    fn commit(mut self) -> Result<(), ApplyFailure> {
        match fs::rename(&self.temp_path, &self.final_path) {
            Ok(()) => {
                self.committed = true;
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
                // Windows refuses to rename over an existing file.
                let retried = fs::remove_file(&self.final_path)
                    .and_then(|()| fs::rename(&self.temp_path, &self.final_path));
                match retried {
                    Ok(()) => {
                        self.committed = true;
                        Ok(())
                    }
                    Err(retry_error) => {
                        Err(ApplyFailure::io("replace replica file", &retry_error))
                    }
                }
            }
            Err(error) => Err(ApplyFailure::io("replace replica file", &error)),
        }
    }
}

impl Drop for ReplicaWriteGuard {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

/// Builds the hidden scratch path a copy writes before renaming into place.
/// Leftovers from interrupted runs match no source entry and are deleted by a
/// later cycle's plan.
fn temporary_replica_path(destination: &Path, unique: usize) -> PathBuf {
    let file_name = destination.file_name().map_or_else(
        || String::from("replica"),
        |name| name.to_string_lossy().into_owned(),
    );
    destination.with_file_name(format!(
        ".mirsync-tmp-{file_name}-{}-{unique}",
        process::id()
    ))
}
