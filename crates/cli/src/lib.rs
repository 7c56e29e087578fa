#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! Thin command-line front-end for the `mirsync` binary. The crate parses the
//! supported switches (`--help`/`-h`, `--version`/`-V`, `--dry-run`/`-n`,
//! `--once`, `--log-file`, `--log-level`, `--verbose`/`-v`, and
//! `--modify-window`) together with the three positional operands, installs
//! the logging pipeline, and hands control to the cycle scheduler, which
//! drives [`engine::reconcile`] until the process is interrupted.
//!
//! # Design
//!
//! The crate exposes [`run`] as the primary entry point. The function accepts
//! an iterator of arguments together with handles for standard output and
//! error, so tests can drive the full front-end in process with buffer
//! writers. A [`clap`](https://docs.rs/clap/) command definition performs the
//! parse; help and version output stay hand-rendered so the text remains
//! byte-stable across `clap` upgrades.
//!
//! # Invariants
//!
//! - [`run`] never panics; argument and startup problems surface as exit
//!   codes with a diagnostic on the error handle.
//! - Logging is installed before the first cycle, so every mutating replica
//!   action of the process is observable as a log event.
//! - The scheduler owns all waiting. A cycle failure is logged and the next
//!   cycle still runs, except under `--once` where it becomes the exit code.
//!
//! # Errors
//!
//! Unparseable arguments, a rejected interval, and an unusable source root
//! exit with [`EXIT_USAGE`]. Startup failures such as an unopenable log file
//! and `--once` cycles that abort or record failed operations exit with
//! [`EXIT_FAILURE`].
//!
//! # Examples
//!
//! ```
//! use cli::run;
//!
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = run(["mirsync", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, 0);
//! assert!(!stdout.is_empty());
//! assert!(stderr.is_empty());
//! ```

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use engine::{ApplyMode, ReconcileOptions};
use logging::{effective_level, LoggingConfig};

mod arguments;
mod scheduler;

use arguments::{parse_args, ParsedArgs};
use scheduler::{run_scheduler, SchedulerConfig};

/// Exit status when every requested cycle completed without fatal errors or
/// failed operations.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit status for invocation problems: unparseable arguments, missing
/// operands, or an unusable source root.
pub const EXIT_USAGE: i32 = 1;

/// Exit status for runtime failures, such as an unopenable log file or a
/// `--once` cycle that aborted or recorded failed operations.
pub const EXIT_FAILURE: i32 = 2;

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

/// Deterministic help text describing the supported surface.
const HELP_TEXT: &str = concat!(
    "mirsync ",
    env!("CARGO_PKG_VERSION"),
    "\n",
    "\n",
    "Usage: mirsync [OPTIONS] SOURCE REPLICA INTERVAL\n",
    "\n",
    "Periodically reconciles the REPLICA directory tree with SOURCE,\n",
    "copying new and changed files, removing entries the source no longer\n",
    "has, and repeating every INTERVAL seconds until interrupted.\n",
    "\n",
    "Arguments:\n",
    "  SOURCE    Directory tree to mirror from. Must exist at startup.\n",
    "  REPLICA   Directory tree to mirror into. Created when missing.\n",
    "  INTERVAL  Seconds between reconciliation cycles (at least 1).\n",
    "\n",
    "Options:\n",
    "  -h, --help             Show this help message and exit.\n",
    "  -V, --version          Output version information and exit.\n",
    "  -n, --dry-run          Plan and log operations without touching the replica.\n",
    "      --once             Run a single reconciliation cycle and exit.\n",
    "      --log-file FILE    Append log events to FILE as well as the console.\n",
    "      --log-level LEVEL  Base log level: error, warn, info, debug, or trace.\n",
    "  -v, --verbose          Raise the log level one step; repeatable.\n",
    "      --modify-window SECONDS\n",
    "                         Timestamp tolerance when comparing files (default 1).\n",
);

/// Runs the CLI using the provided argument iterator and output handles.
///
/// The returned value is the process exit code the caller should report;
/// [`exit_code_from`] converts it into a [`std::process::ExitCode`]. Unless
/// `--once`, `--help`, or `--version` is given, the call blocks for the
/// lifetime of the process.
#[must_use]
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    match parse_args(arguments) {
        Ok(parsed) => execute(parsed, stdout, stderr),
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            let _ = writeln!(stderr, "Try 'mirsync --help' for more information.");
            EXIT_USAGE
        }
    }
}

fn execute<Out, Err>(parsed: ParsedArgs, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    let ParsedArgs {
        show_help,
        show_version,
        source,
        replica,
        interval_secs,
        log_file,
        log_level,
        verbosity,
        modify_window_secs,
        dry_run,
        once,
    } = parsed;

    if show_help {
        return if stdout.write_all(HELP_TEXT.as_bytes()).is_ok() {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        };
    }

    if show_version {
        return if writeln!(stdout, "mirsync {}", env!("CARGO_PKG_VERSION")).is_ok() {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        };
    }

    let (Some(source), Some(replica), Some(interval_secs)) = (source, replica, interval_secs)
    else {
        let _ = writeln!(stderr, "mirsync: the SOURCE, REPLICA, and INTERVAL operands are required");
        let _ = writeln!(stderr, "Try 'mirsync --help' for more information.");
        return EXIT_USAGE;
    };

    let mut logging_config =
        LoggingConfig::new().with_level(effective_level(log_level.unwrap_or_default(), verbosity));
    if let Some(path) = log_file {
        logging_config = logging_config.with_log_file(path);
    }
    if let Err(error) = logging::init(&logging_config) {
        let _ = writeln!(stderr, "mirsync: {error}");
        return EXIT_FAILURE;
    }

    match fs::metadata(&source) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => {
            let _ = writeln!(
                stderr,
                "mirsync: source root '{}' is not a directory",
                source.display()
            );
            return EXIT_USAGE;
        }
        Err(error) => {
            let _ = writeln!(
                stderr,
                "mirsync: cannot use source root '{}': {error}",
                source.display()
            );
            return EXIT_USAGE;
        }
    }

    let options = ReconcileOptions::new()
        .with_modify_window(Duration::from_secs(modify_window_secs))
        .with_mode(if dry_run {
            ApplyMode::DryRun
        } else {
            ApplyMode::Apply
        });
    let config = SchedulerConfig {
        source,
        replica,
        interval: Duration::from_secs(interval_secs),
        options,
        once,
    };
    run_scheduler(&config)
}

/// Maps an exit status from [`run`] onto [`std::process::ExitCode`].
#[must_use]
pub fn exit_code_from(status: i32) -> ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    ExitCode::from(clamped as u8)
}
