#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` owns the observable side of the mirror daemon: a small
//! [`LogLevel`] model that the command line maps onto, and the installation
//! of the global `tracing` subscriber that routes every event to the console
//! and, optionally, to a log file. The rest of the workspace only ever emits
//! events through the standard `tracing` macros; nothing else knows where
//! output goes.
//!
//! # Design
//!
//! - [`LogLevel`] parses the `--log-level` argument and converts into a
//!   `tracing-subscriber` level filter. [`effective_level`] folds repeated
//!   `-v` flags on top of the explicit level.
//! - [`init`] installs a registry with a console `fmt` layer and, when a log
//!   file is configured, a second ANSI-free `fmt` layer appending to that
//!   file. Console output always remains; the file duplicates it.
//! - The default directive honours `RUST_LOG`-style overrides, so targeted
//!   diagnostics can be raised without touching the command line.
//!
//! # Invariants
//!
//! - Installing the subscriber twice in one process is a no-op, not an
//!   error, so embedding callers and tests may call [`init`] freely.
//! - [`init`] fails only when the configured log file cannot be opened.

mod config;
mod level;
mod subscriber;

pub use crate::config::LoggingConfig;
pub use crate::level::{LogLevel, ParseLogLevelError, effective_level};
pub use crate::subscriber::{LoggingError, init};
