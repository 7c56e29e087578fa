//! crates/logging/src/subscriber.rs
//! Global tracing subscriber installation.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured log file could not be opened for appending.
    #[error("failed to open log file '{}': {source}", path.display())]
    OpenLogFile {
        /// Path of the log file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Installs the global subscriber described by `config`.
///
/// Events always reach the console and, when a log file is configured, are
/// duplicated into it; neither stream carries ANSI escapes. The configured
/// level is the default directive, so `RUST_LOG`-style overrides still apply.
/// When a global subscriber is already installed the call is a no-op.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level().filter().into())
        .from_env_lossy();

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false);
    let registry = tracing_subscriber::registry().with(filter).with(console);

    if let Some(path) = config.log_file() {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|error| LoggingError::OpenLogFile {
                path: path.to_path_buf(),
                source: error,
            })?;
        let sink = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Arc::new(file));
        registry.with(sink).try_init().ok();
    } else {
        registry.try_init().ok();
    }

    Ok(())
}
