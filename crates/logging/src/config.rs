//! crates/logging/src/config.rs
//! Destination and threshold configuration for the subscriber.

use std::path::{Path, PathBuf};

use crate::level::LogLevel;

/// Where log events go and which severities are emitted.
#[derive(Clone, Debug, Default)]
pub struct LoggingConfig {
    level: LogLevel,
    log_file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Creates a configuration with the default level and no log file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the severity threshold.
    #[must_use]
    pub const fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Duplicates all events into `path`, appending to an existing file.
    #[must_use]
    pub fn with_log_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Returns the configured severity threshold.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Returns the configured log file, if any.
    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}
