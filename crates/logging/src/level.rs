//! crates/logging/src/level.rs
//! Log level model shared between the command line and the subscriber.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

/// Severity threshold selected on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    Warn,
    /// Normal operational output.
    Info,
    /// Per-operation detail.
    Debug,
    /// Everything, including walk internals.
    Trace,
}

impl LogLevel {
    /// All levels, in ascending verbosity order.
    pub const VALUES: [Self; 5] = [
        Self::Error,
        Self::Warn,
        Self::Info,
        Self::Debug,
        Self::Trace,
    ];

    /// Returns the lowercase name used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Converts into the equivalent subscriber filter.
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a log level name is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level '{0}'; expected error, warn, info, debug, or trace")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::VALUES
            .into_iter()
            .find(|level| input.eq_ignore_ascii_case(level.as_str()))
            .ok_or_else(|| ParseLogLevelError(input.to_string()))
    }
}

/// Raises `base` one step toward [`LogLevel::Trace`] per `-v` occurrence.
///
/// The explicit `--log-level` value acts as a floor; verbosity flags can only
/// make output louder.
#[must_use]
pub fn effective_level(base: LogLevel, verbosity: u8) -> LogLevel {
    let mut level = base;
    for _ in 0..verbosity {
        level = match level {
            LogLevel::Error => LogLevel::Warn,
            LogLevel::Warn => LogLevel::Info,
            LogLevel::Info => LogLevel::Debug,
            LogLevel::Debug | LogLevel::Trace => LogLevel::Trace,
        };
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_level_name() {
        for level in LogLevel::VALUES {
            assert_eq!(level.as_str().parse::<LogLevel>(), Ok(level));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("Debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let error = "loud".parse::<LogLevel>().expect_err("must not parse");
        assert!(error.to_string().contains("loud"));
    }

    #[test]
    fn display_round_trips() {
        for level in LogLevel::VALUES {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
        }
    }

    #[test]
    fn default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn filter_mapping_is_monotonic() {
        assert_eq!(LogLevel::Error.filter(), LevelFilter::ERROR);
        assert_eq!(LogLevel::Trace.filter(), LevelFilter::TRACE);
    }

    #[test]
    fn verbosity_raises_the_level() {
        assert_eq!(effective_level(LogLevel::Info, 0), LogLevel::Info);
        assert_eq!(effective_level(LogLevel::Info, 1), LogLevel::Debug);
        assert_eq!(effective_level(LogLevel::Info, 2), LogLevel::Trace);
        assert_eq!(effective_level(LogLevel::Error, 2), LogLevel::Info);
    }

    #[test]
    fn verbosity_saturates_at_trace() {
        assert_eq!(effective_level(LogLevel::Trace, 3), LogLevel::Trace);
        assert_eq!(effective_level(LogLevel::Info, 200), LogLevel::Trace);
    }
}
