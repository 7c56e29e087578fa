//! crates/cli/src/arguments.rs
//!
//! Argument vocabulary and parsing for the `mirsync` front-end.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};
use logging::LogLevel;

/// Parsed command line produced by [`parse_args`].
///
/// Operands stay optional here; [`crate::run`] validates their presence after
/// the help and version switches have had their say.
#[derive(Debug)]
pub(crate) struct ParsedArgs {
    pub(crate) show_help: bool,
    pub(crate) show_version: bool,
    pub(crate) source: Option<PathBuf>,
    pub(crate) replica: Option<PathBuf>,
    pub(crate) interval_secs: Option<u64>,
    pub(crate) log_file: Option<PathBuf>,
    pub(crate) log_level: Option<LogLevel>,
    pub(crate) verbosity: u8,
    pub(crate) modify_window_secs: u64,
    pub(crate) dry_run: bool,
    pub(crate) once: bool,
}

/// Builds the `clap` command used for parsing.
fn clap_command() -> Command {
    Command::new("mirsync")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .short('n')
                .help("Plan and log operations without touching the replica.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Run a single reconciliation cycle and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Append log events to FILE as well as the console.")
                .value_parser(value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Base log level: error, warn, info, debug, or trace.")
                .value_parser(value_parser!(LogLevel))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Raise the log level one step; repeatable.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("modify-window")
                .long("modify-window")
                .value_name("SECONDS")
                .help("Timestamp tolerance when comparing files.")
                .value_parser(value_parser!(u64))
                .default_value("1")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("source")
                .value_name("SOURCE")
                .help("Directory tree to mirror from.")
                .value_parser(value_parser!(PathBuf))
                .num_args(1)
                .required(false),
        )
        .arg(
            Arg::new("replica")
                .value_name("REPLICA")
                .help("Directory tree to mirror into.")
                .value_parser(value_parser!(PathBuf))
                .num_args(1)
                .required(false),
        )
        .arg(
            Arg::new("interval")
                .value_name("INTERVAL")
                .help("Seconds between reconciliation cycles.")
                .value_parser(value_parser!(u64).range(1..))
                .num_args(1)
                .required(false),
        )
}

/// Parses command-line arguments into a [`ParsedArgs`] structure.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from("mirsync"));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;

    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        source: matches.remove_one::<PathBuf>("source"),
        replica: matches.remove_one::<PathBuf>("replica"),
        interval_secs: matches.remove_one::<u64>("interval"),
        log_file: matches.remove_one::<PathBuf>("log-file"),
        log_level: matches.remove_one::<LogLevel>("log-level"),
        verbosity: matches.get_count("verbose"),
        modify_window_secs: matches.remove_one::<u64>("modify-window").unwrap_or(1),
        dry_run: matches.get_flag("dry-run"),
        once: matches.get_flag("once"),
    })
}
