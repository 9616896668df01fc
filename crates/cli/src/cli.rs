//! CLI argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// bulk - groups commands read from stdin into batches
#[derive(Parser, Debug)]
#[command(
    name = "bulk",
    author,
    version,
    about = "Group stdin commands into bulks",
    long_about = "Reads one command per line from standard input and groups them into bulks.\n\n\
                  A bulk closes after BULK_SIZE commands, or when an explicit block opened\n\
                  with '{' is closed with '}'. Blocks may nest; size-based closing is\n\
                  suspended while a block is open. Each bulk is printed and appended to\n\
                  bulk<timestamp>.log."
)]
pub struct Cli {
    /// Number of commands per bulk outside explicit blocks (> 0)
    #[arg(value_name = "BULK_SIZE")]
    pub bulk_size: NonZeroUsize,

    /// Sink configuration file (TOML or JSON); replaces the default sinks
    #[arg(short, long, env = "BULK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for the default file sink
    #[arg(long, default_value = ".", env = "BULK_LOG_DIR", conflicts_with = "config")]
    pub log_dir: PathBuf,

    /// Disable the default console sink
    #[arg(long, conflicts_with = "config")]
    pub no_console: bool,

    /// Disable the default file sink
    #[arg(long, conflicts_with = "config")]
    pub no_file: bool,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, env = "BULK_VERBOSE")]
    pub verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, default_value = "compact", env = "BULK_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Prometheus metrics port (disabled when omitted)
    #[arg(long, env = "BULK_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
