//! # bulk
//!
//! 命令行接口入口点。
//!
//! Provides:
//! - Bulk size argument parsing and validation
//! - Sink selection (defaults or configuration file)
//! - Logging setup and the stdin batching run

mod cli;
mod error;
mod run;

use anyhow::{Context, Result};
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::Cli;

fn main() -> Result<()> {
    // 加载 .env 文件 (如果存在)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "bulk starting");

    let result = run::run(&cli).context("bulk run failed");

    match &result {
        Ok(summary) => info!(
            lines = summary.lines,
            bulks = summary.batches,
            "bulk finished"
        ),
        Err(e) => tracing::error!(error = %e, "Command failed"),
    }

    result.map(|_| ())
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: cli.metrics_port,
        default_log_level: default_log_level.to_string(),
        force_level: cli.quiet,
    })
    .context("Failed to initialize logging")
}
