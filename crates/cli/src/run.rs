//! Batching run: stdin -> dispatcher -> sinks.

use contracts::{SinkConfig, SinkType};
use dispatcher::{create_dispatcher, ReaderSource, StreamSummary};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Sinks to subscribe: from the config file if given, else console + file
pub fn resolve_sinks(cli: &Cli) -> Result<Vec<SinkConfig>> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(CliError::config_not_found(path.display().to_string()));
        }
        info!(config = %path.display(), "Loading sink configuration");
        let config = config_loader::ConfigLoader::load_from_path(path)?;
        return Ok(config.sinks);
    }

    let mut sinks = Vec::with_capacity(2);
    if !cli.no_console {
        sinks.push(SinkConfig::new("console", SinkType::Console));
    }
    if !cli.no_file {
        sinks.push(
            SinkConfig::new("file", SinkType::File)
                .with_param("dir", cli.log_dir.display().to_string()),
        );
    }
    Ok(sinks)
}

/// Read stdin until exhausted, delivering every bulk to the configured sinks
pub fn run(cli: &Cli) -> Result<StreamSummary> {
    let sink_configs = resolve_sinks(cli)?;
    if sink_configs.is_empty() {
        warn!("No sinks configured, bulks will be discarded");
    }

    // `_sinks` owns the sinks; the dispatcher only holds weak handles
    let (mut dispatcher, _sinks) = create_dispatcher(cli.bulk_size, &sink_configs)?;

    info!(
        bulk_size = cli.bulk_size.get(),
        sinks = dispatcher.subscribers().len(),
        "Reading commands from stdin"
    );

    let summary = dispatcher.process_stream(ReaderSource::stdin())?;

    let metrics = dispatcher.metrics().snapshot();
    if metrics.failure_count > 0 {
        warn!(failures = metrics.failure_count, "Some sink writes failed");
    }
    if summary.discarded > 0 {
        warn!(
            commands = summary.discarded,
            "Input ended inside an open block, trailing commands were not delivered"
        );
    }
    info!(stats = %dispatcher.stats().summary(), "Run complete");

    Ok(summary)
}
