//! LogSink - logs batch summary via tracing

use contracts::{Batch, BulkSink, ContractError};
use tracing::{info, instrument};

/// Sink that logs batch summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_batch_summary(&self, batch: &Batch) {
        info!(
            sink = %self.name,
            started_at = %batch.started_at(),
            commands = batch.len(),
            content = %batch.joined(),
            "Batch received"
        );
    }
}

impl BulkSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, batch),
        fields(sink = %self.name)
    )]
    fn write(&self, batch: &Batch) -> Result<(), ContractError> {
        self.log_batch_summary(batch);
        Ok(())
    }
}
