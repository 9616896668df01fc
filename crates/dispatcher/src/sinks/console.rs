//! ConsoleSink - prints each batch as one line

use std::io::{self, Stdout, Write};
use std::sync::{Mutex, PoisonError};

use contracts::{Batch, BulkSink, ContractError};
use tracing::instrument;

/// Prefix of every printed batch
const LINE_PREFIX: &str = "bulk: ";

/// Sink that prints `bulk: a, b, c` to a writer (stdout by default)
pub struct ConsoleSink<W: Write + Send = Stdout> {
    name: String,
    out: Mutex<W>,
}

impl ConsoleSink<Stdout> {
    /// Create a ConsoleSink writing to stdout
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_writer(name, io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Create a ConsoleSink writing to any writer
    pub fn with_writer(name: impl Into<String>, out: W) -> Self {
        Self {
            name: name.into(),
            out: Mutex::new(out),
        }
    }

    /// Consume the sink and return its writer
    pub fn into_writer(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn print(&self, batch: &Batch) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{LINE_PREFIX}{}", batch.joined())?;
        out.flush()
    }
}

impl<W: Write + Send> BulkSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "console_sink_write",
        skip(self, batch),
        fields(sink = %self.name, commands = batch.len())
    )]
    fn write(&self, batch: &Batch) -> Result<(), ContractError> {
        self.print(batch)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }
}
