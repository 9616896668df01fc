//! BulkSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{Batch, ContractError};

/// Batch output trait
///
/// All sink implementations must implement this trait. Sinks are shared
/// behind `Arc` by their owner and observed by the dispatcher through `Weak`,
/// so writes take `&self`.
pub trait BulkSink: Send + Sync {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one completed batch
    ///
    /// Called synchronously from the dispatch loop.
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn write(&self, batch: &Batch) -> Result<(), ContractError>;
}
