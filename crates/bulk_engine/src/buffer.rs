//! Accumulation buffer for the batch in progress.

use std::fmt;
use std::mem;

use chrono::{DateTime, Utc};
use contracts::{Batch, Clock, Command};
use tracing::trace;

/// Ordered commands of the open batch plus its start timestamp.
///
/// The timestamp is taken from the injected clock when the first command
/// lands in an empty buffer.
pub struct CommandBuffer<C> {
    clock: C,
    commands: Vec<Command>,
    started_at: Option<DateTime<Utc>>,
}

impl<C> fmt::Debug for CommandBuffer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("len", &self.commands.len())
            .field("started_at", &self.started_at)
            .finish()
    }
}

impl<C: Clock> CommandBuffer<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            commands: Vec::new(),
            started_at: None,
        }
    }

    /// Append a command, stamping the batch if it is the first one
    #[inline]
    pub fn push(&mut self, command: Command) {
        if self.started_at.is_none() {
            let now = self.clock.now();
            trace!(started_at = %now, "Batch started");
            self.started_at = Some(now);
        }
        self.commands.push(command);
    }

    /// Close the batch and hand it to `deliver`.
    ///
    /// `deliver` runs at most once, and only for a non-empty buffer. The
    /// buffer is emptied before `deliver` runs, so it is empty on return
    /// even if `deliver` unwinds.
    pub fn flush<F>(&mut self, deliver: F)
    where
        F: FnOnce(&Batch),
    {
        if let Some(batch) = self.take() {
            deliver(&batch);
        }
    }

    /// Drop the batch in progress, returning how many commands were lost
    pub fn discard(&mut self) -> usize {
        self.take().map_or(0, |batch| batch.len())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Start time of the batch in progress
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    fn take(&mut self) -> Option<Batch> {
        let started_at = self.started_at.take()?;
        let commands = mem::take(&mut self.commands);
        Some(Batch::new(started_at, commands))
    }
}
