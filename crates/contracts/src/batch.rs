//! Batch - Command Buffer output
//!
//! A closed, ordered group of commands tagged with the time it started accumulating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Command;

/// Separator between commands when a batch is rendered as one line
pub const COMMAND_SEPARATOR: &str = ", ";

/// Completed batch ("bulk") of commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Time the first command of this batch was buffered
    started_at: DateTime<Utc>,
    /// Commands in arrival order
    commands: Vec<Command>,
}

impl Batch {
    pub fn new(started_at: DateTime<Utc>, commands: Vec<Command>) -> Self {
        Self {
            started_at,
            commands,
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Start time as whole seconds since the Unix epoch
    pub fn unix_timestamp(&self) -> i64 {
        self.started_at.timestamp()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Render the commands as `a, b, c`
    pub fn joined(&self) -> String {
        self.commands
            .iter()
            .map(Command::as_str)
            .collect::<Vec<_>>()
            .join(COMMAND_SEPARATOR)
    }
}
