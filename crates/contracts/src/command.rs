//! Command and input token types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker that opens an explicit block
pub const OPEN_BLOCK: &str = "{";

/// Marker that closes an explicit block
pub const CLOSE_BLOCK: &str = "}";

/// One unit of work.
///
/// Never empty: an empty line is a structural token, not a command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Command(String);

impl Command {
    /// Create a command, returning `None` for empty text
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Command {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Command {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "command text cannot be empty".to_string())
    }
}

impl From<Command> for String {
    fn from(command: Command) -> Self {
        command.0
    }
}

/// A single classified input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Plain command text
    Command(Command),
    /// `{`
    OpenBlock,
    /// `}`
    CloseBlock,
    /// An empty input line; carries no command and never closes a batch
    Blank,
    /// The input source is exhausted
    EndOfInput,
}

impl Token {
    /// Classify one raw input line.
    ///
    /// Lines are matched exactly; no trimming is applied.
    pub fn parse(line: &str) -> Self {
        match line {
            OPEN_BLOCK => Self::OpenBlock,
            CLOSE_BLOCK => Self::CloseBlock,
            _ => Command::new(line).map_or(Self::Blank, Self::Command),
        }
    }

    /// Short name used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Command(_) => "command",
            Self::OpenBlock => "open_block",
            Self::CloseBlock => "close_block",
            Self::Blank => "blank",
            Self::EndOfInput => "end_of_input",
        }
    }
}

impl From<Command> for Token {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}
