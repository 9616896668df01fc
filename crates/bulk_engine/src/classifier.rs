//! Token classifier: block nesting + size threshold state machine.

use std::num::NonZeroUsize;

use contracts::{Command, Token};
use tracing::{debug, trace};

/// Why the current batch is being closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Threshold reached outside any block
    SizeReached,
    /// A block opened at depth 0; closes the loose commands before it
    BlockOpened,
    /// The outermost block closed
    BlockClosed,
    /// Input exhausted at depth 0
    EndOfInput,
}

impl Boundary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SizeReached => "size_reached",
            Self::BlockOpened => "block_opened",
            Self::BlockClosed => "block_closed",
            Self::EndOfInput => "end_of_input",
        }
    }
}

/// Outcome of classifying one token.
///
/// The driver pushes `command` (if any) first, then closes the batch when
/// `boundary` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    /// Command to buffer
    pub command: Option<Command>,
    /// Close the current batch
    pub boundary: Option<Boundary>,
    /// Input ended inside a block: the pending commands are dropped, not delivered
    pub discard: bool,
}

impl Step {
    fn idle() -> Self {
        Self::default()
    }

    fn boundary(boundary: Boundary) -> Self {
        Self {
            boundary: Some(boundary),
            ..Self::default()
        }
    }
}

/// Classifier state machine.
///
/// `depth` counts unmatched `{` markers. `pending` counts commands added at
/// depth 0 since the last size boundary and is only meaningful at depth 0.
#[derive(Debug, Clone)]
pub struct BlockClassifier {
    threshold: NonZeroUsize,
    depth: usize,
    pending: usize,
}

impl BlockClassifier {
    pub fn new(threshold: NonZeroUsize) -> Self {
        Self {
            threshold,
            depth: 0,
            pending: 0,
        }
    }

    pub fn threshold(&self) -> NonZeroUsize {
        self.threshold
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Commands counted toward the size threshold
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn in_block(&self) -> bool {
        self.depth > 0
    }

    /// Return to the initial state
    pub fn reset(&mut self) {
        self.depth = 0;
        self.pending = 0;
    }

    /// Classify one token. Total over all tokens, never fails.
    pub fn classify(&mut self, token: Token) -> Step {
        match token {
            Token::Command(command) => self.on_command(command),
            Token::OpenBlock => self.on_open(),
            Token::CloseBlock => self.on_close(),
            Token::Blank => Step::idle(),
            Token::EndOfInput => self.on_end(),
        }
    }

    fn on_command(&mut self, command: Command) -> Step {
        if self.in_block() {
            return Step {
                command: Some(command),
                ..Step::idle()
            };
        }

        self.pending += 1;
        let boundary = if self.pending == self.threshold.get() {
            self.pending = 0;
            Some(Boundary::SizeReached)
        } else {
            None
        };

        Step {
            command: Some(command),
            boundary,
            discard: false,
        }
    }

    fn on_open(&mut self) -> Step {
        self.depth += 1;
        trace!(depth = self.depth, "Block opened");

        if self.depth == 1 {
            self.pending = 0;
            Step::boundary(Boundary::BlockOpened)
        } else {
            Step::idle()
        }
    }

    fn on_close(&mut self) -> Step {
        match self.depth {
            0 => {
                debug!("Stray close marker at depth 0 ignored");
                Step::idle()
            }
            1 => {
                self.depth = 0;
                trace!("Outermost block closed");
                Step::boundary(Boundary::BlockClosed)
            }
            _ => {
                self.depth -= 1;
                trace!(depth = self.depth, "Nested block closed");
                Step::idle()
            }
        }
    }

    fn on_end(&mut self) -> Step {
        let unterminated = self.in_block();
        if unterminated {
            debug!(depth = self.depth, "Input ended inside an open block");
        }
        self.reset();

        if unterminated {
            Step {
                discard: true,
                ..Step::idle()
            }
        } else {
            Step::boundary(Boundary::EndOfInput)
        }
    }
}
