//! # Bulk Engine
//!
//! Batching core: turns a token stream into closed batches.
//!
//! Responsibilities:
//! - Classify tokens (block nesting + size threshold)
//! - Accumulate commands with the batch start timestamp
//! - Hand each closed batch to a caller-supplied delivery function
//!
//! ## Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use bulk_engine::{BlockClassifier, CommandBuffer};
//! use contracts::{SystemClock, Token};
//!
//! let mut classifier = BlockClassifier::new(NonZeroUsize::new(2).unwrap());
//! let mut buffer = CommandBuffer::new(SystemClock);
//! let mut delivered = Vec::new();
//!
//! for line in ["a", "b", "c"] {
//!     let step = classifier.classify(Token::parse(line));
//!     if let Some(command) = step.command {
//!         buffer.push(command);
//!     }
//!     if step.boundary.is_some() {
//!         buffer.flush(|batch| delivered.push(batch.joined()));
//!     }
//! }
//! assert_eq!(delivered, vec!["a, b".to_string()]);
//! ```

mod buffer;
mod classifier;

pub use buffer::CommandBuffer;
pub use classifier::{BlockClassifier, Boundary, Step};

// Re-export contracts types
pub use contracts::{Batch, Clock, Command, ManualClock, SystemClock, Token};
