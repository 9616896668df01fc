//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend only on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - A batch is stamped with wall-clock UTC time (`chrono::DateTime<Utc>`)
//!   taken from an injected [`Clock`] when its first command is buffered.

mod batch;
mod clock;
mod command;
mod config;
mod error;
mod sink;
mod source;

pub use batch::*;
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::*;
pub use config::*;
pub use error::*;
pub use sink::*;
pub use source::LineSource;
