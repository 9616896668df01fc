//! # Dispatcher
//!
//! 批次分发模块。
//!
//! 负责：
//! - 逐个 token 驱动 bulk engine
//! - Fan-out 已关闭的批次到所有存活的订阅者
//! - 隔离失败的 sink，不中断输入流
//!
//! Everything runs synchronously on the caller's thread: a `process` call
//! returns only after every subscriber has seen the batch it closed. A sink
//! that blocks stalls the whole pipeline; there is no timeout.

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod sinks;
pub mod source;
pub mod subscribers;

pub use contracts::{Batch, BulkSink, LineSource, Token};
pub use dispatcher::{create_dispatcher, create_sinks, Dispatcher, StreamSummary};
pub use error::DispatcherError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use sinks::{ConsoleSink, FileFormat, FileSink, FileSinkConfig, LogSink};
pub use source::ReaderSource;
pub use subscribers::{Snapshot, Subscribers};
