//! Dispatcher - drives the bulk engine and fans batches out to sinks

use std::num::NonZeroUsize;
use std::sync::Arc;

use bulk_engine::{BlockClassifier, Boundary, CommandBuffer};
use contracts::{
    Batch, BulkSink, Clock, LineSource, SinkConfig, SinkType, SystemClock, Token,
};
use observability::BatchStatsAggregator;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::error::DispatcherError;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::sinks::{ConsoleSink, FileSink, LogSink};
use crate::subscribers::Subscribers;

/// Create a sink from configuration
#[instrument(
    name = "dispatcher_create_sink",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink(config: &SinkConfig) -> Result<Arc<dyn BulkSink>, DispatcherError> {
    match config.sink_type {
        SinkType::Console => Ok(Arc::new(ConsoleSink::new(&config.name))),
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e))?;
            Ok(Arc::new(sink))
        }
        SinkType::Log => Ok(Arc::new(LogSink::new(&config.name))),
    }
}

/// Build every configured sink.
///
/// The caller owns the returned sinks; a dispatcher only observes them.
#[instrument(name = "dispatcher_create_sinks", skip(configs), fields(sink_count = configs.len()))]
pub fn create_sinks(configs: &[SinkConfig]) -> Result<Vec<Arc<dyn BulkSink>>, DispatcherError> {
    configs.iter().map(create_sink).collect()
}

/// Per-stream totals returned by [`Dispatcher::process_stream`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Lines read from the source
    pub lines: u64,
    /// Batches delivered while processing this stream
    pub batches: u64,
    /// Commands delivered while processing this stream
    pub commands: u64,
    /// Commands dropped because the stream ended inside a block
    pub discarded: u64,
}

/// Turns a token stream into batches and delivers them to the subscribers
pub struct Dispatcher<C: Clock = SystemClock> {
    classifier: BlockClassifier,
    buffer: CommandBuffer<C>,
    subscribers: Subscribers,
    metrics: Arc<DispatchMetrics>,
    stats: BatchStatsAggregator,
}

impl Dispatcher<SystemClock> {
    /// Create a dispatcher stamping batches with the wall clock
    pub fn new(threshold: NonZeroUsize) -> Self {
        Self::with_clock(threshold, SystemClock)
    }
}

impl<C: Clock> Dispatcher<C> {
    /// Create a dispatcher with an explicit time source
    pub fn with_clock(threshold: NonZeroUsize, clock: C) -> Self {
        Self {
            classifier: BlockClassifier::new(threshold),
            buffer: CommandBuffer::new(clock),
            subscribers: Subscribers::new(),
            metrics: Arc::new(DispatchMetrics::new()),
            stats: BatchStatsAggregator::new(),
        }
    }

    pub fn threshold(&self) -> NonZeroUsize {
        self.classifier.threshold()
    }

    /// Handle to the subscriber registry, shareable with sinks
    pub fn subscribers(&self) -> &Subscribers {
        &self.subscribers
    }

    /// Subscribe a sink. Returns `false` if it was already subscribed.
    pub fn subscribe<S: BulkSink + 'static>(&self, sink: &Arc<S>) -> bool {
        let added = self.subscribers.subscribe(sink);
        debug!(sink = %sink.name(), added, "Subscribe");
        added
    }

    /// Subscribe a type-erased sink. Returns `false` if it was already subscribed.
    pub fn subscribe_shared(&self, sink: &Arc<dyn BulkSink>) -> bool {
        let added = self.subscribers.subscribe_shared(sink);
        debug!(sink = %sink.name(), added, "Subscribe");
        added
    }

    /// Remove a sink. Removing an unknown sink is a no-op returning `false`.
    pub fn unsubscribe<S: BulkSink + ?Sized>(&self, sink: &Arc<S>) -> bool {
        self.subscribers.unsubscribe(sink)
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// Batch size statistics since creation
    pub fn stats(&self) -> &BatchStatsAggregator {
        &self.stats
    }

    /// Nesting depth of the block being read
    pub fn depth(&self) -> usize {
        self.classifier.depth()
    }

    /// Commands buffered for the batch in progress
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed one token. Every batch it closes is delivered before this returns.
    pub fn process(&mut self, token: Token) {
        trace!(kind = token.kind(), depth = self.classifier.depth(), "Token");
        let step = self.classifier.classify(token);

        if let Some(command) = step.command {
            self.buffer.push(command);
        }

        if step.discard {
            self.discard_pending("input ended inside an open block");
        }

        if let Some(boundary) = step.boundary {
            self.close_batch(boundary);
        }
    }

    /// Classify and feed one raw line
    pub fn process_line(&mut self, line: &str) {
        self.process(Token::parse(line));
    }

    /// Feed every line, then signal end of input
    pub fn process_lines<I, L>(&mut self, lines: I)
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        for line in lines {
            self.process_line(line.as_ref());
        }
        self.process(Token::EndOfInput);
    }

    /// Read `source` until exhausted, then signal end of input.
    ///
    /// On a read error the stream is abandoned without the end-of-input
    /// flush: the batch in progress is discarded and the engine returns to
    /// its idle state, so the next stream starts clean.
    #[instrument(name = "dispatcher_process_stream", skip(self, source))]
    pub fn process_stream<S: LineSource>(
        &mut self,
        mut source: S,
    ) -> Result<StreamSummary, DispatcherError> {
        let before = self.metrics.snapshot();
        let mut lines: u64 = 0;

        loop {
            let line = match source.next_line() {
                Ok(line) => line,
                Err(source) => {
                    self.classifier.reset();
                    self.discard_pending("input failed");
                    return Err(DispatcherError::Input {
                        lines_read: lines,
                        source,
                    });
                }
            };
            let Some(line) = line else { break };

            lines += 1;
            self.process_line(&line);

            if lines % 1000 == 0 {
                debug!(lines, "Dispatcher progress");
            }
        }
        self.process(Token::EndOfInput);

        let summary = summarize(lines, &before, &self.metrics.snapshot());
        info!(
            lines = summary.lines,
            batches = summary.batches,
            commands = summary.commands,
            discarded = summary.discarded,
            "Input exhausted"
        );
        Ok(summary)
    }

    fn discard_pending(&mut self, reason: &'static str) {
        let lost = self.buffer.discard();
        if lost > 0 {
            warn!(commands = lost, reason, "Partial batch discarded");
            self.metrics.add_discarded(lost);
            observability::record_commands_discarded(lost);
        }
    }

    fn close_batch(&mut self, boundary: Boundary) {
        let subscribers = &self.subscribers;
        let metrics = &self.metrics;
        let stats = &mut self.stats;
        self.buffer.flush(|batch| {
            stats.update(batch);
            dispatch_batch(subscribers, metrics, batch, boundary);
        });
    }
}

/// Deliver one batch to every live subscriber.
///
/// A failing sink is logged and counted; the remaining sinks still receive
/// the batch.
fn dispatch_batch(
    subscribers: &Subscribers,
    metrics: &DispatchMetrics,
    batch: &Batch,
    boundary: Boundary,
) {
    let snapshot = subscribers.snapshot();
    if snapshot.released > 0 {
        metrics.add_released(snapshot.released);
        for _ in 0..snapshot.released {
            observability::record_dead_subscriber();
        }
    }

    debug!(
        reason = boundary.as_str(),
        commands = batch.len(),
        sinks = snapshot.live.len(),
        "Dispatching batch"
    );
    metrics.inc_batch(batch.len());
    observability::record_batch_dispatched(batch, boundary.as_str());

    for sink in &snapshot.live {
        match sink.write(batch) {
            Ok(()) => {
                metrics.inc_write_count();
                observability::record_sink_write(sink.name(), true);
            }
            Err(e) => {
                metrics.inc_failure_count();
                observability::record_sink_write(sink.name(), false);
                error!(
                    sink = %sink.name(),
                    commands = batch.len(),
                    error = %e,
                    "Write failed"
                );
                // Continue processing - don't stop on single failure
            }
        }
    }
}

fn summarize(lines: u64, before: &MetricsSnapshot, after: &MetricsSnapshot) -> StreamSummary {
    StreamSummary {
        lines,
        batches: after.batch_count - before.batch_count,
        commands: after.command_count - before.command_count,
        discarded: after.discarded_count - before.discarded_count,
    }
}

/// Convenience function to create a dispatcher from sink configs.
///
/// Returns the dispatcher together with the sinks it is subscribed to; the
/// sinks stop receiving batches once the returned vector is dropped.
#[instrument(name = "dispatcher_create", skip(sink_configs))]
pub fn create_dispatcher(
    threshold: NonZeroUsize,
    sink_configs: &[SinkConfig],
) -> Result<(Dispatcher, Vec<Arc<dyn BulkSink>>), DispatcherError> {
    let sinks = create_sinks(sink_configs)?;
    let dispatcher = Dispatcher::new(threshold);
    for sink in &sinks {
        dispatcher.subscribe_shared(sink);
    }
    Ok((dispatcher, sinks))
}
