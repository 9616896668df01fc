//! 批次分发指标收集模块
//!
//! 基于 `metrics` facade 记录运行指标，并在内存中聚合批次统计，用于运行结束时的汇总。

use contracts::Batch;
use metrics::{counter, gauge, histogram};

/// 记录一个分发给订阅者的批次
///
/// `reason` 为关闭该批次的边界类型。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_batch_dispatched;
///
/// buffer.flush(|batch| {
///     record_batch_dispatched(batch, "size_reached");
/// });
/// ```
pub fn record_batch_dispatched(batch: &Batch, reason: &'static str) {
    counter!("bulk_batches_total", "reason" => reason).increment(1);
    counter!("bulk_commands_total").increment(batch.len() as u64);
    histogram!("bulk_batch_size").record(batch.len() as f64);
    gauge!("bulk_last_batch_started_at").set(batch.unix_timestamp() as f64);
}

/// 记录一次 sink 写入
pub fn record_sink_write(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "bulk_sink_writes_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 记录因输入在块内结束而丢弃的命令数
pub fn record_commands_discarded(count: usize) {
    counter!("bulk_commands_discarded_total").increment(count as u64);
}

/// 记录一个已被所有者释放的订阅者
pub fn record_dead_subscriber() {
    counter!("bulk_dead_subscribers_total").increment(1);
}

/// 内存中的批次统计
#[derive(Debug, Clone, Default)]
pub struct BatchStatsAggregator {
    /// 已分发批次数
    pub total_batches: u64,

    /// 已分发命令数
    pub total_commands: u64,

    /// 批次大小统计
    pub size_stats: RunningStats,
}

impl BatchStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one delivered batch into the totals
    pub fn update(&mut self, batch: &Batch) {
        self.total_batches += 1;
        self.total_commands += batch.len() as u64;
        self.size_stats.push(batch.len() as f64);
    }

    pub fn summary(&self) -> BatchStatsSummary {
        BatchStatsSummary {
            total_batches: self.total_batches,
            total_commands: self.total_commands,
            min_size: self.size_stats.min(),
            max_size: self.size_stats.max(),
            mean_size: self.size_stats.mean(),
        }
    }
}

/// 批次统计摘要
#[derive(Debug, Clone, Default)]
pub struct BatchStatsSummary {
    pub total_batches: u64,
    pub total_commands: u64,
    pub min_size: f64,
    pub max_size: f64,
    pub mean_size: f64,
}

impl std::fmt::Display for BatchStatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.total_batches == 0 {
            return write!(f, "no batches delivered");
        }
        write!(
            f,
            "{} batches, {} commands (size min={}, max={}, mean={:.2})",
            self.total_batches, self.total_commands, self.min_size, self.max_size, self.mean_size
        )
    }
}

/// 在线统计计算器 (min / max / mean)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
            self.mean += (value - self.mean) / self.count as f64;
        }
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
