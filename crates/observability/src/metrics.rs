//! Dispatch 指标收集模块
//!
//! 基于 DispatchEvent 收集和统计发送引擎的运行指标。

use std::collections::BTreeMap;
use std::time::Duration;

use contracts::{AttemptResult, DispatchEvent, RecipientOutcome, RunStatistics, RunSummary};
use metrics::{counter, gauge, histogram};

/// 记录一次发送尝试
///
/// 每个 AttemptResult 调用一次。
pub fn record_attempt(result: &AttemptResult) {
    counter!(
        "batch_messenger_attempts_total",
        "outcome" => result.outcome.kind()
    )
    .increment(1);

    histogram!("batch_messenger_attempt_latency_ms").record(result.elapsed_millis as f64);

    if result.attempt_number > 1 {
        counter!("batch_messenger_retries_total").increment(1);
    }
}

/// 记录收件人最终结果
pub fn record_recipient_outcome(outcome: &RecipientOutcome) {
    let status = if outcome.is_success() {
        "succeeded"
    } else {
        "failed"
    };
    counter!("batch_messenger_recipients_total", "status" => status).increment(1);
}

/// 记录实时进度 (剩余数量 + ETA)
pub fn record_progress(stats: &RunStatistics) {
    gauge!("batch_messenger_recipients_remaining").set(stats.remaining() as f64);
    gauge!("batch_messenger_eta_seconds").set(stats.estimated_remaining.as_secs_f64());
    gauge!("batch_messenger_success_rate_percent").set(stats.success_rate_percent);
}

/// 记录收件人之间 (或重试前) 的等待时长
pub fn record_delay(seconds: u64, retry: bool) {
    let kind = if retry { "retry" } else { "interval" };
    histogram!("batch_messenger_delay_seconds", "kind" => kind).record(seconds as f64);
}

/// 记录运行结束
pub fn record_run_finished(summary: &RunSummary) {
    counter!(
        "batch_messenger_runs_total",
        "state" => summary.state.as_str()
    )
    .increment(1);
    histogram!("batch_messenger_run_duration_seconds").record(summary.duration.as_secs_f64());
    record_progress(&summary.statistics);
}

/// 将引擎事件转换为指标
pub fn record_event(event: &DispatchEvent) {
    match event {
        DispatchEvent::RunStarted { total } => {
            gauge!("batch_messenger_recipients_remaining").set(*total as f64);
        }
        DispatchEvent::AttemptStarted { .. } => {}
        DispatchEvent::AttemptFinished(result) => record_attempt(result),
        DispatchEvent::RecipientFinalized {
            outcome,
            statistics,
            ..
        } => {
            record_recipient_outcome(outcome);
            record_progress(statistics);
        }
        DispatchEvent::Waiting { seconds, retry } => record_delay(*seconds, *retry),
        DispatchEvent::RunFinished(summary) => record_run_finished(summary),
    }
}

/// 发送指标聚合器
///
/// 在内存中聚合指标，便于在运行结束后输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DispatchMetricsAggregator {
    /// 尝试总数
    pub total_attempts: u64,

    /// 重试次数 (attempt_number > 1)
    pub total_retries: u64,

    /// 各结果类型的尝试数
    pub attempts_by_kind: BTreeMap<&'static str, u64>,

    /// 单次尝试耗时统计 (毫秒)
    pub attempt_latency: RunningStats,

    /// 等待时长统计 (秒)
    pub delay_stats: RunningStats,

    /// 失败原因计数
    pub error_counts: BTreeMap<String, u64>,
}

impl DispatchMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, event: &DispatchEvent) {
        match event {
            DispatchEvent::AttemptFinished(result) => {
                self.total_attempts += 1;
                if result.attempt_number > 1 {
                    self.total_retries += 1;
                }
                *self.attempts_by_kind.entry(result.outcome.kind()).or_insert(0) += 1;
                self.attempt_latency.push(result.elapsed_millis as f64);
            }
            DispatchEvent::RecipientFinalized {
                outcome: RecipientOutcome::Failed(message),
                ..
            } => {
                *self.error_counts.entry(message.clone()).or_insert(0) += 1;
            }
            DispatchEvent::Waiting { seconds, retry: false } => {
                self.delay_stats.push(*seconds as f64);
            }
            _ => {}
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_attempts: self.total_attempts,
            total_retries: self.total_retries,
            attempts_by_kind: self.attempts_by_kind.clone(),
            attempt_latency_ms: StatsSummary::from(&self.attempt_latency),
            delay_secs: StatsSummary::from(&self.delay_stats),
            error_counts: self.error_counts.clone(),
        }
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_attempts: u64,
    pub total_retries: u64,
    pub attempts_by_kind: BTreeMap<&'static str, u64>,
    pub attempt_latency_ms: StatsSummary,
    pub delay_secs: StatsSummary,
    pub error_counts: BTreeMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Metrics Summary ===")?;
        writeln!(
            f,
            "Attempts: {} ({} retries)",
            self.total_attempts, self.total_retries
        )?;
        for (kind, count) in &self.attempts_by_kind {
            writeln!(f, "  {kind}: {count}")?;
        }
        writeln!(f, "Attempt latency (ms): {}", self.attempt_latency_ms)?;
        writeln!(f, "Interval delay (s): {}", self.delay_secs)?;

        if !self.error_counts.is_empty() {
            writeln!(f, "Failure reasons:")?;
            for (message, count) in &self.error_counts {
                writeln!(f, "  {message}: {count}")?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 添加一个时长样本 (秒)
    pub fn push_duration(&mut self, value: Duration) {
        self.push(value.as_secs_f64());
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
