//! Engine counters for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Lifetime counters of one engine instance
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Runs that entered `Running`
    runs_started: AtomicU64,
    /// Runs that ended `Cancelled`
    runs_cancelled: AtomicU64,
    /// Gateway send calls issued
    gateway_calls: AtomicU64,
    /// Attempts recorded
    attempts: AtomicU64,
    /// Attempts after the first for a recipient
    retries: AtomicU64,
}

impl EngineMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_runs_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_runs_cancelled(&self) {
        self.runs_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_gateway_calls(&self) {
        self.gateway_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an attempt; `attempt_number > 1` also counts a retry
    pub fn inc_attempts(&self, attempt_number: u32) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if attempt_number > 1 {
            self.retries.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            runs_cancelled: self.runs_cancelled.load(Ordering::Relaxed),
            gateway_calls: self.gateway_calls.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of engine metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub runs_started: u64,
    pub runs_cancelled: u64,
    pub gateway_calls: u64,
    pub attempts: u64,
    pub retries: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_counted_from_second_attempt() {
        let metrics = EngineMetrics::new();
        metrics.inc_attempts(1);
        metrics.inc_attempts(2);
        metrics.inc_attempts(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.attempts, 3);
        assert_eq!(snapshot.retries, 2);
    }
}
