//! ResultReporter - live statistics over the outcomes of the current run
//!
//! Single writer (the engine), many readers. Every reader gets a consistent
//! view: counts never go backward within a run and `succeeded + failed`
//! never exceeds the number of finalized recipients.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use contracts::{
    AttemptResult, ContractError, FailureRecord, Recipient, RecipientOutcome, RunStatistics,
};
use observability::RunningStats;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::export;

#[derive(Debug, Default)]
struct ReporterState {
    total: usize,
    succeeded: usize,
    failed: usize,
    attempts: Vec<AttemptResult>,
    outcomes: Vec<(Recipient, RecipientOutcome)>,
    /// Start-to-finalize durations of finalized recipients (seconds)
    timing: RunningStats,
    run_started: Option<Instant>,
    recipient_started: Option<Instant>,
    last_mutation: Option<Instant>,
}

impl ReporterState {
    fn touch(&mut self) -> Instant {
        let now = Instant::now();
        self.last_mutation = Some(now);
        now
    }

    fn statistics(&self) -> RunStatistics {
        let finalized = self.succeeded + self.failed;
        let success_rate_percent = if finalized == 0 {
            0.0
        } else {
            self.succeeded as f64 / finalized as f64 * 100.0
        };

        let elapsed_so_far = match (self.run_started, self.last_mutation) {
            (Some(start), Some(last)) => last.saturating_duration_since(start),
            _ => Duration::ZERO,
        };

        let remaining = self.total.saturating_sub(finalized);
        let estimated_remaining = if self.timing.count() == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(self.timing.mean() * remaining as f64)
        };

        RunStatistics {
            total: self.total,
            succeeded: self.succeeded,
            failed: self.failed,
            success_rate_percent,
            elapsed_so_far,
            estimated_remaining,
        }
    }
}

/// Shared, cloneable reporter handle
#[derive(Debug, Clone, Default)]
pub struct ResultReporter {
    inner: Arc<RwLock<ReporterState>>,
}

impl ResultReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the previous run and start counting a new one
    pub fn begin_run(&self, total: usize) {
        let mut state = self.write();
        *state = ReporterState {
            total,
            ..Default::default()
        };
        let now = state.touch();
        state.run_started = Some(now);
        debug!(total, "reporter reset for new run");
    }

    /// Mark the start of a recipient's first attempt
    pub fn begin_recipient(&self) {
        let mut state = self.write();
        let now = Instant::now();
        state.recipient_started = Some(now);
    }

    /// Record one attempt
    pub fn record(&self, result: AttemptResult) {
        let mut state = self.write();
        state.touch();
        state.attempts.push(result);
    }

    /// Record the final outcome of a recipient
    pub fn finalize(&self, recipient: &Recipient, outcome: RecipientOutcome) {
        let mut state = self.write();
        let now = state.touch();

        if let Some(started) = state.recipient_started.take() {
            let sample = now.saturating_duration_since(started);
            state.timing.push_duration(sample);
        }

        match &outcome {
            RecipientOutcome::Succeeded => state.succeeded += 1,
            RecipientOutcome::Failed(_) => state.failed += 1,
        }
        state.outcomes.push((recipient.clone(), outcome));
    }

    /// Fresh statistics; identical across calls with no intervening mutation
    pub fn snapshot(&self) -> RunStatistics {
        self.read().statistics()
    }

    /// All attempts of the current run, in order
    pub fn attempts(&self) -> Vec<AttemptResult> {
        self.read().attempts.clone()
    }

    /// Number of attempts of the current run
    pub fn attempt_count(&self) -> usize {
        self.read().attempts.len()
    }

    /// Final outcomes of the current run, in finalization order
    pub fn outcomes(&self) -> Vec<(Recipient, RecipientOutcome)> {
        self.read().outcomes.clone()
    }

    /// Failed recipients with their last error, in finalization order
    pub fn export_failures(&self) -> Vec<FailureRecord> {
        self.read()
            .outcomes
            .iter()
            .filter_map(|(recipient, outcome)| match outcome {
                RecipientOutcome::Failed(message) => Some(FailureRecord {
                    number: recipient.normalized_number.clone(),
                    last_error_message: message.clone(),
                }),
                RecipientOutcome::Succeeded => None,
            })
            .collect()
    }

    /// Write the failure list as CSV to `path`
    pub fn export_failures_to(&self, path: &Path) -> Result<usize, ContractError> {
        let failures = self.export_failures();
        export::write_failures_csv(path, &failures)?;
        info!(path = %path.display(), count = failures.len(), "failures exported");
        Ok(failures.len())
    }

    /// Write the failure list to a new timestamped file inside `directory`
    ///
    /// An earlier export in the same directory is never replaced.
    pub fn export_failures_in(&self, directory: &Path) -> Result<PathBuf, ContractError> {
        let failures = self.export_failures();
        let path = export::write_failures_csv_new(directory, &failures)?;
        info!(path = %path.display(), count = failures.len(), "failures exported");
        Ok(path)
    }

    fn read(&self) -> RwLockReadGuard<'_, ReporterState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ReporterState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
