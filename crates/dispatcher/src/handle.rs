//! RunHandle - controls a run spawned on its own task

use std::sync::{Arc, PoisonError, RwLock};

use contracts::{RunState, RunStatistics, RunSummary};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument};

use crate::error::{DispatcherError, Result};
use crate::reporter::ResultReporter;

/// Handle to a running dispatch task
pub struct RunHandle {
    cancel: CancellationToken,
    reporter: ResultReporter,
    state: Arc<RwLock<RunState>>,
    task: JoinHandle<Result<RunSummary>>,
}

impl RunHandle {
    pub(crate) fn new(
        cancel: CancellationToken,
        reporter: ResultReporter,
        state: Arc<RwLock<RunState>>,
        task: JoinHandle<Result<RunSummary>>,
    ) -> Self {
        Self {
            cancel,
            reporter,
            state,
            task,
        }
    }

    /// Request cooperative cancellation
    ///
    /// A gateway call already in flight is allowed to finish.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this run, e.g. for a signal handler
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Live statistics of this run
    pub fn reporter(&self) -> &ResultReporter {
        &self.reporter
    }

    /// Shortcut for `reporter().snapshot()`
    pub fn snapshot(&self) -> RunStatistics {
        self.reporter.snapshot()
    }

    /// Engine state as last observed
    pub fn state(&self) -> RunState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the task has returned
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run to end
    #[instrument(name = "run_handle_wait", skip(self))]
    pub async fn wait(self) -> Result<RunSummary> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = ?e, "dispatch task failed");
                Err(DispatcherError::worker_failed(e.to_string()))
            }
        }
    }
}
