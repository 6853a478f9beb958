//! DispatchEngine - sequential send loop with retries, pacing and cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use contracts::{
    AttemptOutcome, AttemptResult, ContractError, DispatchEvent, DispatchJob, GatewayClient,
    Recipient, RecipientOutcome, RunState, RunSummary, SendError,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::{DispatcherError, Result};
use crate::handle::RunHandle;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::pacing::{self, JitterSource, RandomJitter, RETRY_DELAY};
use crate::reporter::ResultReporter;

/// How a recipient's processing ended
enum Flow {
    Continue,
    Cancelled,
}

/// Clears the engine's active flag when the run ends
struct ActiveRunGuard {
    active: Arc<AtomicBool>,
}

impl Drop for ActiveRunGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Batch dispatch engine
///
/// One run at a time per instance. Recipients, attempts and attachments are
/// processed strictly in order, with at most one gateway call in flight.
pub struct DispatchEngine<G> {
    gateway: Arc<G>,
    reporter: ResultReporter,
    jitter: Arc<dyn JitterSource>,
    events: Option<mpsc::UnboundedSender<DispatchEvent>>,
    state: Arc<RwLock<RunState>>,
    active: Arc<AtomicBool>,
    metrics: Arc<EngineMetrics>,
}

impl<G> Clone for DispatchEngine<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            reporter: self.reporter.clone(),
            jitter: Arc::clone(&self.jitter),
            events: self.events.clone(),
            state: Arc::clone(&self.state),
            active: Arc::clone(&self.active),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<G> DispatchEngine<G>
where
    G: GatewayClient + Send + Sync + 'static,
{
    /// Create an engine with random jitter and no event channel
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            reporter: ResultReporter::new(),
            jitter: Arc::new(RandomJitter),
            events: None,
            state: Arc::new(RwLock::new(RunState::Idle)),
            active: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    /// Replace the jitter source
    pub fn with_jitter(mut self, jitter: impl JitterSource + 'static) -> Self {
        self.jitter = Arc::new(jitter);
        self
    }

    /// Stream progress events to `tx`
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<DispatchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a run is active
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Live statistics handle, shared with every run of this engine
    pub fn reporter(&self) -> &ResultReporter {
        &self.reporter
    }

    /// Lifetime counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Run `job` on the current task until it completes or `cancel` fires
    ///
    /// # Errors
    /// - `RunAlreadyInProgress`: another run is active on this engine
    /// - `NotReady`: readiness probe failed, nothing was sent
    pub async fn run(&self, job: DispatchJob, cancel: CancellationToken) -> Result<RunSummary> {
        let guard = self.acquire()?;
        self.execute(job, cancel, guard).await
    }

    /// Run `job` on a dedicated task
    ///
    /// `RunAlreadyInProgress` is returned synchronously; `NotReady` surfaces
    /// from `RunHandle::wait`.
    pub fn spawn(&self, job: DispatchJob) -> Result<RunHandle> {
        let guard = self.acquire()?;
        let cancel = CancellationToken::new();
        let engine = self.clone();
        let token = cancel.clone();

        let task = tokio::spawn(async move { engine.execute(job, token, guard).await });

        Ok(RunHandle::new(
            cancel,
            self.reporter.clone(),
            Arc::clone(&self.state),
            task,
        ))
    }

    fn acquire(&self) -> Result<ActiveRunGuard> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DispatcherError::from(ContractError::RunAlreadyInProgress))?;
        Ok(ActiveRunGuard {
            active: Arc::clone(&self.active),
        })
    }

    #[instrument(
        name = "dispatch_run",
        skip(self, job, cancel, _guard),
        fields(recipients = job.recipients().len())
    )]
    async fn execute(
        &self,
        job: DispatchJob,
        cancel: CancellationToken,
        _guard: ActiveRunGuard,
    ) -> Result<RunSummary> {
        self.ensure_ready().await?;

        let started = Instant::now();
        let total = job.recipients().len();
        self.reporter.begin_run(total);
        self.set_state(RunState::Running);
        self.metrics.inc_runs_started();
        self.emit(DispatchEvent::RunStarted { total });
        info!(
            total,
            calls_per_attempt = job.calls_per_attempt(),
            max_attempts = job.settings().max_attempts_per_recipient,
            "dispatch run started"
        );

        let mut flow = Flow::Continue;
        for (index, recipient) in job.recipients().iter().enumerate() {
            flow = self.process_recipient(index, recipient, &job, &cancel).await;
            if matches!(flow, Flow::Cancelled) {
                break;
            }

            if index + 1 < total {
                let seconds = pacing::inter_recipient_delay(job.settings(), self.jitter.as_ref());
                if seconds > 0 {
                    self.emit(DispatchEvent::Waiting {
                        seconds,
                        retry: false,
                    });
                }
                if !pacing::cancellable_sleep(Duration::from_secs(seconds), &cancel).await {
                    flow = Flow::Cancelled;
                    break;
                }
            }
        }

        let state = match flow {
            Flow::Continue => RunState::Completed,
            Flow::Cancelled => {
                self.metrics.inc_runs_cancelled();
                RunState::Cancelled
            }
        };
        self.set_state(state);

        let summary = RunSummary {
            state,
            statistics: self.reporter.snapshot(),
            attempts: self.reporter.attempt_count(),
            duration: started.elapsed(),
        };
        info!(
            state = state.as_str(),
            succeeded = summary.statistics.succeeded,
            failed = summary.statistics.failed,
            attempts = summary.attempts,
            "dispatch run finished"
        );
        self.emit(DispatchEvent::RunFinished(summary.clone()));
        Ok(summary)
    }

    async fn ensure_ready(&self) -> Result<()> {
        match self.gateway.check_ready().await {
            Ok(true) => Ok(()),
            Ok(false) => {
                Err(ContractError::not_ready("gateway session is not authenticated").into())
            }
            Err(e) => Err(ContractError::not_ready(format!("gateway unreachable: {e}")).into()),
        }
    }

    #[instrument(
        name = "dispatch_recipient",
        skip(self, recipient, job, cancel),
        fields(number = %recipient.normalized_number)
    )]
    async fn process_recipient(
        &self,
        index: usize,
        recipient: &Recipient,
        job: &DispatchJob,
        cancel: &CancellationToken,
    ) -> Flow {
        let max_attempts = job.settings().max_attempts_per_recipient;
        let mut last_error = String::new();
        self.reporter.begin_recipient();

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Flow::Cancelled;
            }

            self.emit(DispatchEvent::AttemptStarted {
                index,
                number: recipient.normalized_number.clone(),
                attempt,
                max_attempts,
            });

            let attempt_started = Instant::now();
            let Some(outcome) = self.attempt(recipient, job, cancel).await else {
                debug!(attempt, "attempt abandoned on cancellation");
                return Flow::Cancelled;
            };

            let result = AttemptResult {
                recipient: recipient.clone(),
                attempt_number: attempt,
                outcome: outcome.clone(),
                elapsed_millis: attempt_started.elapsed().as_millis() as u64,
            };
            self.metrics.inc_attempts(attempt);
            self.reporter.record(result.clone());
            self.emit(DispatchEvent::AttemptFinished(result));

            match outcome.error_message() {
                None => {
                    debug!(attempt, "recipient succeeded");
                    self.finalize(index, recipient, RecipientOutcome::Succeeded);
                    return Flow::Continue;
                }
                Some(message) => {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %message,
                        kind = outcome.kind(),
                        "attempt failed"
                    );
                    last_error = message.to_string();
                }
            }

            if attempt < max_attempts {
                if cancel.is_cancelled() {
                    return Flow::Cancelled;
                }
                self.emit(DispatchEvent::Waiting {
                    seconds: RETRY_DELAY.as_secs(),
                    retry: true,
                });
                if !pacing::cancellable_sleep(RETRY_DELAY, cancel).await {
                    return Flow::Cancelled;
                }
            }
        }

        self.finalize(index, recipient, RecipientOutcome::Failed(last_error));
        Flow::Continue
    }

    /// One attempt: text first, then attachments in order
    ///
    /// Attachments are sent even when the text call failed; the first failing
    /// attachment stops the rest. Returns `None` when cancelled between calls.
    async fn attempt(
        &self,
        recipient: &Recipient,
        job: &DispatchJob,
        cancel: &CancellationToken,
    ) -> Option<AttemptOutcome> {
        let number = recipient.normalized_number.as_str();
        let mut calls_made = 0usize;

        let mut text_error: Option<SendError> = None;
        if let Some(text) = job.text_body() {
            self.metrics.inc_gateway_calls();
            calls_made += 1;
            if let Err(e) = self.gateway.send_text(number, text).await {
                text_error = Some(e);
            }
        }

        let mut file_error: Option<SendError> = None;
        for attachment in job.attachments() {
            if calls_made > 0 && cancel.is_cancelled() {
                return None;
            }
            self.metrics.inc_gateway_calls();
            calls_made += 1;
            if let Err(e) = self.gateway.send_file(number, attachment).await {
                debug!(file = %attachment.file_name, error = %e, "attachment failed");
                file_error = Some(e);
                break;
            }
        }

        Some(match file_error.or(text_error) {
            None => AttemptOutcome::Success,
            Some(e) => AttemptOutcome::from(&e),
        })
    }

    fn finalize(&self, index: usize, recipient: &Recipient, outcome: RecipientOutcome) {
        self.reporter.finalize(recipient, outcome.clone());
        self.emit(DispatchEvent::RecipientFinalized {
            index,
            number: recipient.normalized_number.clone(),
            outcome,
            statistics: self.reporter.snapshot(),
        });
    }

    fn set_state(&self, state: RunState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn emit(&self, event: DispatchEvent) {
        if let Some(tx) = &self.events {
            // Receiver may have been dropped; the run goes on regardless.
            let _ = tx.send(event);
        }
    }
}
