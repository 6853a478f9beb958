//! `send-batch` command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{Attachment, ContractError, DispatchJob, JobSettings, Recipient};
use dispatcher::{DispatchEngine, DispatcherError, ResultReporter};
use recipients::dedupe;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::load_recipients;
use crate::cli::SendBatchArgs;
use crate::context::AppContext;
use crate::error::CliError;
use crate::progress::{print_report, ExportStatus, ProgressPrinter};

/// Execute the `send-batch` command
pub async fn run_send_batch(ctx: &AppContext, args: &SendBatchArgs) -> Result<()> {
    info!(file = %args.file.display(), "Preparing batch");

    let recipients = prepare_recipients(
        load_recipients(&args.file)?,
        ctx.config.dispatch.dedupe && !args.keep_duplicates,
    );

    let attachments = args
        .attach
        .iter()
        .map(|path| Attachment::from_path(path))
        .collect::<Result<Vec<_>, ContractError>>()
        .context("Invalid attachment")?;

    let settings = job_settings(ctx.config.dispatch.job_settings(), args);
    let job = DispatchJob::new(recipients, args.message.clone(), attachments, settings)
        .context("Invalid dispatch job")?;

    info!(
        recipients = job.recipients().len(),
        attachments = job.attachments().len(),
        text = job.text_body().is_some(),
        max_attempts = job.settings().max_attempts_per_recipient,
        interval_secs = job.settings().base_interval_secs,
        jitter = job.settings().jitter_enabled,
        "Starting dispatch"
    );

    let gateway = Arc::new(ctx.gateway()?);
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = DispatchEngine::new(gateway).with_events(tx);
    let handle = engine.spawn(job).context("Failed to start dispatch")?;
    // the event channel closes once the run task drops the last sender
    drop(engine);

    let progress = tokio::spawn(ProgressPrinter::new(ctx.quiet).consume(rx));
    let reporter = handle.reporter().clone();
    let cancel = handle.cancellation_token();

    let wait = handle.wait();
    tokio::pin!(wait);

    let outcome = tokio::select! {
        outcome = &mut wait => outcome,
        _ = setup_shutdown_signal() => {
            warn!("Shutdown signal received, stopping after the current call");
            cancel.cancel();
            wait.await
        }
    };

    let metrics = progress.await.unwrap_or_default();

    let summary = match outcome {
        Ok(summary) => summary,
        Err(DispatcherError::Contract(ContractError::NotReady { message })) => {
            return Err(
                CliError::gateway_not_ready(ctx.config.gateway.base_url.clone(), message).into(),
            );
        }
        Err(e) => return Err(CliError::dispatch(e.to_string()).into()),
    };

    let export = finish_export(
        &reporter,
        args.export.as_deref(),
        &ctx.config.export.directory,
        summary.statistics.failed,
    );
    print_report(&summary, &metrics, &export);

    info!(
        state = summary.state.as_str(),
        succeeded = summary.statistics.succeeded,
        failed = summary.statistics.failed,
        "Batch finished"
    );

    // export errors never change the exit code of a finished run
    Ok(())
}

/// Export failures after a finished run, logging instead of failing
fn finish_export(
    reporter: &ResultReporter,
    explicit: Option<&Path>,
    directory: &Path,
    failed: usize,
) -> ExportStatus {
    match export_failures(reporter, explicit, directory, failed) {
        Ok(Some(path)) => ExportStatus::Written(path),
        Ok(None) => ExportStatus::NotNeeded,
        Err(e) => {
            error!(error = %e, "Failed to export failures");
            ExportStatus::Failed(e.to_string())
        }
    }
}

/// Drop repeated numbers unless asked to keep them
fn prepare_recipients(recipients: Vec<Recipient>, drop_duplicates: bool) -> Vec<Recipient> {
    if !drop_duplicates {
        return recipients;
    }
    let before = recipients.len();
    let recipients = dedupe(recipients);
    if recipients.len() < before {
        info!(removed = before - recipients.len(), "Duplicate numbers removed");
    }
    recipients
}

/// Config defaults with command-line overrides applied
fn job_settings(defaults: JobSettings, args: &SendBatchArgs) -> JobSettings {
    JobSettings {
        max_attempts_per_recipient: args.retries.unwrap_or(defaults.max_attempts_per_recipient),
        base_interval_secs: args.interval.unwrap_or(defaults.base_interval_secs),
        jitter_enabled: defaults.jitter_enabled && !args.no_random,
    }
}

/// Explicit path always gets a file; otherwise only a run with failures does
fn export_failures(
    reporter: &ResultReporter,
    explicit: Option<&Path>,
    directory: &Path,
    failed: usize,
) -> Result<Option<PathBuf>, ContractError> {
    match explicit {
        Some(path) => {
            reporter.export_failures_to(path)?;
            Ok(Some(path.to_path_buf()))
        }
        None if failed > 0 => reporter.export_failures_in(directory).map(Some),
        None => Ok(None),
    }
}

async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
