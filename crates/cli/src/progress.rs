//! Live progress lines and the final run report.

use std::path::PathBuf;
use std::time::Duration;

use contracts::{
    AttemptOutcome, DispatchEvent, RecipientOutcome, RunState, RunStatistics, RunSummary,
};
use observability::{DispatchMetricsAggregator, MetricsSummary};
use tokio::sync::mpsc;

/// Turns engine events into terminal output and metrics
#[derive(Debug)]
pub struct ProgressPrinter {
    quiet: bool,
    aggregator: DispatchMetricsAggregator,
}

impl ProgressPrinter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            aggregator: DispatchMetricsAggregator::new(),
        }
    }

    pub fn handle(&mut self, event: &DispatchEvent) {
        observability::record_event(event);
        self.aggregator.update(event);

        if self.quiet {
            return;
        }
        if let Some(line) = render_event(event) {
            println!("{line}");
        }
    }

    /// Drain the event channel until the engine drops its sender
    pub async fn consume(
        mut self,
        mut rx: mpsc::UnboundedReceiver<DispatchEvent>,
    ) -> MetricsSummary {
        while let Some(event) = rx.recv().await {
            self.handle(&event);
        }
        self.aggregator.summary()
    }
}

/// One progress line per event, `None` for events that print nothing
pub fn render_event(event: &DispatchEvent) -> Option<String> {
    match event {
        DispatchEvent::RunStarted { total } => Some(format!("▶ Sending to {total} recipient(s)")),
        DispatchEvent::AttemptStarted {
            index,
            number,
            attempt,
            max_attempts,
        } => (*attempt > 1).then(|| {
            format!("  [{}] {number}: retry {attempt}/{max_attempts}", index + 1)
        }),
        DispatchEvent::AttemptFinished(result) => match &result.outcome {
            AttemptOutcome::Success => None,
            outcome => Some(format!(
                "  ! {} attempt {} failed: {}",
                result.recipient.normalized_number,
                result.attempt_number,
                outcome.error_message().unwrap_or_default()
            )),
        },
        DispatchEvent::RecipientFinalized {
            index,
            number,
            outcome,
            statistics,
        } => {
            let status = match outcome {
                RecipientOutcome::Succeeded => format!("✓ {number}"),
                RecipientOutcome::Failed(message) => format!("✗ {number}: {message}"),
            };
            Some(format!(
                "[{}/{}] {status} | {}",
                index + 1,
                statistics.total,
                progress_line(statistics)
            ))
        }
        DispatchEvent::Waiting { seconds, retry } => {
            let reason = if *retry { "before retry" } else { "before next recipient" };
            Some(format!("  … waiting {seconds}s {reason}"))
        }
        DispatchEvent::RunFinished(_) => None,
    }
}

/// `ok 3 | failed 1 | 80.0% done | eta 00:00:12`
pub fn progress_line(stats: &RunStatistics) -> String {
    let done = if stats.total == 0 {
        0.0
    } else {
        stats.finalized() as f64 / stats.total as f64 * 100.0
    };
    format!(
        "ok {} | failed {} | {:.1}% done | eta {}",
        stats.succeeded,
        stats.failed,
        done,
        format_duration(stats.estimated_remaining)
    )
}

/// `HH:MM:SS`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Failure export of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    NotNeeded,
    Written(PathBuf),
    Failed(String),
}

/// Print the final report box
pub fn print_report(summary: &RunSummary, metrics: &MetricsSummary, export: &ExportStatus) {
    let stats = &summary.statistics;
    let title = match summary.state {
        RunState::Cancelled => "Dispatch Cancelled",
        _ => "Dispatch Report",
    };

    println!("\n╔══════════════════════════════════════════╗");
    println!("║ {title:^40} ║");
    println!("╚══════════════════════════════════════════╝\n");

    println!("📊 Overview");
    println!("   ├─ State: {}", summary.state.as_str());
    println!("   ├─ Recipients: {}", stats.total);
    println!("   ├─ Succeeded: {}", stats.succeeded);
    println!("   ├─ Failed: {}", stats.failed);
    if stats.remaining() > 0 {
        println!("   ├─ Not processed: {}", stats.remaining());
    }
    println!("   ├─ Success rate: {:.1}%", stats.success_rate_percent);
    println!("   ├─ Attempts: {}", summary.attempts);
    println!("   └─ Duration: {}", format_duration(summary.duration));

    println!("\n📈 {metrics}");

    match export {
        ExportStatus::NotNeeded => {}
        ExportStatus::Written(path) => {
            println!("\n⚠️  Failures exported to {}", path.display());
        }
        ExportStatus::Failed(message) => println!("\n✗ Failure export failed: {message}"),
    }
    println!();
}
