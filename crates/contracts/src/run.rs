//! Run lifecycle, statistics and progress events

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{AttemptResult, RecipientOutcome};

/// Run state machine: `Idle -> Running -> {Completed, Cancelled}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Derived view over the outcomes collected so far
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunStatistics {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub success_rate_percent: f64,
    pub elapsed_so_far: Duration,
    pub estimated_remaining: Duration,
}

impl RunStatistics {
    /// Recipients finalized so far
    pub fn finalized(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Recipients not yet finalized
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.finalized())
    }
}

/// Result of a finished (or cancelled) run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Terminal state
    pub state: RunState,
    pub statistics: RunStatistics,
    /// Attempts made across all recipients
    pub attempts: usize,
    /// Wall time of the whole run, pacing included
    pub duration: Duration,
}

/// Progress event emitted by the engine
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    RunStarted {
        total: usize,
    },
    AttemptStarted {
        /// 0-based position in the job
        index: usize,
        number: String,
        attempt: u32,
        max_attempts: u32,
    },
    AttemptFinished(AttemptResult),
    RecipientFinalized {
        index: usize,
        number: String,
        outcome: RecipientOutcome,
        statistics: RunStatistics,
    },
    /// Inter-recipient or retry delay about to start
    Waiting {
        seconds: u64,
        retry: bool,
    },
    RunFinished(RunSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_remaining() {
        let stats = RunStatistics {
            total: 10,
            succeeded: 3,
            failed: 2,
            ..Default::default()
        };
        assert_eq!(stats.finalized(), 5);
        assert_eq!(stats.remaining(), 5);
    }

    #[test]
    fn test_run_state_terminal() {
        assert!(!RunState::Idle.is_terminal());
        assert!(!RunState::Running.is_terminal());
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Cancelled.is_terminal());
    }
}
