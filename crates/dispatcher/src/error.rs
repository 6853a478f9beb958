//! Dispatcher error types

use contracts::ContractError;
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Fatal run error (not ready, already running, export...)
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// The background run task panicked or was aborted
    #[error("dispatch worker stopped unexpectedly: {message}")]
    WorkerFailed { message: String },
}

impl DispatcherError {
    /// Create a worker failure error
    pub fn worker_failed(message: impl Into<String>) -> Self {
        Self::WorkerFailed {
            message: message.into(),
        }
    }

    /// Underlying contract error, if any
    pub fn as_contract(&self) -> Option<&ContractError> {
        match self {
            Self::Contract(e) => Some(e),
            Self::WorkerFailed { .. } => None,
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, DispatcherError>;
