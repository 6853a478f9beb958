//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Recipient file could not be turned into a recipient list
    #[error("Failed to read recipients from {path}: {message}")]
    RecipientFile { path: String, message: String },

    /// Gateway is unreachable or its session is not paired
    #[error("Gateway at {url} is not ready: {message}")]
    GatewayNotReady { url: String, message: String },

    /// Background dispatch failed before producing a summary
    #[error("Dispatch failed: {message}")]
    Dispatch { message: String },
}

impl CliError {
    pub fn recipient_file(path: &Path, message: impl Into<String>) -> Self {
        Self::RecipientFile {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn gateway_not_ready(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GatewayNotReady {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
        }
    }
}
