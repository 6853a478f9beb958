//! Layered error definitions
//!
//! Categorized by source: config / recipients / job / gateway / run / export

use thiserror::Error;

/// Unified error type for fatal (run-aborting) failures
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Recipient Source Errors =====
    /// Input is not one of the recognized tabular formats, or could not be decoded
    #[error("invalid recipient file format: {message}")]
    InvalidFormat { message: String },

    /// First column yielded no usable values
    #[error("recipient input is empty: no non-blank values in the first column")]
    EmptyInput,

    // ===== Job Errors =====
    /// Job has neither a text body nor attachments
    #[error("job has neither a text message nor attachments")]
    EmptyJob,

    /// Job settings out of range
    #[error("invalid job setting '{field}': {message}")]
    InvalidSettings { field: String, message: String },

    /// Attachment path does not exist or is not a file
    #[error("attachment not found: {path}")]
    AttachmentNotFound { path: String },

    // ===== Run Errors =====
    /// Gateway unreachable or not authenticated at run start
    #[error("gateway not ready: {message}")]
    NotReady { message: String },

    /// A run is already active on this engine
    #[error("a dispatch run is already in progress")]
    RunAlreadyInProgress,

    // ===== Export Errors =====
    /// Failure export could not be written
    #[error("failure export error: {message}")]
    Export { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid format error
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create invalid settings error
    pub fn invalid_settings(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create not-ready error
    pub fn not_ready(message: impl Into<String>) -> Self {
        Self::NotReady {
            message: message.into(),
        }
    }

    /// Create export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }
}

/// Error of a single gateway call
///
/// Both variants are retryable and count toward the attempt cap identically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// Gateway unreachable, connection reset, timeout
    #[error("{message}")]
    Transport { message: String },

    /// Gateway reachable but answered with a non-success status
    #[error("{message}")]
    Gateway { status: Option<u16>, message: String },
}

impl SendError {
    /// Create transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create gateway error
    pub fn gateway(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Gateway {
            status,
            message: message.into(),
        }
    }

    /// User-facing message
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message } | Self::Gateway { message, .. } => message,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
