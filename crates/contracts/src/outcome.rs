//! Per-attempt and per-recipient results

use serde::{Deserialize, Serialize};

use crate::{Recipient, SendError};

/// Outcome of one attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    GatewayError(String),
    TransportError(String),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Error message, None on success
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::GatewayError(message) | Self::TransportError(message) => Some(message),
        }
    }

    /// Label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::GatewayError(_) => "gateway_error",
            Self::TransportError(_) => "transport_error",
        }
    }
}

impl From<&SendError> for AttemptOutcome {
    fn from(error: &SendError) -> Self {
        match error {
            SendError::Transport { message } => Self::TransportError(message.clone()),
            SendError::Gateway { message, .. } => Self::GatewayError(message.clone()),
        }
    }
}

/// Result of one attempt, created once and never mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub recipient: Recipient,
    /// 1-based
    pub attempt_number: u32,
    pub outcome: AttemptOutcome,
    pub elapsed_millis: u64,
}

/// Final state of a recipient after all attempts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "last_error", rename_all = "snake_case")]
pub enum RecipientOutcome {
    Succeeded,
    Failed(String),
}

impl RecipientOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Row of the failure export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub number: String,
    #[serde(rename = "error")]
    pub last_error_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_send_error() {
        let outcome = AttemptOutcome::from(&SendError::transport("timed out"));
        assert_eq!(outcome, AttemptOutcome::TransportError("timed out".into()));
        assert_eq!(outcome.error_message(), Some("timed out"));
        assert_eq!(outcome.kind(), "transport_error");
    }

    #[test]
    fn test_recipient_outcome_serde() {
        let json = serde_json::to_string(&RecipientOutcome::Failed("blocked".into())).unwrap();
        assert_eq!(json, r#"{"status":"failed","last_error":"blocked"}"#);
    }
}
