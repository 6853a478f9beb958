//! DispatchJob - unit of work submitted to the engine
//!
//! Read-only after construction, no synchronization required.

use serde::{Deserialize, Serialize};

use crate::{Attachment, ContractError, Recipient};

/// Pacing and retry settings of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSettings {
    /// Attempts per recipient (>= 1)
    pub max_attempts_per_recipient: u32,

    /// Base delay between recipients (seconds)
    pub base_interval_secs: u64,

    /// Add uniform 1-3 s jitter to the inter-recipient delay
    pub jitter_enabled: bool,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            max_attempts_per_recipient: 2,
            base_interval_secs: 3,
            jitter_enabled: true,
        }
    }
}

/// Dispatch job
///
/// Invariant: `text_body` non-empty OR `attachments` non-empty.
/// Deserialization goes through [`DispatchJob::new`], so the same checks apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawDispatchJob")]
pub struct DispatchJob {
    recipients: Vec<Recipient>,
    text_body: Option<String>,
    attachments: Vec<Attachment>,
    settings: JobSettings,
}

/// Unchecked wire form of [`DispatchJob`]
#[derive(Deserialize)]
struct RawDispatchJob {
    recipients: Vec<Recipient>,
    #[serde(default)]
    text_body: Option<String>,
    #[serde(default)]
    attachments: Vec<Attachment>,
    settings: JobSettings,
}

impl TryFrom<RawDispatchJob> for DispatchJob {
    type Error = ContractError;

    fn try_from(raw: RawDispatchJob) -> Result<Self, Self::Error> {
        Self::new(raw.recipients, raw.text_body, raw.attachments, raw.settings)
    }
}

impl DispatchJob {
    /// Build a job, rejecting it before any dispatch if it violates its invariants
    ///
    /// A blank text body is treated as absent.
    ///
    /// # Errors
    /// - `EmptyJob`: neither text nor attachments
    /// - `EmptyInput`: no recipients
    /// - `InvalidSettings`: `max_attempts_per_recipient == 0`
    pub fn new(
        recipients: Vec<Recipient>,
        text_body: Option<String>,
        attachments: Vec<Attachment>,
        settings: JobSettings,
    ) -> Result<Self, ContractError> {
        let text_body = text_body.filter(|text| !text.trim().is_empty());

        if text_body.is_none() && attachments.is_empty() {
            return Err(ContractError::EmptyJob);
        }
        if recipients.is_empty() {
            return Err(ContractError::EmptyInput);
        }
        if settings.max_attempts_per_recipient == 0 {
            return Err(ContractError::invalid_settings(
                "max_attempts_per_recipient",
                "must be >= 1",
            ));
        }

        Ok(Self {
            recipients,
            text_body,
            attachments,
            settings,
        })
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn text_body(&self) -> Option<&str> {
        self.text_body.as_deref()
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    /// Gateway calls per attempt (text + one per attachment)
    pub fn calls_per_attempt(&self) -> usize {
        usize::from(self.text_body.is_some()) + self.attachments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipients() -> Vec<Recipient> {
        vec![Recipient::from_number("1"), Recipient::from_number("2")]
    }

    #[test]
    fn test_job_requires_text_or_attachments() {
        let result = DispatchJob::new(recipients(), None, vec![], JobSettings::default());
        assert!(matches!(result, Err(ContractError::EmptyJob)));
    }

    #[test]
    fn test_blank_text_counts_as_absent() {
        let result = DispatchJob::new(
            recipients(),
            Some("   ".into()),
            vec![],
            JobSettings::default(),
        );
        assert!(matches!(result, Err(ContractError::EmptyJob)));
    }

    #[test]
    fn test_job_rejects_zero_attempts() {
        let settings = JobSettings {
            max_attempts_per_recipient: 0,
            ..Default::default()
        };
        let result = DispatchJob::new(recipients(), Some("hi".into()), vec![], settings);
        assert!(matches!(result, Err(ContractError::InvalidSettings { .. })));
    }

    #[test]
    fn test_job_rejects_no_recipients() {
        let result = DispatchJob::new(vec![], Some("hi".into()), vec![], JobSettings::default());
        assert!(matches!(result, Err(ContractError::EmptyInput)));
    }

    #[test]
    fn test_deserialize_applies_job_checks() {
        let empty = r#"{
            "recipients": [{ "raw_input": "1", "normalized_number": "1" }],
            "text_body": null,
            "attachments": [],
            "settings": {
                "max_attempts_per_recipient": 2,
                "base_interval_secs": 0,
                "jitter_enabled": false
            }
        }"#;
        let err = serde_json::from_str::<DispatchJob>(empty).unwrap_err();
        assert!(err.to_string().contains("neither a text message nor attachments"), "{err}");

        let zero_attempts = r#"{
            "recipients": [{ "raw_input": "1", "normalized_number": "1" }],
            "text_body": "hi",
            "settings": {
                "max_attempts_per_recipient": 0,
                "base_interval_secs": 0,
                "jitter_enabled": false
            }
        }"#;
        assert!(serde_json::from_str::<DispatchJob>(zero_attempts).is_err());

        let no_recipients = r#"{
            "recipients": [],
            "text_body": "hi",
            "settings": {
                "max_attempts_per_recipient": 1,
                "base_interval_secs": 0,
                "jitter_enabled": false
            }
        }"#;
        assert!(serde_json::from_str::<DispatchJob>(no_recipients).is_err());
    }

    #[test]
    fn test_serialized_job_deserializes_back() {
        let job = DispatchJob::new(recipients(), Some("hi".into()), vec![], JobSettings::default())
            .unwrap();
        let json = serde_json::to_string(&job).unwrap();
        let back: DispatchJob = serde_json::from_str(&json).unwrap();
        assert_eq!(back.recipients(), job.recipients());
        assert_eq!(back.text_body(), Some("hi"));
        assert_eq!(back.settings(), job.settings());
    }

    #[test]
    fn test_calls_per_attempt() {
        let job = DispatchJob::new(
            recipients(),
            Some("hi".into()),
            vec![Attachment::new("a.png"), Attachment::new("b.pdf")],
            JobSettings::default(),
        )
        .unwrap();
        assert_eq!(job.calls_per_attempt(), 3);
        assert_eq!(job.text_body(), Some("hi"));
    }
}
