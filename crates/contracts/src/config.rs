//! AppConfig - Config Loader output
//!
//! Gateway endpoint, dispatch defaults and export location.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::JobSettings;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Gateway connection settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Dispatch defaults
    #[serde(default)]
    pub dispatch: DispatchDefaults,

    /// Failure export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Gateway connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL, endpoint paths are appended (e.g. `<base_url>/send-message`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional bearer token
    #[serde(default)]
    pub auth_token: Option<String>,

    /// `GET /status` timeout (seconds)
    #[serde(default = "default_status_timeout")]
    pub status_timeout_secs: u64,

    /// `POST /send-message` timeout (seconds)
    #[serde(default = "default_message_timeout")]
    pub message_timeout_secs: u64,

    /// `POST /send-file` timeout (seconds)
    #[serde(default = "default_file_timeout")]
    pub file_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_status_timeout() -> u64 {
    5
}

fn default_message_timeout() -> u64 {
    30
}

fn default_file_timeout() -> u64 {
    60
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: None,
            status_timeout_secs: default_status_timeout(),
            message_timeout_secs: default_message_timeout(),
            file_timeout_secs: default_file_timeout(),
        }
    }
}

impl GatewayConfig {
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_secs(self.message_timeout_secs)
    }

    pub fn file_timeout(&self) -> Duration {
        Duration::from_secs(self.file_timeout_secs)
    }
}

/// Defaults for new dispatch jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchDefaults {
    /// Base delay between recipients (seconds)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Attempts per recipient
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Random 1-3 s added to each inter-recipient delay
    #[serde(default = "default_true")]
    pub jitter: bool,

    /// Drop repeated numbers from the recipient list
    #[serde(default = "default_true")]
    pub dedupe: bool,
}

fn default_interval() -> u64 {
    3
}

fn default_max_attempts() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

impl Default for DispatchDefaults {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            max_attempts: default_max_attempts(),
            jitter: true,
            dedupe: true,
        }
    }
}

impl DispatchDefaults {
    pub fn job_settings(&self) -> JobSettings {
        JobSettings {
            max_attempts_per_recipient: self.max_attempts,
            base_interval_secs: self.interval_secs,
            jitter_enabled: self.jitter,
        }
    }
}

/// Failure export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for timestamped exports
    #[serde(default = "default_export_dir")]
    pub directory: PathBuf,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_dir(),
        }
    }
}
