//! # Config Loader
//!
//! Reads `AppConfig` from a TOML or JSON file and checks it before use.
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_or_default(Path::new("batch-messenger.toml"), false).unwrap();
//! println!("Gateway: {}", config.gateway.base_url);
//! ```

mod parser;
mod validator;

pub use contracts::AppConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::{debug, info};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a configuration file
    ///
    /// The format comes from the extension (`.toml` / `.json`).
    pub fn load_from_path(path: &Path) -> Result<AppConfig, ContractError> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ConfigFormat::from_extension)
            .ok_or_else(|| {
                ContractError::config_parse(format!(
                    "unsupported config format: {} (expected .toml or .json)",
                    path.display()
                ))
            })?;

        let content = std::fs::read_to_string(path)?;
        let config = Self::load_from_str(&content, format)?;
        info!(path = %path.display(), format = format.name(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<AppConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    ///
    /// `explicit` marks a path the user named on purpose: a missing explicit
    /// file is an error, a missing default file is not.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<AppConfig, ContractError> {
        if path.exists() {
            return Self::load_from_path(path);
        }
        if explicit {
            return Err(ContractError::config_parse(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), "no configuration file, using defaults");
        Ok(AppConfig::default())
    }

    pub fn to_toml(config: &AppConfig) -> Result<String, ContractError> {
        parser::serialize(config, ConfigFormat::Toml)
    }

    pub fn to_json(config: &AppConfig) -> Result<String, ContractError> {
        parser::serialize(config, ConfigFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_TOML: &str = r#"
[gateway]
base_url = "http://127.0.0.1:3000/api"

[dispatch]
interval_secs = 4
max_attempts = 3
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(SAMPLE_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.dispatch.interval_secs, 4);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(SAMPLE_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.gateway.base_url, config2.gateway.base_url);
        assert_eq!(config.dispatch.max_attempts, config2.dispatch.max_attempts);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[dispatch]
max_attempts = 0
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_attempts"));
    }

    #[test]
    fn test_load_from_path_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "gateway": {{ "base_url": "https://gw.example/api" }} }}"#).unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.gateway.base_url, "https://gw.example/api");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_load_or_default_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messenger.toml");

        let config = ConfigLoader::load_or_default(&path, false).unwrap();
        assert_eq!(config.dispatch.max_attempts, 2);

        assert!(ConfigLoader::load_or_default(&path, true).is_err());
    }

    #[test]
    fn test_to_json_output() {
        let config = ConfigLoader::load_from_str(SAMPLE_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        assert!(json.contains("\"base_url\": \"http://127.0.0.1:3000/api\""));
        assert!(json.contains("\"interval_secs\": 4"));
    }
}
