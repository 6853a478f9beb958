//! Resolved configuration shared by the commands.
//!
//! Precedence: flag > environment (clap `env`, `.env`) > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config_loader::{AppConfig, ConfigLoader};
use gateway::HttpGateway;
use tracing::debug;

use crate::cli::{Cli, DEFAULT_CONFIG_FILE};

/// Application context
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    /// Progress output suppressed
    pub quiet: bool,
}

impl AppContext {
    /// Build the context from parsed CLI flags
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut ctx = Self::resolve(
            cli.config.as_deref(),
            cli.gateway_url.as_deref(),
            cli.token.as_deref(),
        )?;
        ctx.quiet = cli.quiet;
        Ok(ctx)
    }

    fn resolve(
        config_path: Option<&Path>,
        gateway_url: Option<&str>,
        token: Option<&str>,
    ) -> Result<Self> {
        let explicit = config_path.is_some();
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = ConfigLoader::load_or_default(&path, explicit)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        if let Some(url) = gateway_url {
            config.gateway.base_url = url.to_string();
        }
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            config.gateway.auth_token = Some(token.to_string());
        }

        debug!(
            gateway = %config.gateway.base_url,
            authenticated = config.gateway.auth_token.is_some(),
            "configuration resolved"
        );
        Ok(Self {
            config,
            quiet: false,
        })
    }

    /// HTTP client for the configured gateway
    pub fn gateway(&self) -> Result<HttpGateway> {
        HttpGateway::new(&self.config.gateway).context("Failed to build gateway client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_no_file() {
        let ctx = AppContext::resolve(None, None, None).unwrap();
        assert_eq!(ctx.config.gateway.base_url, "http://localhost:3000/api");
        assert_eq!(ctx.config.dispatch.max_attempts, 2);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let path = Path::new("/nonexistent/messenger.toml");
        let result = AppContext::resolve(Some(path), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[gateway]\nbase_url = \"http://file-host:3000/api\"\nauth_token = \"from-file\"\n\n\
             [dispatch]\ninterval_secs = 7"
        )
        .unwrap();

        let ctx = AppContext::resolve(Some(file.path()), None, None).unwrap();
        assert_eq!(ctx.config.gateway.base_url, "http://file-host:3000/api");
        assert_eq!(ctx.config.dispatch.interval_secs, 7);

        let ctx = AppContext::resolve(
            Some(file.path()),
            Some("http://flag-host:3000/api"),
            Some("from-flag"),
        )
        .unwrap();
        assert_eq!(ctx.config.gateway.base_url, "http://flag-host:3000/api");
        assert_eq!(ctx.config.gateway.auth_token.as_deref(), Some("from-flag"));
        assert_eq!(ctx.config.dispatch.interval_secs, 7);
    }
}
