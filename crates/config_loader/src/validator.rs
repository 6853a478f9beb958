//! 配置校验模块
//!
//! 校验规则：
//! - gateway.base_url 为 http/https
//! - 各超时 > 0
//! - dispatch.max_attempts >= 1
//! - dispatch.interval_secs <= 3600

use contracts::{AppConfig, ContractError};

const MAX_INTERVAL_SECS: u64 = 3600;

/// 校验 AppConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &AppConfig) -> Result<(), ContractError> {
    validate_gateway_url(config)?;
    validate_timeouts(config)?;
    validate_dispatch(config)?;
    Ok(())
}

/// 校验网关地址
fn validate_gateway_url(config: &AppConfig) -> Result<(), ContractError> {
    let url = config.gateway.base_url.trim();
    if url.is_empty() {
        return Err(ContractError::config_validation(
            "gateway.base_url",
            "base_url cannot be empty",
        ));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ContractError::config_validation(
            "gateway.base_url",
            format!("base_url must start with http:// or https://, got '{url}'"),
        ));
    }
    Ok(())
}

/// 校验超时设置
fn validate_timeouts(config: &AppConfig) -> Result<(), ContractError> {
    let gateway = &config.gateway;
    let timeouts = [
        ("gateway.status_timeout_secs", gateway.status_timeout_secs),
        ("gateway.message_timeout_secs", gateway.message_timeout_secs),
        ("gateway.file_timeout_secs", gateway.file_timeout_secs),
    ];
    for (field, value) in timeouts {
        if value == 0 {
            return Err(ContractError::config_validation(
                field,
                "timeout must be > 0",
            ));
        }
    }
    Ok(())
}

/// 校验发送默认值
fn validate_dispatch(config: &AppConfig) -> Result<(), ContractError> {
    let dispatch = &config.dispatch;

    if dispatch.max_attempts == 0 {
        return Err(ContractError::config_validation(
            "dispatch.max_attempts",
            "max_attempts must be >= 1",
        ));
    }

    if dispatch.interval_secs > MAX_INTERVAL_SECS {
        return Err(ContractError::config_validation(
            "dispatch.interval_secs",
            format!(
                "interval_secs must be <= {MAX_INTERVAL_SECS}, got {}",
                dispatch.interval_secs
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = AppConfig::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = AppConfig::default();
        config.gateway.base_url = "ftp://gateway".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("http://"), "got: {err}");
    }

    #[test]
    fn test_empty_url() {
        let mut config = AppConfig::default();
        config.gateway.base_url = "  ".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = AppConfig::default();
        config.gateway.file_timeout_secs = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("file_timeout_secs"), "got: {err}");
    }

    #[test]
    fn test_zero_attempts() {
        let mut config = AppConfig::default();
        config.dispatch.max_attempts = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("max_attempts must be >= 1"), "got: {err}");
    }

    #[test]
    fn test_interval_too_large() {
        let mut config = AppConfig::default();
        config.dispatch.interval_secs = 7200;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("interval_secs"), "got: {err}");
    }
}
