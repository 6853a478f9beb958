//! 配置文本解析与序列化
//!
//! TOML 为主，JSON 为辅；两种格式共用同一个 `AppConfig` 结构。

use contracts::{AppConfig, ContractError};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式（不区分大小写）
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// 解析配置文本
///
/// 文件开头的 UTF-8 BOM 会被忽略（Windows 编辑器常见）。
pub fn parse(content: &str, format: ConfigFormat) -> Result<AppConfig, ContractError> {
    let content = content.trim_start_matches('\u{feff}');
    let parsed: Result<AppConfig, BoxError> = match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(Into::into),
        ConfigFormat::Json => serde_json::from_str(content).map_err(Into::into),
    };

    parsed.map_err(|source| ContractError::ConfigParse {
        message: format!("{} parse error: {source}", format.name()),
        source: Some(source),
    })
}

/// 序列化配置（用于生成示例配置文件）
pub fn serialize(config: &AppConfig, format: ConfigFormat) -> Result<String, ContractError> {
    let rendered: Result<String, BoxError> = match format {
        ConfigFormat::Toml => toml::to_string_pretty(config).map_err(Into::into),
        ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(Into::into),
    };
    rendered.map_err(|e| {
        ContractError::config_parse(format!("{} serialize error: {e}", format.name()))
    })
}
