//! Mock 网关客户端
//!
//! 用于单元测试的内存实现，支持注入失败场景并记录调用顺序。

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use contracts::{Attachment, GatewayClient, SendError, SendReceipt};

/// 一次网关调用记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Text { number: String, message: String },
    File { number: String, file_name: String },
    Ready,
}

impl GatewayCall {
    /// 目标号码，`Ready` 为 None
    pub fn number(&self) -> Option<&str> {
        match self {
            Self::Text { number, .. } | Self::File { number, .. } => Some(number),
            Self::Ready => None,
        }
    }
}

/// 号码级失败规则
#[derive(Debug, Clone)]
struct FailureRule {
    /// 剩余失败次数，None 表示始终失败
    remaining: Option<u32>,
    error: SendError,
}

/// Mock 网关配置
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// `check_ready` 结果
    pub ready: bool,
    /// `check_ready` 无法连接
    pub unreachable: bool,
    /// 每次调用的模拟延迟
    pub latency: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            ready: true,
            unreachable: false,
            latency: Duration::ZERO,
        }
    }
}

/// Mock 网关客户端
///
/// 规则按号码匹配，文本和文件调用共享同一失败计数。
#[derive(Debug, Default)]
pub struct MockGateway {
    config: MockConfig,
    /// 号码 -> 失败规则
    number_rules: Mutex<HashMap<String, FailureRule>>,
    /// 始终失败的附件文件名
    failing_files: HashSet<String>,
    /// 调用日志（按发生顺序）
    calls: Mutex<Vec<GatewayCall>>,
}

impl MockGateway {
    /// 创建默认 mock：已就绪，所有调用成功
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// 使用配置创建 mock
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// 该号码的所有调用返回网关错误
    pub fn failing(self, number: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_rule(number, None, SendError::gateway(Some(500), message))
    }

    /// 该号码前 `times` 次调用返回网关错误，之后成功
    pub fn failing_times(
        self,
        number: impl Into<String>,
        times: u32,
        message: impl Into<String>,
    ) -> Self {
        self.with_rule(number, Some(times), SendError::gateway(Some(500), message))
    }

    /// 该号码的所有调用返回传输错误
    pub fn unreachable_number(self, number: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_rule(number, None, SendError::transport(message))
    }

    /// 指定文件名的附件始终发送失败
    pub fn failing_file(mut self, file_name: impl Into<String>) -> Self {
        self.failing_files.insert(file_name.into());
        self
    }

    /// 调用日志快照
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// 发送类调用（不含 `Ready`）
    pub fn send_calls(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, GatewayCall::Ready))
            .collect()
    }

    /// 指定号码的发送调用次数
    pub fn calls_for(&self, number: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.number() == Some(number))
            .count()
    }

    fn with_rule(
        self,
        number: impl Into<String>,
        remaining: Option<u32>,
        error: SendError,
    ) -> Self {
        if let Ok(mut rules) = self.number_rules.lock() {
            rules.insert(number.into(), FailureRule { remaining, error });
        }
        self
    }

    fn log(&self, call: GatewayCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    /// 消耗号码规则，返回本次调用应产生的错误
    fn take_failure(&self, number: &str) -> Option<SendError> {
        let mut rules = self.number_rules.lock().ok()?;
        let rule = rules.get_mut(number)?;
        match rule.remaining {
            None => Some(rule.error.clone()),
            Some(0) => None,
            Some(ref mut n) => {
                *n -= 1;
                Some(rule.error.clone())
            }
        }
    }

    async fn simulate_latency(&self) {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
    }
}

impl GatewayClient for MockGateway {
    async fn send_text(&self, number: &str, message: &str) -> Result<SendReceipt, SendError> {
        self.log(GatewayCall::Text {
            number: number.to_string(),
            message: message.to_string(),
        });
        self.simulate_latency().await;

        match self.take_failure(number) {
            Some(err) => Err(err),
            None => Ok(SendReceipt {
                message_id: Some(format!("mock-{number}")),
            }),
        }
    }

    async fn send_file(
        &self,
        number: &str,
        attachment: &Attachment,
    ) -> Result<SendReceipt, SendError> {
        self.log(GatewayCall::File {
            number: number.to_string(),
            file_name: attachment.file_name.clone(),
        });
        self.simulate_latency().await;

        if self.failing_files.contains(&attachment.file_name) {
            return Err(SendError::gateway(
                Some(500),
                format!("cannot deliver {}", attachment.file_name),
            ));
        }
        match self.take_failure(number) {
            Some(err) => Err(err),
            None => Ok(SendReceipt::default()),
        }
    }

    async fn check_ready(&self) -> Result<bool, SendError> {
        self.log(GatewayCall::Ready);
        if self.config.unreachable {
            return Err(SendError::transport("connection refused"));
        }
        Ok(self.config.ready)
    }
}
