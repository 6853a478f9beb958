//! # Dispatcher
//!
//! 批量发送模块。
//!
//! 负责：
//! - 逐个收件人驱动网关调用 (重试、间隔、随机抖动)
//! - 协作式取消
//! - 实时统计与 ETA
//! - 失败列表导出

pub mod engine;
pub mod error;
pub mod export;
pub mod handle;
pub mod metrics;
pub mod pacing;
pub mod reporter;

pub use contracts::{DispatchEvent, DispatchJob, GatewayClient, RunState, RunSummary};
pub use engine::DispatchEngine;
pub use error::{DispatcherError, Result};
pub use export::{default_export_path, write_failures_csv, write_failures_csv_new};
pub use handle::RunHandle;
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use pacing::{FixedJitter, JitterSource, RandomJitter, JITTER_RANGE, RETRY_DELAY};
pub use reporter::ResultReporter;
pub use tokio_util::sync::CancellationToken;
