//! # Batch Messenger CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载（文件 / 环境变量 / 命令行参数）
//! - 批量发送与进度输出
//! - 网关会话与号码分析辅助命令
//! - Ctrl-C 协作式取消

mod cli;
mod commands;
mod context;
mod error;
mod progress;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use context::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_observability(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Batch Messenger CLI starting"
    );

    let result = run(&cli).await;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

async fn run(cli: &Cli) -> Result<()> {
    // validate is offline and never loads a configuration
    let ctx = || AppContext::load(cli);

    match &cli.command {
        Commands::SendBatch(args) => commands::run_send_batch(&ctx()?, args).await,
        Commands::Status => commands::run_status(&ctx()?).await,
        Commands::SendText(args) => commands::run_send_text(&ctx()?, args).await,
        Commands::SendFile(args) => commands::run_send_file(&ctx()?, args).await,
        Commands::Analyze(args) => commands::run_analyze(&ctx()?, args).await,
        Commands::AnalyzeBatch(args) => commands::run_analyze_batch(&ctx()?, args).await,
        Commands::Qrcode => commands::run_qrcode(&ctx()?).await,
        Commands::Reset => commands::run_reset(&ctx()?).await,
        Commands::Validate(args) => commands::run_validate(args),
    }
}

/// Initialize logging and the optional metrics endpoint based on CLI options
fn init_observability(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let log_format = match cli.log_format {
        cli::LogFormat::Json => observability::LogFormat::Json,
        cli::LogFormat::Pretty => observability::LogFormat::Pretty,
        cli::LogFormat::Compact => observability::LogFormat::Compact,
    };

    observability::init_with_config(observability::ObservabilityConfig {
        log_format,
        metrics_port: cli.metrics_port,
        default_log_level: default_log_level.to_string(),
    })
}
