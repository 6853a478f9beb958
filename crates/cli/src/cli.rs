//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "batch-messenger.toml";

/// Batch Messenger - push a message and attachments to a recipient list through a messaging gateway
#[derive(Parser, Debug)]
#[command(
    name = "batch-messenger",
    author,
    version,
    about = "Batch sender for an HTTP messaging gateway",
    long_about = "Reads phone numbers from a CSV/XLSX file and sends a text message and/or\n\
                  attachments to each of them through the messaging gateway, one recipient\n\
                  at a time, with retries, paced and jittered delays and a failure report."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        env = "BATCH_MESSENGER_VERBOSE"
    )]
    pub verbose: u8,

    /// Suppress progress output and logs below warn
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "BATCH_MESSENGER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Path to configuration file (TOML or JSON)
    #[arg(long, global = true, env = "BATCH_MESSENGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the gateway base URL (e.g. http://localhost:3000/api)
    #[arg(long, global = true, env = "BATCH_MESSENGER_GATEWAY_URL")]
    pub gateway_url: Option<String>,

    /// Bearer token sent to the gateway
    #[arg(long, global = true, env = "BATCH_MESSENGER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Expose Prometheus metrics on this port
    #[arg(long, global = true, env = "BATCH_MESSENGER_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a message and/or files to every number of a recipient file
    SendBatch(SendBatchArgs),

    /// Show gateway readiness
    Status,

    /// Send one text message
    SendText(SendTextArgs),

    /// Send one file
    SendFile(SendFileArgs),

    /// Ask the gateway how it would format a number
    Analyze(AnalyzeArgs),

    /// Ask the gateway to analyze every number of a recipient file
    AnalyzeBatch(AnalyzeBatchArgs),

    /// Print the pairing QR code payload
    Qrcode,

    /// Reset the gateway session (requires pairing again)
    Reset,

    /// Parse a recipient file without sending anything
    Validate(ValidateArgs),
}

/// Arguments for the `send-batch` command
#[derive(Parser, Debug, Clone)]
pub struct SendBatchArgs {
    /// CSV/XLSX file, numbers in the first column, first row is a header
    #[arg(short, long)]
    pub file: PathBuf,

    /// Text message
    #[arg(short, long)]
    pub message: Option<String>,

    /// Attachment, repeat for several (sent in the given order)
    #[arg(short, long = "attach", alias = "files", num_args = 1..)]
    pub attach: Vec<PathBuf>,

    /// Seconds between recipients (jitter is added on top)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Attempts per recipient
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Disable the random 1-3 s added to the interval
    #[arg(long)]
    pub no_random: bool,

    /// Send to repeated numbers once per occurrence
    #[arg(long)]
    pub keep_duplicates: bool,

    /// Write the failure list to this CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Arguments for the `send-text` command
#[derive(Parser, Debug)]
pub struct SendTextArgs {
    /// Recipient number
    #[arg(short, long)]
    pub to: String,

    /// Message text
    #[arg(short, long)]
    pub message: String,
}

/// Arguments for the `send-file` command
#[derive(Parser, Debug)]
pub struct SendFileArgs {
    /// Recipient number
    #[arg(short, long)]
    pub to: String,

    /// File to send
    #[arg(short, long)]
    pub file: PathBuf,

    /// Caption shown with the file
    #[arg(short, long)]
    pub caption: Option<String>,
}

/// Arguments for the `analyze` command
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Number to analyze
    #[arg(short, long)]
    pub number: String,
}

/// Arguments for the `analyze-batch` command
#[derive(Parser, Debug)]
pub struct AnalyzeBatchArgs {
    /// CSV/XLSX recipient file
    #[arg(short, long)]
    pub file: PathBuf,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// CSV/XLSX recipient file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_batch_flags() {
        let cli = Cli::try_parse_from([
            "batch-messenger",
            "send-batch",
            "--file",
            "numbers.csv",
            "-m",
            "hello",
            "--attach",
            "a.pdf",
            "--attach",
            "b.png",
            "--interval",
            "5",
            "--retries",
            "3",
            "--no-random",
        ])
        .unwrap();

        let Commands::SendBatch(args) = cli.command else {
            panic!("expected send-batch");
        };
        assert_eq!(args.message.as_deref(), Some("hello"));
        assert_eq!(args.attach, vec![PathBuf::from("a.pdf"), PathBuf::from("b.png")]);
        assert_eq!(args.interval, Some(5));
        assert_eq!(args.retries, Some(3));
        assert!(args.no_random);
        assert!(!args.keep_duplicates);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "batch-messenger",
            "status",
            "--gateway-url",
            "http://10.0.0.2:3000/api",
            "-vv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Status));
        assert_eq!(cli.gateway_url.as_deref(), Some("http://10.0.0.2:3000/api"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["batch-messenger", "-q", "-v", "status"]);
        assert!(result.is_err());
    }
}
