//! `status` command implementation.

use anyhow::Result;
use tracing::info;

use crate::context::AppContext;
use crate::error::CliError;

/// Execute the `status` command
pub async fn run_status(ctx: &AppContext) -> Result<()> {
    let gateway = ctx.gateway()?;
    let status = gateway
        .status()
        .await
        .map_err(|e| CliError::gateway_not_ready(gateway.base_url(), e.to_string()))?;

    info!(ready = status.ready, qr_code = status.qr_code_available, "Gateway status");

    if status.ready {
        println!("✓ Gateway ready: {}", gateway.base_url());
    } else {
        println!("✗ Gateway session not paired: {}", gateway.base_url());
        if status.qr_code_available {
            println!("  A pairing QR code is waiting, run `batch-messenger qrcode`");
        }
    }
    Ok(())
}
