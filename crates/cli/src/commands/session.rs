//! `qrcode` and `reset` command implementations.

use anyhow::{Context, Result};
use gateway::QrCode;
use tracing::{info, warn};

use crate::context::AppContext;

/// Execute the `qrcode` command
///
/// Prints the raw pairing payload; render it with any QR tool.
pub async fn run_qrcode(ctx: &AppContext) -> Result<()> {
    let gateway = ctx.gateway()?;
    let qr = gateway
        .qr_code()
        .await
        .context("Failed to fetch the pairing QR code")?;

    match qr {
        QrCode::Ready(payload) => {
            info!("Pairing QR code available");
            println!("{payload}");
        }
        QrCode::Pending(message) => {
            warn!(message = %message, "QR code not ready yet");
            println!("… QR code not ready yet: {message}");
        }
    }
    Ok(())
}

/// Execute the `reset` command
pub async fn run_reset(ctx: &AppContext) -> Result<()> {
    let gateway = ctx.gateway()?;
    let message = gateway
        .reset_session()
        .await
        .context("Failed to reset the gateway session")?;

    info!("Gateway session reset");
    println!("✓ Session reset, pair again with `batch-messenger qrcode`");
    if let Some(message) = message {
        println!("  {message}");
    }
    Ok(())
}
