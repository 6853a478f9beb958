//! `send-text` and `send-file` command implementations.

use anyhow::{Context, Result};
use contracts::{Attachment, GatewayClient};
use recipients::normalize_number;
use tracing::info;

use crate::cli::{SendFileArgs, SendTextArgs};
use crate::context::AppContext;

/// Execute the `send-text` command
pub async fn run_send_text(ctx: &AppContext, args: &SendTextArgs) -> Result<()> {
    let number = normalize_number(&args.to);
    let gateway = ctx.gateway()?;

    let receipt = gateway
        .send_text(&number, &args.message)
        .await
        .with_context(|| format!("Failed to send message to {number}"))?;

    info!(number = %number, message_id = ?receipt.message_id, "Message sent");
    println!("✓ Message sent to {number}");
    Ok(())
}

/// Execute the `send-file` command
pub async fn run_send_file(ctx: &AppContext, args: &SendFileArgs) -> Result<()> {
    let number = normalize_number(&args.to);
    let attachment = Attachment::from_path(&args.file).context("Invalid attachment")?;
    let gateway = ctx.gateway()?;

    let receipt = gateway
        .send_file_with_caption(&number, &attachment, args.caption.as_deref())
        .await
        .with_context(|| format!("Failed to send {} to {number}", attachment.file_name))?;

    info!(
        number = %number,
        file = %attachment.file_name,
        message_id = ?receipt.message_id,
        "File sent"
    );
    println!("✓ {} sent to {number}", attachment.file_name);
    Ok(())
}
