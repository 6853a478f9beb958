//! `analyze` and `analyze-batch` command implementations.

use anyhow::{Context, Result};
use recipients::normalize_number;
use tracing::info;

use super::load_recipients;
use crate::cli::{AnalyzeArgs, AnalyzeBatchArgs};
use crate::context::AppContext;

/// Execute the `analyze` command
pub async fn run_analyze(ctx: &AppContext, args: &AnalyzeArgs) -> Result<()> {
    let gateway = ctx.gateway()?;
    let analysis = gateway
        .analyze_number(&normalize_number(&args.number))
        .await
        .context("Number analysis failed")?;

    let json = serde_json::to_string_pretty(&analysis).context("Failed to serialize analysis")?;
    println!("{json}");
    Ok(())
}

/// Execute the `analyze-batch` command
pub async fn run_analyze_batch(ctx: &AppContext, args: &AnalyzeBatchArgs) -> Result<()> {
    let numbers: Vec<String> = load_recipients(&args.file)?
        .into_iter()
        .map(|r| r.normalized_number)
        .collect();

    let gateway = ctx.gateway()?;
    let analysis = gateway
        .analyze_batch(&numbers)
        .await
        .context("Batch analysis failed")?;

    info!(
        total = analysis.stats.total,
        formatted = analysis.stats.formatted,
        "Batch analyzed"
    );

    for result in &analysis.results {
        println!(
            "{:<20} -> {:<20} {}",
            result.original, result.formatted_number, result.country_info.country
        );
    }
    let json =
        serde_json::to_string_pretty(&analysis.stats).context("Failed to serialize analysis")?;
    println!("\n{json}");
    Ok(())
}
