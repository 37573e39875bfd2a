//! Rank command implementation.
//!
//! The rank command:
//! 1. Reads the call graph
//! 2. Reconstructs each transaction's call tree
//! 3. Extracts and scores every path
//! 4. Selects the deduplicated top K
//! 5. Writes the report (and optionally the dataset rows)

use super::models::RankArgs;
use crate::output::{ranking_summary, read_json, write_json};
use crate::parser::{parse_call_graph, PathRecord};
use crate::paths::extract_path_features;
use crate::scoring::{format_paths_for_llm, rank_call_graph};
use crate::utils::config::MAX_TOP_K;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the rank command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Input file missing or not a call graph
/// * Report write failures
pub fn execute_rank(args: RankArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Ranking call paths from: {}", args.input.display());

    info!("Step 1/4: Reading call graph...");
    let raw = read_json(&args.input).context("Failed to read call graph")?;
    let call_graph = parse_call_graph(&raw).context("Failed to parse call graph")?;

    info!(
        "Step 2/4: Reconstructing and scoring {} transactions...",
        call_graph.len()
    );
    let ranking = rank_call_graph(&call_graph, args.top_k, args.weights);

    debug!("Top 3 paths:");
    for (i, path) in ranking.top_k.iter().take(3).enumerate() {
        debug!("  {}. {:.4}: {}", i + 1, path.score, path.signature);
    }

    info!("Step 3/4: Writing report...");
    let report = format_paths_for_llm(&ranking.top_k, args.weights);
    write_json(&report, &args.output).context("Failed to write ranking report")?;
    info!("✓ Report written to: {}", args.output.display());

    if let Some(dataset_path) = &args.dataset_output {
        info!("Step 4/4: Writing dataset rows...");
        let rows: Vec<PathRecord> = ranking
            .ranked
            .iter()
            .filter_map(|scored| extract_path_features(&scored.path))
            .map(|features| features.to_path_record())
            .collect();

        write_json(&rows, dataset_path).context("Failed to write path dataset")?;
        info!("✓ {} dataset rows written to: {}", rows.len(), dataset_path.display());
    } else {
        debug!("No dataset output requested");
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("SUSPICIOUS PATHS");
        println!("{}", "=".repeat(80));
        println!("Transactions: {}", call_graph.len());
        println!("Paths scored: {}", ranking.ranked.len());
        println!("\n{}", ranking_summary(&ranking.top_k));
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Ranking completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Validate rank arguments
///
/// **Public** - can be called before execute_rank for early validation
pub fn validate_rank_args(args: &RankArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if args.top_k == 0 {
        anyhow::bail!("top_k must be greater than 0");
    }

    if args.top_k > MAX_TOP_K {
        anyhow::bail!("top_k is too large (max {})", MAX_TOP_K);
    }

    if !args.weights.is_valid() {
        anyhow::bail!("Scoring weights must be finite and non-negative");
    }

    Ok(())
}
