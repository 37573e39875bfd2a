//! Context command implementation.
//!
//! The context command:
//! 1. Reads the path dataset and the suspicious selection
//! 2. Builds one insertion tree per transaction
//! 3. Marks the selected paths
//! 4. Builds an expansion or neighborhood context per selected path
//! 5. Writes the context report

use super::models::{ContextArgs, ContextMode};
use crate::output::{format_path_context, read_json, write_json};
use crate::parser::{parse_path_dataset, parse_suspicious_map};
use crate::tree::{CallForest, GlobalStatistics};
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Written context report; `C` is the context flavour of the chosen mode
#[derive(Debug, Serialize)]
pub struct ContextReport<C: Serialize> {
    pub version: String,
    pub generated_at: String,
    pub mode: ContextMode,
    pub k: usize,
    pub statistics: Option<GlobalStatistics>,
    /// source -> path id -> context
    pub contexts: BTreeMap<String, BTreeMap<String, C>>,
}

impl<C: Serialize> ContextReport<C> {
    fn new(
        mode: ContextMode,
        k: usize,
        statistics: Option<GlobalStatistics>,
        contexts: BTreeMap<String, BTreeMap<String, C>>,
    ) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            mode,
            k,
            statistics,
            contexts,
        }
    }

    pub fn context_count(&self) -> usize {
        self.contexts.values().map(BTreeMap::len).sum()
    }
}

/// Execute the context command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Dataset or selection file missing or malformed
/// * Report write failures
pub fn execute_context(args: ContextArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/4: Reading path dataset and suspicious selection...");
    let raw_dataset = read_json(&args.dataset).context("Failed to read path dataset")?;
    let records = parse_path_dataset(&raw_dataset).context("Failed to parse path dataset")?;

    let raw_selection = read_json(&args.suspicious).context("Failed to read suspicious selection")?;
    let selection =
        parse_suspicious_map(&raw_selection).context("Failed to parse suspicious selection")?;

    info!("Step 2/4: Building transaction trees...");
    let mut forest = CallForest::build(&records);

    info!("Step 3/4: Building {:?} contexts with k={}...", args.mode, args.k);
    let written = match args.mode {
        ContextMode::Expand => {
            let contexts = forest.extract_path_contexts(&selection, args.k);
            let report = ContextReport::new(args.mode, args.k, forest.global_statistics(), contexts);

            if args.print_summary {
                for (source, by_path) in &report.contexts {
                    for (path_id, ctx) in by_path {
                        let stats = &ctx.layer_statistics;
                        println!(
                            "{} / {}: {} paths, {} nodes, reached layer {} of {}",
                            source,
                            path_id,
                            stats.total_paths,
                            stats.total_nodes,
                            stats.actual_expansion_depth,
                            stats.expansion_layers
                        );
                    }
                }
            }

            info!("Step 4/4: Writing context report...");
            write_json(&report, &args.output).context("Failed to write context report")?;
            report.context_count()
        }
        ContextMode::Neighborhood => {
            let contexts = forest.neighborhood_contexts(&selection, args.k);
            let report = ContextReport::new(args.mode, args.k, forest.global_statistics(), contexts);

            if args.print_summary {
                for by_path in report.contexts.values() {
                    for ctx in by_path.values() {
                        println!("\n{}", "=".repeat(80));
                        println!("{}", format_path_context(ctx, true));
                    }
                }
                println!("{}", "=".repeat(80));
            }

            info!("Step 4/4: Writing context report...");
            write_json(&report, &args.output).context("Failed to write context report")?;
            report.context_count()
        }
    };

    info!("✓ {} contexts written to: {}", written, args.output.display());

    let elapsed = start_time.elapsed();
    info!("Context extraction completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Validate context arguments
///
/// **Public** - can be called before execute_context for early validation
pub fn validate_context_args(args: &ContextArgs) -> Result<()> {
    if args.dataset.as_os_str().is_empty() {
        anyhow::bail!("Dataset path cannot be empty");
    }

    if args.suspicious.as_os_str().is_empty() {
        anyhow::bail!("Suspicious selection path cannot be empty");
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    Ok(())
}
