//! Callpath CLI
//!
//! Ranks suspicious call paths of blockchain transactions and builds
//! the contexts around them for downstream explanation.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use callpath_context::commands::{
    display_schema, display_version, execute_context, execute_rank, load_config,
    validate_context_args, validate_rank_args, ContextArgs, ContextMode, RankArgs,
};
use callpath_context::utils::ScoringWeights;

/// Callpath - suspicious call path ranking and context extraction
#[derive(Parser, Debug)]
#[command(name = "callpath")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank the call paths of a call graph
    Rank {
        /// Call graph JSON ({ tx_hash: calls })
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the ranked-path report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Also write one dataset row per extracted path
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Number of distinct paths to keep
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Depth weight
        #[arg(long)]
        alpha: Option<f64>,

        /// Fan-out weight
        #[arg(long)]
        beta: Option<f64>,

        /// Frequency weight
        #[arg(long)]
        gamma: Option<f64>,

        /// Analysis config JSON; flags override its values
        #[arg(short, long, env = "CALLPATH_CONFIG")]
        config: Option<PathBuf>,

        /// Print the top-K table to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Build contexts around suspicious paths of a path dataset
    Context {
        /// Path dataset JSON
        #[arg(short, long)]
        dataset: PathBuf,

        /// Suspicious selection JSON ({ source: [path_id, ...] })
        #[arg(short, long)]
        suspicious: PathBuf,

        /// Expansion layers or neighborhood radius
        #[arg(short, long)]
        k: Option<usize>,

        /// Context flavour
        #[arg(short, long, value_enum, default_value_t = ContextMode::Expand)]
        mode: ContextMode,

        /// Output path for the context report
        #[arg(short, long, default_value = "contexts.json")]
        output: PathBuf,

        /// Analysis config JSON; flags override its values
        #[arg(short, long, env = "CALLPATH_CONFIG")]
        config: Option<PathBuf>,

        /// Print a text block per context to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Rank {
            input,
            output,
            dataset,
            top_k,
            alpha,
            beta,
            gamma,
            config,
            summary,
        } => {
            let config = load_config(config.as_deref())?;
            let weights = ScoringWeights::new(
                alpha.unwrap_or(config.weights.alpha),
                beta.unwrap_or(config.weights.beta),
                gamma.unwrap_or(config.weights.gamma),
            );

            let args = RankArgs {
                input,
                output,
                dataset_output: dataset,
                top_k: top_k.unwrap_or(config.top_k),
                weights,
                print_summary: summary,
            };

            // Validate args first
            validate_rank_args(&args)?;

            execute_rank(args)?;
        }

        Commands::Context {
            dataset,
            suspicious,
            k,
            mode,
            output,
            config,
            summary,
        } => {
            let config = load_config(config.as_deref())?;

            let args = ContextArgs {
                dataset,
                suspicious,
                k: k.unwrap_or(config.k_neighbors),
                mode,
                output,
                print_summary: summary,
            };

            // Validate args first
            validate_context_args(&args)?;

            execute_context(args)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
