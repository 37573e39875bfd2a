use crate::utils::config::{ScoringWeights, DEFAULT_K_NEIGHBORS, DEFAULT_TOP_K};
use clap::ValueEnum;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the rank command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct RankArgs {
    /// Call graph JSON: `{ tx_hash: calls }`
    pub input: PathBuf,

    /// Output path for the ranked-path report
    pub output: PathBuf,

    /// Output path for per-path dataset rows (optional)
    pub dataset_output: Option<PathBuf>,

    /// Number of distinct paths to keep
    pub top_k: usize,

    pub weights: ScoringWeights,

    /// Print the top-K table to stdout
    pub print_summary: bool,
}

impl Default for RankArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from("report.json"),
            dataset_output: None,
            top_k: DEFAULT_TOP_K,
            weights: ScoringWeights::default(),
            print_summary: false,
        }
    }
}

/// Which context to build around each suspicious path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// k-layer path-closure expansion
    #[default]
    Expand,
    /// Every node within k hops
    Neighborhood,
}

/// Arguments for the context command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ContextArgs {
    /// Path dataset JSON (rows with tx_hash, path_id, methods_str)
    pub dataset: PathBuf,

    /// Suspicious selection JSON: `{ source: [path_id, ...] }`
    pub suspicious: PathBuf,

    /// Expansion layers or neighborhood radius
    pub k: usize,

    pub mode: ContextMode,

    /// Output path for the context report
    pub output: PathBuf,

    /// Print a text block per context to stdout
    pub print_summary: bool,
}

impl Default for ContextArgs {
    fn default() -> Self {
        Self {
            dataset: PathBuf::new(),
            suspicious: PathBuf::new(),
            k: DEFAULT_K_NEIGHBORS,
            mode: ContextMode::default(),
            output: PathBuf::from("contexts.json"),
            print_summary: false,
        }
    }
}
