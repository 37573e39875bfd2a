//! Callpath Context
//!
//! Call-tree reconstruction, suspicious path ranking and context
//! expansion for blockchain transactions.
//!
//! Two pipelines share one arena-backed call tree:
//!
//! 1. Ordered call records -> `tree::reconstruct` -> `paths::extract_paths`
//!    -> `scoring::PathScorer` -> ranked, deduplicated top-K paths
//! 2. Path dataset + suspicious ids -> `tree::CallForest` (one insertion
//!    tree per transaction) -> expansion or neighborhood contexts
//!
//! This crate also provides the `callpath` CLI:
//!
//! ```bash
//! callpath rank --input calls.json --top-k 5 --summary
//! callpath context --dataset rows.json --suspicious selected.json --k 3
//! ```

pub mod commands;
pub mod context;
pub mod output;
pub mod parser;
pub mod paths;
pub mod scoring;
pub mod tree;
pub mod utils;

pub use context::{ExpansionContext, PathContext};
pub use paths::CallPath;
pub use scoring::{LlmPathReport, PathScorer, Ranking, ScoredPath};
pub use tree::{reconstruct, CallForest, CallTree, TransactionTree};
pub use utils::{AnalysisConfig, ScoringWeights};
