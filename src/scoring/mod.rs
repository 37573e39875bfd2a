//! Path scoring, top-K selection and the ranked-path report.
//!
//! Scoring takes the raw extracted paths and produces:
//! - every path with its features and weighted score
//! - the deduplicated top-K selection
//! - a report shaped for a language-model prompt

pub mod report;
pub mod scorer;

pub use report::{analyze_call_graph, format_paths_for_llm, rank_call_graph, LlmPathReport};
pub use scorer::{select_top_k, PathScorer, Ranking, ScoredPath};
