//! Ranked-path report handed to the language-model stage.

use super::scorer::{PathScorer, Ranking, ScoredPath};
use crate::parser::schema::CallRecord;
use crate::paths::extract_all_paths;
use crate::utils::config::ScoringWeights;
use log::info;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// One call of a reported path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallStep {
    pub step: usize,
    pub contract: String,
    pub method: String,
    pub value: String,
    pub depth: i32,
}

/// One reported path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmPath {
    pub rank: usize,
    /// Rounded to 4 decimals
    pub score: f64,
    pub transaction: String,
    pub path_depth: usize,
    pub fanout_score: usize,
    pub frequency: usize,
    pub call_sequence: Vec<CallStep>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportStatistics {
    pub total_paths: usize,
    pub transactions_involved: usize,
    pub avg_score: f64,
    pub max_depth: usize,
    pub max_fanout: usize,
}

/// Top-K report, serialized as-is into the prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmPathReport {
    pub summary: String,
    pub paths: Vec<LlmPath>,
    pub statistics: ReportStatistics,
    pub scoring_weights: ScoringWeights,
}

impl LlmPathReport {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Format a top-K selection for the language-model stage
///
/// **Public** - report builder
///
/// # Arguments
/// * `top_k` - Selection from `PathScorer::rank`, best first
/// * `weights` - Weights the selection was scored with
pub fn format_paths_for_llm(top_k: &[ScoredPath], weights: ScoringWeights) -> LlmPathReport {
    if top_k.is_empty() {
        return LlmPathReport {
            summary: "No suspicious call paths found".to_string(),
            paths: Vec::new(),
            statistics: ReportStatistics::default(),
            scoring_weights: weights,
        };
    }

    let paths: Vec<LlmPath> = top_k
        .iter()
        .enumerate()
        .map(|(i, scored)| LlmPath {
            rank: i + 1,
            score: round4(scored.score),
            transaction: scored.path.tx_hash.clone(),
            path_depth: scored.depth,
            fanout_score: scored.fanout,
            frequency: scored.frequency,
            call_sequence: scored
                .path
                .steps
                .iter()
                .enumerate()
                .map(|(j, s)| CallStep {
                    step: j + 1,
                    contract: s.to.clone(),
                    method: s.method.clone(),
                    value: s.value.clone(),
                    depth: s.depth,
                })
                .collect(),
            summary: format!(
                "TX {}... -> {} calls, depth {}",
                short_hash(&scored.path.tx_hash),
                scored.path.len(),
                scored.depth
            ),
        })
        .collect();

    let transactions: HashSet<&str> = top_k.iter().map(|p| p.path.tx_hash.as_str()).collect();
    let total_score: f64 = top_k.iter().map(|p| p.score).sum();

    LlmPathReport {
        summary: format!("Detected {} most suspicious call paths", top_k.len()),
        statistics: ReportStatistics {
            total_paths: top_k.len(),
            transactions_involved: transactions.len(),
            avg_score: round4(total_score / top_k.len() as f64),
            max_depth: top_k.iter().map(|p| p.depth).max().unwrap_or(0),
            max_fanout: top_k.iter().map(|p| p.fanout).max().unwrap_or(0),
        },
        paths,
        scoring_weights: weights,
    }
}

/// Reconstruct, extract and rank every transaction of a call graph
pub fn rank_call_graph(
    call_graph: &BTreeMap<String, Vec<CallRecord>>,
    k: usize,
    weights: ScoringWeights,
) -> Ranking {
    let paths = extract_all_paths(call_graph);
    let ranking = PathScorer::new(weights).rank(paths, k);
    info!(
        "Ranked {} paths, kept {} distinct",
        ranking.ranked.len(),
        ranking.top_k.len()
    );
    ranking
}

/// Full pipeline from a call graph to the report
pub fn analyze_call_graph(
    call_graph: &BTreeMap<String, Vec<CallRecord>>,
    k: usize,
    weights: ScoringWeights,
) -> LlmPathReport {
    let ranking = rank_call_graph(call_graph, k, weights);
    format_paths_for_llm(&ranking.top_k, weights)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn short_hash(tx_hash: &str) -> String {
    tx_hash.chars().take(8).collect()
}
