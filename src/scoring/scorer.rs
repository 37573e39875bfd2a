//! Rank extracted paths by depth, fan-out and signature frequency.
//!
//! The most suspicious paths are the deep ones that pass through
//! high-branching calls, or that repeat a structure seen elsewhere.

use crate::paths::CallPath;
use crate::utils::config::ScoringWeights;
use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A path annotated with its features and score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPath {
    #[serde(flatten)]
    pub path: CallPath,
    pub signature: String,
    /// Edge count
    pub depth: usize,
    /// Full-tree children summed over every node but the last
    pub fanout: usize,
    /// Paths in the scored set sharing this signature, itself included
    pub frequency: usize,
    pub score: f64,
}

/// Both outputs of a ranking run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    /// Every path, highest score first; ties keep extraction order
    pub ranked: Vec<ScoredPath>,
    /// First path per signature from `ranked`, at most `k`
    pub top_k: Vec<ScoredPath>,
}

/// Weighted three-feature path scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct PathScorer {
    weights: ScoringWeights,
}

impl PathScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Score every path, keeping input order
    ///
    /// **Public** - feature computation and normalization
    ///
    /// # Normalization
    /// * depth: `depth / max_depth`
    /// * fanout: `fanout / max_fanout`
    /// * frequency: `(freq - min_freq) / (max_freq - min_freq)`
    ///
    /// Every denominator is at least 1.
    pub fn score(&self, paths: Vec<CallPath>) -> Vec<ScoredPath> {
        if paths.is_empty() {
            return Vec::new();
        }

        let signatures: Vec<String> = paths.iter().map(CallPath::signature).collect();
        let mut signature_counts: HashMap<&str, usize> = HashMap::new();
        for signature in &signatures {
            *signature_counts.entry(signature.as_str()).or_insert(0) += 1;
        }
        let frequencies: Vec<usize> = signatures
            .iter()
            .map(|s| signature_counts.get(s.as_str()).copied().unwrap_or(1))
            .collect();

        let mut scored: Vec<ScoredPath> = paths
            .into_iter()
            .zip(signatures)
            .zip(frequencies)
            .map(|((path, signature), frequency)| ScoredPath {
                depth: path.depth(),
                fanout: path_fanout(&path),
                frequency,
                signature,
                path,
                score: 0.0,
            })
            .collect();

        let max_depth = scored.iter().map(|p| p.depth).max().unwrap_or(0).max(1) as f64;
        let max_fanout = scored.iter().map(|p| p.fanout).max().unwrap_or(0).max(1) as f64;
        let max_frequency = scored.iter().map(|p| p.frequency).max().unwrap_or(1);
        let min_frequency = scored.iter().map(|p| p.frequency).min().unwrap_or(1);
        let frequency_range = (max_frequency - min_frequency).max(1) as f64;

        for path in &mut scored {
            let norm_depth = path.depth as f64 / max_depth;
            let norm_fanout = path.fanout as f64 / max_fanout;
            let norm_frequency = (path.frequency - min_frequency) as f64 / frequency_range;

            path.score = self.weights.alpha * norm_depth
                + self.weights.beta * norm_fanout
                + self.weights.gamma * norm_frequency;
        }

        debug!(
            "Scored {} paths (max depth {}, max fanout {}, frequency {}..={})",
            scored.len(),
            max_depth,
            max_fanout,
            min_frequency,
            max_frequency
        );
        scored
    }

    /// Score, sort descending and select the deduplicated top `k`
    ///
    /// **Public** - main entry point for ranking
    ///
    /// # Arguments
    /// * `paths` - Every extracted path of the batch
    /// * `k` - Number of distinct signatures to keep
    pub fn rank(&self, paths: Vec<CallPath>, k: usize) -> Ranking {
        let mut ranked = self.score(paths);
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        let top_k = select_top_k(&ranked, k);
        Ranking { ranked, top_k }
    }
}

/// Keep the first path of each signature, in order, until `k` are kept
pub fn select_top_k(ranked: &[ScoredPath], k: usize) -> Vec<ScoredPath> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut selected = Vec::with_capacity(k.min(ranked.len()));

    for path in ranked {
        if selected.len() >= k {
            break;
        }
        if seen.insert(path.signature.as_str()) {
            selected.push(path.clone());
        }
    }

    selected
}

/// **Private** - fan-out feature of one path
fn path_fanout(path: &CallPath) -> usize {
    let interior = path.steps.len().saturating_sub(1);
    path.steps[..interior].iter().map(|s| s.child_count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::CallRecord;
    use crate::paths::extract_paths;
    use crate::tree::reconstruct;

    fn call(from: &str, to: &str, method: &str) -> CallRecord {
        CallRecord::new(from, to, method, "0")
    }

    fn paths_of(records: &[CallRecord]) -> Vec<CallPath> {
        extract_paths(&reconstruct(records).unwrap(), "0xtx")
    }

    #[test]
    fn test_chain_features() {
        let paths = paths_of(&[
            call("A", "B", "f1"),
            call("B", "C", "f2"),
            call("C", "D", "f3"),
            call("D", "E", "f4"),
        ]);
        let scored = PathScorer::default().score(paths);

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].depth, 3);
        assert_eq!(scored[0].fanout, 3);
        assert_eq!(scored[0].frequency, 1);
        // alone in the set: full depth and fanout, no frequency spread
        assert!((scored[0].score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_fanout_counts_off_path_children() {
        let paths = paths_of(&[
            call("A", "B", "enter"),
            call("B", "C", "s1"),
            call("B", "D", "s2"),
            call("B", "E", "s3"),
        ]);
        let scored = PathScorer::default().score(paths);

        assert_eq!(scored.len(), 3);
        assert!(scored.iter().all(|p| p.fanout == 3));
    }

    #[test]
    fn test_duplicate_signatures_collapse() {
        // two sibling calls with the same callee and method
        let paths = paths_of(&[
            call("A", "B", "enter"),
            call("B", "C", "ping"),
            call("B", "C", "ping"),
            call("B", "D", "pong"),
        ]);
        let ranking = PathScorer::default().rank(paths, 10);

        assert_eq!(ranking.ranked.len(), 3);
        assert_eq!(ranking.ranked[0].frequency, 2);
        assert_eq!(ranking.top_k.len(), 2);
        assert_eq!(ranking.top_k[0].signature, "B:enter -> C:ping");
        assert_eq!(ranking.top_k[1].signature, "B:enter -> D:pong");
    }

    #[test]
    fn test_select_stops_at_k() {
        let paths = paths_of(&[
            call("A", "B", "enter"),
            call("B", "C", "s1"),
            call("B", "D", "s2"),
            call("B", "E", "s3"),
        ]);
        let ranking = PathScorer::default().rank(paths, 2);

        assert_eq!(ranking.top_k.len(), 2);
        assert!(select_top_k(&ranking.ranked, 0).is_empty());
    }

    #[test]
    fn test_empty_input() {
        let ranking = PathScorer::default().rank(Vec::new(), 5);
        assert!(ranking.ranked.is_empty());
        assert!(ranking.top_k.is_empty());
    }
}
