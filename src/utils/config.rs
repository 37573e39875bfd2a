//! Configuration and constants for call-path analysis.

use serde::{Deserialize, Serialize};

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Method name of the synthetic root used by the path-insertion builder
pub const ROOT_METHOD: &str = "ROOT";

/// Method name of the node wrapping several reconstructed root trees
pub const VIRTUAL_ROOT_METHOD: &str = "virtual_root";

/// Placeholder for a call record missing its `from` or `to` address
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Separator between method names in a persisted path (`"f1|f2|f3"`)
pub const METHOD_SEPARATOR: char = '|';

/// Separator between `to:method` pairs in a path signature
pub const SIGNATURE_SEPARATOR: &str = " -> ";

/// Default scoring weights (depth, fan-out, frequency)
pub const DEFAULT_ALPHA: f64 = 0.35;
pub const DEFAULT_BETA: f64 = 0.35;
pub const DEFAULT_GAMMA: f64 = 0.3;

/// Default number of unique paths kept by the scorer
pub const DEFAULT_TOP_K: usize = 5;

/// Default expansion radius for path contexts
pub const DEFAULT_K_NEIGHBORS: usize = 3;

/// Upper bound accepted on the command line for `--top-k`
pub const MAX_TOP_K: usize = 1000;

// Field names under which a wrapped call list may appear
pub const CALL_LIST_FIELD_NAMES: &[&str] = &["calls", "flat_calls", "trace"];

/// Keys under which a call graph entry may hold a nested hierarchy
pub const HIERARCHY_FIELD_NAMES: &[&str] = &["call_hierarchy", "rebuilt_call_hierarchy"];

// Textual null markers left behind by tabular exports
pub const NULL_MARKERS: &[&str] = &["", "nan", "none", "null"];

/// Weights of the three path features in the final score.
///
/// They need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(rename = "depth_weight", alias = "alpha")]
    pub alpha: f64,
    #[serde(rename = "fanout_weight", alias = "beta")]
    pub beta: f64,
    #[serde(rename = "frequency_weight", alias = "gamma")]
    pub gamma: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            gamma: DEFAULT_GAMMA,
        }
    }
}

impl ScoringWeights {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// True when every weight is finite and non-negative
    pub fn is_valid(&self) -> bool {
        [self.alpha, self.beta, self.gamma]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
    }
}

/// Tunables shared by the `rank` and `context` commands.
///
/// Loaded from JSON; any missing field keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub top_k: usize,
    pub k_neighbors: usize,
    pub weights: ScoringWeights,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            k_neighbors: DEFAULT_K_NEIGHBORS,
            weights: ScoringWeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"top_k": 12}"#).unwrap();
        assert_eq!(config.top_k, 12);
        assert_eq!(config.k_neighbors, DEFAULT_K_NEIGHBORS);
        assert_eq!(config.weights, ScoringWeights::default());
    }

    #[test]
    fn test_weight_aliases() {
        let weights: ScoringWeights =
            serde_json::from_str(r#"{"alpha": 0.4, "beta": 0.4, "gamma": 0.2}"#).unwrap();
        assert_eq!(weights, ScoringWeights::new(0.4, 0.4, 0.2));
    }

    #[test]
    fn test_negative_weight_is_invalid() {
        assert!(ScoringWeights::default().is_valid());
        assert!(!ScoringWeights::new(-0.1, 0.3, 0.3).is_valid());
        assert!(!ScoringWeights::new(f64::NAN, 0.3, 0.3).is_valid());
    }
}
