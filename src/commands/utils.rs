use crate::output::read_json;
use crate::utils::config::{AnalysisConfig, SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::Path;

/// Load an analysis config file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };

    let raw = read_json(path).with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: AnalysisConfig = serde_json::from_value(raw)
        .with_context(|| format!("Invalid config {}", path.display()))?;

    Ok(config)
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Callpath Context Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Ranking report (rank):");
        println!("  summary: string             - One-line description");
        println!("  paths: array                - Top-K paths, best first");
        println!("    rank: number              - 1-based position");
        println!("    score: number             - Weighted score (4 decimals)");
        println!("    transaction: string       - Transaction hash");
        println!("    path_depth: number        - Edge count");
        println!("    fanout_score: number      - Children summed over interior nodes");
        println!("    frequency: number         - Paths sharing this signature");
        println!("    call_sequence: array      - step, contract, method, value, depth");
        println!("  statistics: object          - total_paths, transactions_involved,");
        println!("                                avg_score, max_depth, max_fanout");
        println!("  scoring_weights: object     - depth/fanout/frequency weights");
        println!();
        println!("Context report (context):");
        println!("  version: string             - Schema version");
        println!("  generated_at: string        - ISO 8601 timestamp");
        println!("  mode: string                - 'expand' or 'neighborhood'");
        println!("  k: number                   - Layers or hop radius");
        println!("  statistics: object?         - Totals across all transaction trees");
        println!("  contexts: object            - source -> path_id -> context");
        println!("    expand: related_paths, path_connections, all_nodes, all_edges,");
        println!("            layer_statistics, node_details, path_details");
        println!("    neighborhood: path_nodes, context_nodes, context_edges,");
        println!("                  layer_distribution, node_details");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Callpath Context v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call-tree reconstruction, suspicious path ranking and context");
    println!("expansion for blockchain transactions.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_defaults() {
        assert_eq!(load_config(None).unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"top_k": 9, "weights": {{"alpha": 1.0, "beta": 0.0, "gamma": 0.0}}}}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.top_k, 9);
        assert_eq!(config.weights.alpha, 1.0);
    }

    #[test]
    fn test_load_config_rejects_wrong_types() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"top_k": "many"}}"#).unwrap();

        assert!(load_config(Some(file.path())).is_err());
    }
}
