//! Plain-text renderings for terminal summaries and human reports.

use crate::context::PathContext;
use crate::scoring::ScoredPath;
use crate::utils::config::SIGNATURE_SEPARATOR;

/// Neighbor nodes listed before eliding the rest
const MAX_LISTED_NEIGHBORS: usize = 5;

/// Render a neighborhood context for a human report
///
/// **Public** - one block per suspicious path
///
/// # Arguments
/// * `context` - Context from `TransactionTree::context_for`
/// * `show_neighbors` - Append up to five off-path nodes
pub fn format_path_context(context: &PathContext, show_neighbors: bool) -> String {
    let methods: Vec<&str> = context
        .path_nodes
        .iter()
        .filter_map(|id| context.node_details.get(id))
        .map(|d| d.summary.method.as_str())
        .collect();

    let mut lines = vec![
        format!("Path ID: {}", context.path_id),
        format!("Transaction: {}", context.tx_hash),
        format!(
            "Source: {}",
            context.source_file.as_deref().unwrap_or("unknown")
        ),
        format!("Path nodes: {}", context.path_nodes.len()),
        format!("Context nodes: {}", context.context_nodes.len()),
        format!("Context edges: {}", context.context_edges.len()),
        format!("Call chain: {}", methods.join(SIGNATURE_SEPARATOR)),
    ];

    if show_neighbors {
        let neighbors = context.neighbor_nodes();
        if !neighbors.is_empty() {
            lines.push(format!("Neighbors ({}):", neighbors.len()));
            lines.extend(
                neighbors
                    .iter()
                    .take(MAX_LISTED_NEIGHBORS)
                    .filter_map(|id| context.node_details.get(id).map(|detail| (id, detail)))
                    .map(|(id, detail)| {
                        format!(
                            "  - {}: {} (depth {}, fanout {})",
                            id, detail.summary.method, detail.summary.depth, detail.summary.fanout
                        )
                    }),
            );
            if neighbors.len() > MAX_LISTED_NEIGHBORS {
                lines.push(format!(
                    "  ... and {} more",
                    neighbors.len() - MAX_LISTED_NEIGHBORS
                ));
            }
        }
    }

    lines.join("\n")
}

/// Render the top-K table
///
/// **Public** - terminal summary for the rank command
pub fn ranking_summary(top_k: &[ScoredPath]) -> String {
    if top_k.is_empty() {
        return "No suspicious call paths found".to_string();
    }

    let header = format!(
        "{:>4}  {:>7}  {:>5}  {:>6}  {:>4}  {:<18}  {}\n",
        "rank", "score", "depth", "fanout", "freq", "tx", "path"
    );

    let rows = top_k.iter().enumerate().map(|(i, path)| {
        let tx: String = path.path.tx_hash.chars().take(18).collect();
        format!(
            "{:>4}  {:>7.4}  {:>5}  {:>6}  {:>4}  {:<18}  {}\n",
            i + 1,
            path.score,
            path.depth,
            path.fanout,
            path.frequency,
            tx,
            path.path.methods().join(SIGNATURE_SEPARATOR)
        )
    });

    std::iter::once(header).chain(rows).collect()
}
