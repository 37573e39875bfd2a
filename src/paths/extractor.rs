//! Root-to-leaf path enumeration over reconstructed call trees.

use crate::parser::schema::CallRecord;
use crate::tree::{reconstruct, CallTree, CallType, NodeId};
use crate::utils::config::{SIGNATURE_SEPARATOR, UNKNOWN_ADDRESS};
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Snapshot of one node along an extracted path
///
/// Carries what scoring and reporting need so a path outlives the tree it
/// came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStep {
    pub node_id: NodeId,
    pub from: String,
    pub to: String,
    pub method: String,
    pub value: String,
    pub depth: i32,
    pub call_type: CallType,
    pub call_index: Option<usize>,
    /// Children of this node in the full tree
    pub child_count: usize,
}

/// One root-to-leaf path of a transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallPath {
    pub tx_hash: String,
    pub steps: Vec<PathStep>,
}

impl CallPath {
    fn from_nodes(tree: &CallTree, tx_hash: &str, nodes: &[NodeId]) -> Self {
        let steps = nodes
            .iter()
            .map(|&id| {
                let node = tree.at(id);
                let (from, value) = node
                    .call
                    .as_ref()
                    .map(|c| (c.from.clone(), c.value.clone()))
                    .unwrap_or_else(|| (UNKNOWN_ADDRESS.to_string(), "0".to_string()));

                PathStep {
                    node_id: id,
                    from,
                    to: node.to_address().to_string(),
                    method: node.method.clone(),
                    value,
                    depth: node.depth,
                    call_type: node.call_type,
                    call_index: node.call_index,
                    child_count: node.fanout(),
                }
            })
            .collect();

        Self {
            tx_hash: tx_hash.to_string(),
            steps,
        }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Edge count
    pub fn depth(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// `to:method` pairs joined by `" -> "`, exactly as recorded
    pub fn signature(&self) -> String {
        self.steps
            .iter()
            .map(|s| format!("{}:{}", s.to, s.method))
            .collect::<Vec<_>>()
            .join(SIGNATURE_SEPARATOR)
    }

    pub fn methods(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.method.as_str()).collect()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.steps.iter().map(|s| s.node_id).collect()
    }
}

/// Enumerate every root-to-leaf path of a reconstructed tree
///
/// **Public** - main entry point for path extraction
///
/// Depth-first, children in order. A childless node ends a path; paths
/// with a single node are dropped. Under a virtual root each real root
/// tree is walked on its own and the virtual root never appears.
pub fn extract_paths(tree: &CallTree, tx_hash: &str) -> Vec<CallPath> {
    let mut paths = Vec::new();
    let mut trail = Vec::new();

    for root in tree.top_level_roots() {
        walk(tree, root, tx_hash, &mut trail, &mut paths);
    }

    debug!("{}: extracted {} paths", tx_hash, paths.len());
    paths
}

/// **Private** - recursive DFS for extract_paths
fn walk(
    tree: &CallTree,
    id: NodeId,
    tx_hash: &str,
    trail: &mut Vec<NodeId>,
    paths: &mut Vec<CallPath>,
) {
    trail.push(id);

    let children = tree.children(id);
    if children.is_empty() {
        if trail.len() > 1 {
            paths.push(CallPath::from_nodes(tree, tx_hash, trail));
        }
    } else {
        for &child in children {
            walk(tree, child, tx_hash, trail, paths);
        }
    }

    trail.pop();
}

/// Reconstruct and extract every transaction of a call graph
///
/// Transactions are processed on the rayon pool; the result keeps the
/// call graph's tx hash order.
pub fn extract_all_paths(call_graph: &BTreeMap<String, Vec<CallRecord>>) -> Vec<CallPath> {
    let per_tx: Vec<Vec<CallPath>> = call_graph
        .par_iter()
        .map(|(tx_hash, records)| match reconstruct(records) {
            Some(tree) => extract_paths(&tree, tx_hash),
            None => Vec::new(),
        })
        .collect();

    let paths: Vec<CallPath> = per_tx.into_iter().flatten().collect();
    info!(
        "Extracted {} paths from {} transactions",
        paths.len(),
        call_graph.len()
    );
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(from: &str, to: &str, method: &str) -> CallRecord {
        CallRecord::new(from, to, method, "0")
    }

    #[test]
    fn test_chain_yields_single_path() {
        let records = vec![call("A", "B", "f1"), call("B", "C", "f2"), call("C", "D", "f3")];
        let tree = reconstruct(&records).unwrap();
        let paths = extract_paths(&tree, "0xtx");

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 3);
        assert_eq!(paths[0].depth(), 2);
        assert_eq!(paths[0].signature(), "B:f1 -> C:f2 -> D:f3");
    }

    #[test]
    fn test_bare_root_is_not_a_path() {
        let tree = reconstruct(&[call("A", "B", "f1")]).unwrap();
        assert!(extract_paths(&tree, "0xtx").is_empty());
    }

    #[test]
    fn test_virtual_root_is_skipped() {
        let records = vec![
            call("A", "B", "f1"),
            call("B", "C", "f2"),
            call("X", "Y", "g1"),
            call("Y", "Z", "g2"),
        ];
        let tree = reconstruct(&records).unwrap();
        let paths = extract_paths(&tree, "0xtx");

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].methods(), vec!["f1", "f2"]);
        assert_eq!(paths[1].methods(), vec!["g1", "g2"]);
        assert!(paths.iter().all(|p| p.steps[0].depth == 1));
    }

    #[test]
    fn test_steps_carry_full_tree_fanout() {
        let records = vec![
            call("A", "B", "enter"),
            call("B", "C", "s1"),
            call("B", "D", "s2"),
        ];
        let tree = reconstruct(&records).unwrap();
        let paths = extract_paths(&tree, "0xtx");

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].steps[0].child_count, 2);
        assert_eq!(paths[1].node_ids(), vec![0, 2]);
    }

    #[test]
    fn test_extract_all_keeps_tx_order() {
        let mut graph = BTreeMap::new();
        graph.insert("0xb".to_string(), vec![call("A", "B", "g1"), call("B", "C", "g2")]);
        graph.insert("0xa".to_string(), vec![call("A", "B", "f1"), call("B", "C", "f2")]);
        graph.insert("0xc".to_string(), Vec::new());

        let paths = extract_all_paths(&graph);
        let txs: Vec<&str> = paths.iter().map(|p| p.tx_hash.as_str()).collect();
        assert_eq!(txs, vec!["0xa", "0xb"]);
    }
}
