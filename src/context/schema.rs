//! Serializable context objects handed to the reporting stage.
//!
//! Everything here is plain data: strings, integers, booleans, and maps or
//! lists of them. Node ids refer to the transaction tree they came from.

use crate::parser::schema::Metadata;
use crate::tree::{CallTreeNode, CallType, NodeId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-node fields shared by both context flavours
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub method: String,
    pub depth: i32,
    pub call_type: CallType,
    pub is_leaf: bool,
    pub is_suspicious: bool,
    pub fanout: usize,
    /// Payload of the terminating path, leaves only
    pub path_info: Option<Metadata>,
}

impl NodeSummary {
    pub fn of(node: &CallTreeNode) -> Self {
        Self {
            method: node.method.clone(),
            depth: node.depth,
            call_type: node.call_type,
            is_leaf: node.is_leaf,
            is_suspicious: node.is_suspicious,
            fanout: node.fanout(),
            path_info: if node.is_leaf {
                node.leaf_metadata.clone()
            } else {
                None
            },
        }
    }
}

/// Node detail inside a bounded-neighborhood context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDetail {
    #[serde(flatten)]
    pub summary: NodeSummary,
    pub related_paths: Vec<String>,
    pub suspicious_paths: Vec<String>,
}

/// k-hop neighborhood around one path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathContext {
    pub path_id: String,
    pub tx_hash: String,
    pub k_layers: usize,
    /// The path itself, `ROOT` first
    pub path_nodes: Vec<NodeId>,
    /// Path nodes plus every node within `k` hops of one of them, sorted
    pub context_nodes: Vec<NodeId>,
    /// Tree edges with both endpoints in `context_nodes`
    pub context_edges: Vec<(NodeId, NodeId)>,
    /// Neighbors found at each distance, summed over path nodes.
    /// A node near two path nodes is counted twice.
    pub layer_distribution: BTreeMap<usize, usize>,
    /// The same counts, per path node
    pub path_node_layers: BTreeMap<NodeId, BTreeMap<usize, usize>>,
    pub node_details: BTreeMap<NodeId, NodeDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl PathContext {
    /// Context nodes that are not on the path, ascending
    pub fn neighbor_nodes(&self) -> Vec<NodeId> {
        self.context_nodes
            .iter()
            .copied()
            .filter(|id| !self.path_nodes.contains(id))
            .collect()
    }
}

/// Node detail inside a k-layer expansion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionNodeDetail {
    #[serde(flatten)]
    pub summary: NodeSummary,
    /// Keys of the generated paths through this node, in generation order
    pub in_paths: Vec<String>,
}

/// One generated path of an expansion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathDetail {
    pub nodes: Vec<NodeId>,
    pub methods: Vec<String>,
    pub is_target: bool,
    pub length: usize,
    pub generation_layer: usize,
}

/// How far an expansion got and how much it produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerStatistics {
    pub total_paths: usize,
    pub total_nodes: usize,
    pub target_path_length: usize,
    /// Requested `k`
    pub expansion_layers: usize,
    /// New paths per layer; layer 0 is the target itself
    pub layer_path_counts: BTreeMap<usize, usize>,
    /// Deepest layer actually attempted
    pub actual_expansion_depth: usize,
}

/// Result of the k-layer path-closure expansion around one path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionContext {
    pub target_path_id: String,
    pub k_layers: usize,
    pub related_paths: BTreeMap<String, Vec<NodeId>>,
    /// `(shorter, longer)` key pairs where one path is a strict prefix of the other
    pub path_connections: Vec<(String, String)>,
    pub all_nodes: Vec<NodeId>,
    pub all_edges: Vec<(NodeId, NodeId)>,
    pub layer_statistics: LayerStatistics,
    pub node_details: BTreeMap<NodeId, ExpansionNodeDetail>,
    pub path_details: BTreeMap<String, PathDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}
