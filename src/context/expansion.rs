//! k-layer path-closure expansion around a target path.
//!
//! Layer 1 branches off every node of the target into each of its children.
//! Every later layer extends the leaf of each path the previous layer
//! produced by one child. Generated paths are keyed by how they were made,
//! so a key is never produced twice.

use super::connections::{AllPairsPrefix, PathConnector};
use super::neighborhood::induced_parent_edges;
use super::schema::{ExpansionContext, ExpansionNodeDetail, LayerStatistics, NodeSummary, PathDetail};
use crate::tree::{CallTree, NodeId, TransactionTree};
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// One path produced during expansion
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPath {
    pub key: String,
    pub nodes: Vec<NodeId>,
    /// 0 for the target itself
    pub layer: usize,
}

/// Generated paths in insertion order with unique keys
#[derive(Debug, Default)]
struct GeneratedPaths {
    paths: Vec<GeneratedPath>,
    keys: HashSet<String>,
}

impl GeneratedPaths {
    /// Returns the new path's index, or `None` if the key already exists
    fn insert(&mut self, key: String, nodes: Vec<NodeId>, layer: usize) -> Option<usize> {
        if !self.keys.insert(key.clone()) {
            return None;
        }
        self.paths.push(GeneratedPath { key, nodes, layer });
        Some(self.paths.len() - 1)
    }
}

impl TransactionTree {
    /// Expand `path_id` by `k` layers; `None` for an unknown id
    pub fn expand_for(&self, path_id: &str, k: usize) -> Option<ExpansionContext> {
        self.expand_with(path_id, k, &AllPairsPrefix)
    }

    /// Expansion with a caller-chosen prefix connector
    pub fn expand_with(
        &self,
        path_id: &str,
        k: usize,
        connector: &dyn PathConnector,
    ) -> Option<ExpansionContext> {
        let target = self.path_nodes(path_id)?.to_vec();
        let tree = self.tree();
        let method = |id: NodeId| tree.at(id).method.as_str();

        let mut generated = GeneratedPaths::default();
        generated.insert(format!("{path_id}_original"), target.clone(), 0);
        let mut layer_path_counts = BTreeMap::from([(0, 1)]);

        if k >= 1 {
            let mut current = Vec::new();
            for (i, &node) in target.iter().enumerate() {
                for &child in tree.children(node) {
                    let mut nodes = target[..=i].to_vec();
                    nodes.push(child);
                    if nodes == target {
                        continue;
                    }

                    let key = format!("{}_k1_from_{}_to_{}", path_id, method(node), method(child));
                    if let Some(index) = generated.insert(key, nodes, 1) {
                        current.push(index);
                    }
                }
            }
            layer_path_counts.insert(1, current.len());
            debug!("{}: layer 1 generated {} paths", path_id, current.len());

            for layer in 2..=k {
                if current.is_empty() {
                    break;
                }

                let mut next = Vec::new();
                for &index in &current {
                    let parent = generated.paths[index].clone();
                    let Some(&leaf) = parent.nodes.last() else {
                        continue;
                    };

                    for &child in tree.children(leaf) {
                        let mut nodes = parent.nodes.clone();
                        nodes.push(child);
                        let key = format!("{}_k{}_{}", parent.key, layer, method(child));
                        if let Some(new_index) = generated.insert(key, nodes, layer) {
                            next.push(new_index);
                        }
                    }
                }

                layer_path_counts.insert(layer, next.len());
                debug!("{}: layer {} generated {} paths", path_id, layer, next.len());
                if next.is_empty() {
                    debug!("{}: no expansion possible past layer {}", path_id, layer - 1);
                    break;
                }
                current = next;
            }
        }

        let context = assemble(tree, path_id, k, &target, &generated.paths, layer_path_counts, connector);
        info!(
            "{}: expanded to {} paths over {} nodes",
            path_id, context.layer_statistics.total_paths, context.layer_statistics.total_nodes
        );
        Some(context)
    }
}

fn assemble(
    tree: &CallTree,
    path_id: &str,
    k: usize,
    target: &[NodeId],
    paths: &[GeneratedPath],
    layer_path_counts: BTreeMap<usize, usize>,
    connector: &dyn PathConnector,
) -> ExpansionContext {
    let all_nodes: BTreeSet<NodeId> = paths.iter().flat_map(|p| p.nodes.iter().copied()).collect();
    let all_edges = induced_parent_edges(tree, &all_nodes);

    let node_details = all_nodes
        .iter()
        .map(|&id| {
            let in_paths = paths
                .iter()
                .filter(|p| p.nodes.contains(&id))
                .map(|p| p.key.clone())
                .collect();
            let detail = ExpansionNodeDetail {
                summary: NodeSummary::of(tree.at(id)),
                in_paths,
            };
            (id, detail)
        })
        .collect();

    let path_details = paths
        .iter()
        .map(|p| {
            let detail = PathDetail {
                nodes: p.nodes.clone(),
                methods: p.nodes.iter().map(|&id| tree.at(id).method.clone()).collect(),
                is_target: p.layer == 0,
                length: p.nodes.len(),
                generation_layer: p.layer,
            };
            (p.key.clone(), detail)
        })
        .collect();

    let actual_expansion_depth = layer_path_counts.keys().next_back().copied().unwrap_or(0);

    ExpansionContext {
        target_path_id: path_id.to_string(),
        k_layers: k,
        related_paths: paths.iter().map(|p| (p.key.clone(), p.nodes.clone())).collect(),
        path_connections: connector.connections(paths),
        layer_statistics: LayerStatistics {
            total_paths: paths.len(),
            total_nodes: all_nodes.len(),
            target_path_length: target.len(),
            expansion_layers: k,
            layer_path_counts,
            actual_expansion_depth,
        },
        all_nodes: all_nodes.into_iter().collect(),
        all_edges,
        node_details,
        path_details,
        tx_hash: None,
        source_file: None,
    }
}
