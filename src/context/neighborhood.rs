//! Bounded-radius neighborhoods over the undirected call tree.

use super::schema::{NodeDetail, NodeSummary, PathContext};
use crate::tree::{CallTree, NodeId, TransactionTree};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// Nodes at graph distance `1..=k` from `node`, paired with that distance
///
/// Breadth-first over parent and child links; discovery order, parent
/// before children. `node` itself is never included.
pub fn neighbors_by_distance(tree: &CallTree, node: NodeId, k: usize) -> Vec<(NodeId, usize)> {
    if k == 0 || tree.node(node).is_none() {
        return Vec::new();
    }

    let mut found = Vec::new();
    let mut visited: HashSet<NodeId> = HashSet::from([node]);
    let mut queue: VecDeque<(NodeId, usize)> = VecDeque::from([(node, 0)]);

    while let Some((current, distance)) = queue.pop_front() {
        if distance > 0 {
            found.push((current, distance));
        }
        if distance >= k {
            continue;
        }

        let adjacent = tree.parent(current).into_iter().chain(tree.children(current).iter().copied());
        for next in adjacent {
            if visited.insert(next) {
                queue.push_back((next, distance + 1));
            }
        }
    }

    found
}

/// Nodes within `k` hops of `node`, excluding `node`; empty for `k == 0`
pub fn neighbors_within(tree: &CallTree, node: NodeId, k: usize) -> BTreeSet<NodeId> {
    neighbors_by_distance(tree, node, k)
        .into_iter()
        .map(|(id, _)| id)
        .collect()
}

impl TransactionTree {
    /// k-hop context around a known path; `None` for an unknown id
    pub fn context_for(&self, path_id: &str, k: usize) -> Option<PathContext> {
        let path_nodes = self.path_nodes(path_id)?.to_vec();
        let tree = self.tree();

        let mut context_nodes: BTreeSet<NodeId> = path_nodes.iter().copied().collect();
        let mut layer_distribution: BTreeMap<usize, usize> = BTreeMap::new();
        let mut path_node_layers = BTreeMap::new();

        for &node in &path_nodes {
            let mut layers: BTreeMap<usize, usize> = BTreeMap::new();
            for (neighbor, distance) in neighbors_by_distance(tree, node, k) {
                context_nodes.insert(neighbor);
                *layers.entry(distance).or_insert(0) += 1;
                *layer_distribution.entry(distance).or_insert(0) += 1;
            }
            path_node_layers.insert(node, layers);
        }

        let context_edges = induced_edges(tree, &context_nodes);

        let node_details = context_nodes
            .iter()
            .map(|&id| {
                let node = tree.at(id);
                let detail = NodeDetail {
                    summary: NodeSummary::of(node),
                    related_paths: node.related_path_ids.iter().cloned().collect(),
                    suspicious_paths: node.suspicious_path_ids.iter().cloned().collect(),
                };
                (id, detail)
            })
            .collect();

        Some(PathContext {
            path_id: path_id.to_string(),
            tx_hash: self.tx_hash().to_string(),
            k_layers: k,
            path_nodes,
            context_nodes: context_nodes.into_iter().collect(),
            context_edges,
            layer_distribution,
            path_node_layers,
            node_details,
            source_file: None,
        })
    }

    /// Neighborhood contexts of every suspicious path this tree knows
    pub fn all_suspicious_contexts(&self, k: usize) -> BTreeMap<String, PathContext> {
        self.suspicious_path_ids()
            .iter()
            .filter_map(|id| self.context_for(id, k).map(|ctx| (id.clone(), ctx)))
            .collect()
    }
}

/// Parent->child pairs of the tree with both ends in `nodes`
pub(crate) fn induced_edges(tree: &CallTree, nodes: &BTreeSet<NodeId>) -> Vec<(NodeId, NodeId)> {
    nodes
        .iter()
        .flat_map(|&id| {
            tree.children(id)
                .iter()
                .filter(|child| nodes.contains(child))
                .map(move |&child| (id, child))
        })
        .collect()
}

/// `(parent, node)` for every node of `nodes` whose parent is also in it,
/// ordered by node id
pub(crate) fn induced_parent_edges(tree: &CallTree, nodes: &BTreeSet<NodeId>) -> Vec<(NodeId, NodeId)> {
    nodes
        .iter()
        .filter_map(|&id| {
            tree.parent(id)
                .filter(|parent| nodes.contains(parent))
                .map(|parent| (parent, id))
        })
        .collect()
}
