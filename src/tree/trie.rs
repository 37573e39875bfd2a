//! Path-insertion builder: a per-transaction trie of known method sequences.

use super::arena::CallTree;
use super::node::NodeId;
use crate::parser::schema::{Metadata, PathRecord};
use crate::utils::config::ROOT_METHOD;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Shared call tree of one transaction, built by inserting its paths.
///
/// Children are keyed by exact method string. Insertions are strictly
/// sequential: each one sees the trie and `related_path_ids` left by the
/// previous ones.
#[derive(Debug, Clone)]
pub struct TransactionTree {
    tx_hash: String,
    tree: CallTree,
    child_index: HashMap<(NodeId, String), NodeId>,
    path_to_leaf: HashMap<String, NodeId>,
    path_to_nodes: HashMap<String, Vec<NodeId>>,
    suspicious_path_ids: BTreeSet<String>,
}

/// Size and marking counts for one transaction tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeStatistics {
    pub tx_hash: String,
    pub total_nodes: usize,
    pub leaf_nodes: usize,
    pub suspicious_nodes: usize,
    pub max_depth: i32,
    pub total_paths: usize,
    pub suspicious_paths: usize,
}

impl TransactionTree {
    /// Create a tree holding only the synthetic `ROOT` node (id 0)
    pub fn new(tx_hash: impl Into<String>) -> Self {
        let mut tree = CallTree::new();
        let root = tree.add_node(ROOT_METHOD, 0, None);
        tree.set_root(root);

        Self {
            tx_hash: tx_hash.into(),
            tree,
            child_index: HashMap::new(),
            path_to_leaf: HashMap::new(),
            path_to_nodes: HashMap::new(),
            suspicious_path_ids: BTreeSet::new(),
        }
    }

    /// Build a tree by inserting every record in order
    pub fn from_records<'a>(
        tx_hash: impl Into<String>,
        records: impl IntoIterator<Item = &'a PathRecord>,
    ) -> Self {
        let mut tree = Self::new(tx_hash);
        for record in records {
            tree.add_path(record);
        }
        tree
    }

    /// Insert one dataset row; returns the node the path terminates at
    pub fn add_path(&mut self, record: &PathRecord) -> NodeId {
        self.insert_path(&record.path_id, &record.methods(), record.leaf_metadata())
    }

    /// Insert a method sequence under `path_id`
    ///
    /// Walks from `ROOT`, creating missing children, and records the id on
    /// every visited node (root included). The final node becomes a leaf and
    /// takes `metadata`, replacing whatever an earlier identical sequence
    /// left there. An empty sequence terminates at `ROOT`.
    pub fn insert_path(&mut self, path_id: &str, methods: &[String], metadata: Metadata) -> NodeId {
        let root = self.root();
        let mut current = root;
        let mut path_nodes = vec![current];
        self.tree
            .node_mut(current)
            .related_path_ids
            .insert(path_id.to_string());

        for method in methods {
            current = self.child_or_insert(current, method);
            self.tree
                .node_mut(current)
                .related_path_ids
                .insert(path_id.to_string());
            path_nodes.push(current);
        }

        let leaf = self.tree.node_mut(current);
        leaf.is_leaf = true;
        leaf.leaf_metadata = Some(metadata);

        self.path_to_leaf.insert(path_id.to_string(), current);
        self.path_to_nodes.insert(path_id.to_string(), path_nodes);
        current
    }

    fn child_or_insert(&mut self, parent: NodeId, method: &str) -> NodeId {
        let key = (parent, method.to_string());
        if let Some(&child) = self.child_index.get(&key) {
            return child;
        }

        let depth = self.tree.at(parent).depth + 1;
        let child = self.tree.add_node(method, depth, Some(parent));
        self.child_index.insert(key, child);
        child
    }

    /// Flag every node of each known path as suspicious
    ///
    /// The tree's suspicious set becomes exactly `path_ids`; ids this tree
    /// never saw are kept in the set but touch no node.
    pub fn mark_suspicious(&mut self, path_ids: &[String]) {
        self.suspicious_path_ids = path_ids.iter().cloned().collect();

        for path_id in path_ids {
            let Some(nodes) = self.path_to_nodes.get(path_id) else {
                continue;
            };
            for &id in nodes {
                self.tree.node_mut(id).mark_suspicious(path_id);
            }
        }

        debug!(
            "{}: marked {} suspicious paths",
            self.tx_hash,
            path_ids.len()
        );
    }

    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root().unwrap_or_default()
    }

    pub fn contains_path(&self, path_id: &str) -> bool {
        self.path_to_nodes.contains_key(path_id)
    }

    /// Node sequence of a path, `ROOT` first
    pub fn path_nodes(&self, path_id: &str) -> Option<&[NodeId]> {
        self.path_to_nodes.get(path_id).map(Vec::as_slice)
    }

    /// Node a path terminates at
    pub fn leaf_of(&self, path_id: &str) -> Option<NodeId> {
        self.path_to_leaf.get(path_id).copied()
    }

    pub fn suspicious_path_ids(&self) -> &BTreeSet<String> {
        &self.suspicious_path_ids
    }

    pub fn statistics(&self) -> TreeStatistics {
        let nodes = self.tree.nodes();
        TreeStatistics {
            tx_hash: self.tx_hash.clone(),
            total_nodes: nodes.len(),
            leaf_nodes: nodes.iter().filter(|n| n.is_leaf).count(),
            suspicious_nodes: nodes.iter().filter(|n| n.is_suspicious).count(),
            max_depth: self.tree.max_depth(),
            total_paths: self.path_to_nodes.len(),
            suspicious_paths: self.suspicious_path_ids.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn methods(seq: &str) -> Vec<String> {
        crate::parser::schema::split_methods(seq)
    }

    #[test]
    fn test_shared_prefix_is_reused() {
        let mut tree = TransactionTree::new("0xtx");
        let a = tree.insert_path("p1", &methods("f1|f2"), Metadata::new());
        let b = tree.insert_path("p2", &methods("f1|f3"), Metadata::new());

        assert_eq!(tree.tree().len(), 4);
        assert_ne!(a, b);
        assert_eq!(tree.path_nodes("p1").unwrap()[..2], tree.path_nodes("p2").unwrap()[..2]);

        let f1 = tree.path_nodes("p1").unwrap()[1];
        let related: Vec<&str> = tree.tree().at(f1).related_path_ids.iter().map(String::as_str).collect();
        assert_eq!(related, vec!["p1", "p2"]);
    }

    #[test]
    fn test_identical_sequences_last_metadata_wins() {
        let mut tree = TransactionTree::new("0xtx");
        let mut first = Metadata::new();
        first.insert("label".to_string(), json!(0));
        let mut second = Metadata::new();
        second.insert("label".to_string(), json!(1));

        let a = tree.insert_path("p1", &methods("f1|f2"), first);
        let b = tree.insert_path("p2", &methods("f1|f2"), second);

        assert_eq!(a, b);
        assert_eq!(tree.leaf_of("p1"), Some(a));
        assert_eq!(tree.leaf_of("p2"), Some(a));
        assert_eq!(tree.tree().at(a).leaf_metadata.as_ref().unwrap()["label"], json!(1));
    }

    #[test]
    fn test_leaf_keeps_flag_after_extension() {
        let mut tree = TransactionTree::new("0xtx");
        let short = tree.insert_path("p1", &methods("f1"), Metadata::new());
        tree.insert_path("p2", &methods("f1|f2"), Metadata::new());

        let node = tree.tree().at(short);
        assert!(node.is_leaf);
        assert_eq!(node.fanout(), 1);
    }

    #[test]
    fn test_empty_sequence_terminates_at_root() {
        let mut tree = TransactionTree::new("0xtx");
        let leaf = tree.insert_path("p0", &[], Metadata::new());

        assert_eq!(leaf, tree.root());
        assert_eq!(tree.path_nodes("p0"), Some(&[0][..]));
        assert!(tree.tree().at(0).related_path_ids.contains("p0"));
    }

    #[test]
    fn test_mark_suspicious_skips_unknown_ids() {
        let mut tree = TransactionTree::new("0xtx");
        tree.insert_path("p1", &methods("f1|f2"), Metadata::new());
        tree.insert_path("p2", &methods("g1"), Metadata::new());

        tree.mark_suspicious(&["p1".to_string(), "missing".to_string()]);

        let stats = tree.statistics();
        assert_eq!(stats.suspicious_nodes, 3);
        assert_eq!(stats.suspicious_paths, 2);
        assert_eq!(stats.total_paths, 2);
        assert_eq!(stats.leaf_nodes, 2);
        assert_eq!(stats.max_depth, 2);
    }
}
