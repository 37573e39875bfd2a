//! Arena-backed call tree shared by both construction algorithms.

use super::node::{CallTreeNode, NodeId};
use crate::utils::config::VIRTUAL_ROOT_METHOD;

/// Owns every node of one transaction's call hierarchy.
///
/// A node's id is its index in the arena; ids are handed out in insertion
/// order and never reused.
#[derive(Debug, Clone, Default)]
pub struct CallTree {
    nodes: Vec<CallTreeNode>,
    root: Option<NodeId>,
}

impl CallTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, linking it under `parent` when given
    pub(crate) fn add_node(
        &mut self,
        method: impl Into<String>,
        depth: i32,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = self.nodes.len();
        let mut node = CallTreeNode::new(id, method, depth);
        node.parent = parent;
        self.nodes.push(node);

        if let Some(parent_id) = parent {
            self.nodes[parent_id].children.push(id);
        }
        id
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut CallTreeNode {
        &mut self.nodes[id]
    }

    /// Node by id; panics on an id not issued by this tree
    pub(crate) fn at(&self, id: NodeId) -> &CallTreeNode {
        &self.nodes[id]
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&CallTreeNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[CallTreeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// True when the root is a synthetic wrapper around several trees
    pub fn has_virtual_root(&self) -> bool {
        self.root
            .map(|id| self.nodes[id].method == VIRTUAL_ROOT_METHOD && self.nodes[id].depth < 0)
            .unwrap_or(false)
    }

    /// The real root trees: the virtual root's children, or the single root
    pub fn top_level_roots(&self) -> Vec<NodeId> {
        match self.root {
            Some(id) if self.has_virtual_root() => self.nodes[id].children.clone(),
            Some(id) => vec![id],
            None => Vec::new(),
        }
    }

    /// Every parent->child pair, depth-first from the root
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        if let Some(root) = self.root {
            self.collect_edges(root, &mut edges);
        }
        edges
    }

    fn collect_edges(&self, id: NodeId, edges: &mut Vec<(NodeId, NodeId)>) {
        for &child in &self.nodes[id].children {
            edges.push((id, child));
            self.collect_edges(child, edges);
        }
    }

    pub fn max_depth(&self) -> i32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Nodes without children
    pub fn childless_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.children.is_empty()).count()
    }
}
