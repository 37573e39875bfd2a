//! Call tree node and call-type classification.

use crate::parser::schema::{CallRecord, Metadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Index of a node inside its tree's arena
pub type NodeId = usize;

/// Coarse classification of a call, derived from its method name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Mint,
    Swap,
    Transfer,
    Approval,
    Callback,
    Generic,
}

impl CallType {
    /// Classify by case-insensitive substring, first match wins:
    /// `mint`, `swap`, `transfer`, `approve`, `callback`.
    pub fn from_method(method: &str) -> Self {
        let lowered = method.to_lowercase();
        if lowered.contains("mint") {
            Self::Mint
        } else if lowered.contains("swap") {
            Self::Swap
        } else if lowered.contains("transfer") {
            Self::Transfer
        } else if lowered.contains("approve") {
            Self::Approval
        } else if lowered.contains("callback") {
            Self::Callback
        } else {
            Self::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mint => "mint",
            Self::Swap => "swap",
            Self::Transfer => "transfer",
            Self::Approval => "approval",
            Self::Callback => "callback",
            Self::Generic => "generic",
        }
    }
}

/// A node of a reconstructed or accumulated call hierarchy.
///
/// Links are arena indices; `parent` never owns anything.
#[derive(Debug, Clone)]
pub struct CallTreeNode {
    pub id: NodeId,
    pub method: String,
    /// 0 at a root, -1 for a virtual root
    pub depth: i32,
    pub call_type: CallType,
    /// Children in insertion order
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Set once any inserted path terminates here; never cleared
    pub is_leaf: bool,
    pub leaf_metadata: Option<Metadata>,
    pub related_path_ids: BTreeSet<String>,
    pub suspicious_path_ids: BTreeSet<String>,
    pub is_suspicious: bool,
    /// Source record and its position (reconstructor only)
    pub call: Option<CallRecord>,
    pub call_index: Option<usize>,
}

impl CallTreeNode {
    pub(crate) fn new(id: NodeId, method: impl Into<String>, depth: i32) -> Self {
        let method = method.into();
        let call_type = CallType::from_method(&method);
        Self {
            id,
            method,
            depth,
            call_type,
            children: Vec::new(),
            parent: None,
            is_leaf: false,
            leaf_metadata: None,
            related_path_ids: BTreeSet::new(),
            suspicious_path_ids: BTreeSet::new(),
            is_suspicious: false,
            call: None,
            call_index: None,
        }
    }

    /// Number of direct children in the full tree
    pub fn fanout(&self) -> usize {
        self.children.len()
    }

    /// Callee address, or `"unknown"` for nodes not built from a record
    pub fn to_address(&self) -> &str {
        self.call
            .as_ref()
            .map(|c| c.to.as_str())
            .unwrap_or(crate::utils::config::UNKNOWN_ADDRESS)
    }

    pub(crate) fn mark_suspicious(&mut self, path_id: &str) {
        self.is_suspicious = true;
        self.suspicious_path_ids.insert(path_id.to_string());
    }
}
