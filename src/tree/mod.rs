//! Call tree data structure and its two construction algorithms.
//!
//! - `reconstruct`: rebuilds a hierarchy from ordered flat call records
//! - `TransactionTree`: accumulates already-known method sequences in a trie
//!
//! Both produce the same arena-backed `CallTree`.

pub mod arena;
pub mod forest;
pub mod node;
pub mod reconstruct;
pub mod trie;

// Re-export main types
pub use arena::CallTree;
pub use forest::{
    CallForest, GlobalStatistics, SourceContexts, SourceNeighborhoods, SuspiciousSelection,
};
pub use node::{CallTreeNode, CallType, NodeId};
pub use reconstruct::reconstruct;
pub use trie::{TransactionTree, TreeStatistics};
